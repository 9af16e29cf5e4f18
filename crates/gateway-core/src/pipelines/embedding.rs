use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::model::{Embedding, ImageRef};

use super::run_guarded;

#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    pub images: Vec<ImageRef>,
}

/// `data` is `null` when every image was embedded and cached, or the bare
/// array of invalid refs otherwise -- never an object wrapping the array.
#[derive(Debug, Default)]
pub struct EmbeddingResponseData(pub Option<Vec<String>>);

impl Serialize for EmbeddingResponseData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl EmbeddingResponseData {
    fn from_invalid(invalid: Vec<String>) -> Self {
        if invalid.is_empty() {
            EmbeddingResponseData(None)
        } else {
            EmbeddingResponseData(Some(invalid))
        }
    }
}

pub async fn run(ctx: &AppContext, req: EmbeddingRequest) -> PipelineOutcome<EmbeddingResponseData> {
    run_guarded("embedding", run_inner(ctx, req)).await
}

async fn run_inner(ctx: &AppContext, req: EmbeddingRequest) -> PipelineOutcome<EmbeddingResponseData> {
    if req.images.is_empty() {
        return PipelineOutcome::new(StatusTaxonomy::InvalidRequest, EmbeddingResponseData::default());
    }

    let embedded = match ctx.gpu.embed(&req.images).await {
        Ok(map) => map,
        Err(e) => {
            tracing::error!(error = %e, "gpu embedding call failed");
            return PipelineOutcome::new(StatusTaxonomy::InternalError, EmbeddingResponseData::default());
        }
    };

    let mut invalid = Vec::new();

    for image in &req.images {
        match embedded.get(image.as_str()) {
            Some(vector) => {
                if let Err(e) = ctx.cache.set(image, Embedding::new(vector.clone())).await {
                    tracing::error!(error = %e, image = %image, "cache write failed, aborting batch");
                    return PipelineOutcome::new(
                        StatusTaxonomy::InternalError,
                        EmbeddingResponseData::from_invalid(invalid),
                    );
                }
            }
            None => invalid.push(image.0.clone()),
        }
    }

    PipelineOutcome::new(StatusTaxonomy::Success, EmbeddingResponseData::from_invalid(invalid))
}
