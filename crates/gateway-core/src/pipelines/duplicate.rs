use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::dbscan::{dbscan, group_labels};
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::model::ImageRef;
use crate::vecmath::cosine_distance_matrix;

use super::{fetch_and_normalize, run_guarded};

const EPS: f32 = 0.1;
const MIN_SAMPLES: usize = 2;

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DuplicateResponseData {
    Clusters(Vec<Vec<String>>),
    Missing(Vec<String>),
}

impl Default for DuplicateResponseData {
    fn default() -> Self {
        DuplicateResponseData::Clusters(Vec::new())
    }
}

pub async fn run(ctx: &AppContext, req: DuplicateRequest) -> PipelineOutcome<DuplicateResponseData> {
    run_guarded("duplicate", run_inner(ctx, req)).await
}

async fn run_inner(ctx: &AppContext, req: DuplicateRequest) -> PipelineOutcome<DuplicateResponseData> {
    if req.images.is_empty() {
        return PipelineOutcome::new(StatusTaxonomy::InvalidRequest, DuplicateResponseData::default());
    }

    let rows = match fetch_and_normalize(ctx, &req.images).await {
        Ok(rows) => rows,
        Err(outcome) => {
            return PipelineOutcome::new(outcome.status, DuplicateResponseData::Missing(outcome.body.data));
        }
    };

    let images = req.images.clone();
    let clusters = tokio::task::spawn_blocking(move || {
        let distances = cosine_distance_matrix(&rows);
        let labels = dbscan(&distances, EPS, MIN_SAMPLES);
        group_labels(&labels)
            .into_iter()
            .map(|group| group.into_iter().map(|idx| images[idx].0.clone()).collect())
            .collect::<Vec<Vec<String>>>()
    })
    .await;

    match clusters {
        Ok(duplicate_clusters) => PipelineOutcome::new(
            StatusTaxonomy::Success,
            DuplicateResponseData::Clusters(duplicate_clusters),
        ),
        Err(e) => {
            tracing::error!(error = %e, "duplicate clustering task failed");
            PipelineOutcome::new(StatusTaxonomy::InternalError, DuplicateResponseData::default())
        }
    }
}
