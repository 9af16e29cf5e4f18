use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::blur::is_blurry;
use crate::context::AppContext;
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::model::ImageRef;
use crate::vecmath::{dot, softmax_first_of_two};

use super::{fetch_and_normalize, run_guarded};

const FIELD_SHARP: &str = "sharp";
const FIELD_GOOD: &str = "good";
const COMBINED_SHARP_WEIGHT: f32 = 0.75;
const COMBINED_GOOD_WEIGHT: f32 = 0.25;

#[derive(Debug, Deserialize)]
pub struct QualityRequest {
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QualityResponseData {
    LowQuality(Vec<String>),
    Missing(Vec<String>),
}

impl Default for QualityResponseData {
    fn default() -> Self {
        QualityResponseData::LowQuality(Vec::new())
    }
}

pub async fn run(ctx: &AppContext, req: QualityRequest) -> PipelineOutcome<QualityResponseData> {
    run_guarded("quality", run_inner(ctx, req)).await
}

async fn run_inner(ctx: &AppContext, req: QualityRequest) -> PipelineOutcome<QualityResponseData> {
    if req.images.is_empty() {
        return PipelineOutcome::new(StatusTaxonomy::InvalidRequest, QualityResponseData::default());
    }

    // Laplacian branch runs concurrently with the CLIP branch below; it is
    // aborted if the CLIP branch turns out to need embeddings we don't have.
    let laplacian_handle = {
        let loader = ctx.image_loader.clone();
        let images = req.images.clone();
        tokio::spawn(async move { laplacian_low_quality(loader, images).await })
    };

    let rows = match fetch_and_normalize(ctx, &req.images).await {
        Ok(rows) => rows,
        Err(outcome) => {
            laplacian_handle.abort();
            return PipelineOutcome::new(outcome.status, QualityResponseData::Missing(outcome.body.data));
        }
    };

    let (t_a, t_c) = ctx.settings.model.name.quality_thresholds();
    let bank = ctx.quality_bank.clone();
    let images = req.images.clone();

    let clip_low = tokio::task::spawn_blocking(move || clip_low_quality(&bank, &images, rows, t_a, t_c)).await;

    let clip_low = match clip_low {
        Ok(set) => set,
        Err(e) => {
            tracing::error!(error = %e, "clip quality scoring task failed");
            laplacian_handle.abort();
            return PipelineOutcome::new(StatusTaxonomy::InternalError, QualityResponseData::default());
        }
    };

    let laplacian_low = match laplacian_handle.await {
        Ok(set) => set,
        Err(e) if e.is_cancelled() => HashSet::new(),
        Err(e) => {
            tracing::error!(error = %e, "laplacian blur task failed");
            HashSet::new()
        }
    };

    let mut low_quality: Vec<String> = clip_low.union(&laplacian_low).cloned().collect();
    low_quality.sort();

    PipelineOutcome::new(StatusTaxonomy::Success, QualityResponseData::LowQuality(low_quality))
}

fn clip_low_quality(
    bank: &crate::banks::QualityFeatureBank,
    images: &[ImageRef],
    rows: Vec<Vec<f32>>,
    t_a: f32,
    t_c: f32,
) -> HashSet<String> {
    let sharp = bank.field(FIELD_SHARP);
    let good = bank.field(FIELD_GOOD);

    let (Some(sharp), Some(good)) = (sharp, good) else {
        tracing::warn!("quality feature bank missing sharp/good fields, treating all images as low quality");
        return images.iter().map(|i| i.0.clone()).collect();
    };

    let mut low = HashSet::new();
    for (idx, row) in rows.iter().enumerate() {
        let a = softmax_first_of_two(dot(row, &sharp.positive), dot(row, &sharp.negative));
        let b = softmax_first_of_two(dot(row, &good.positive), dot(row, &good.negative));
        let combined = COMBINED_SHARP_WEIGHT * a + COMBINED_GOOD_WEIGHT * b;
        let pass = a >= t_a && combined >= t_c;
        if !pass {
            low.insert(images[idx].0.clone());
        }
    }
    low
}

async fn laplacian_low_quality(
    loader: std::sync::Arc<dyn crate::image_loader::ImageLoader>,
    images: Vec<ImageRef>,
) -> HashSet<String> {
    let mut low = HashSet::new();
    for image in images {
        let bytes = match loader.load(&image).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, image = %image, "failed to load image bytes for blur check");
                continue;
            }
        };
        let result = tokio::task::spawn_blocking(move || is_blurry(&bytes)).await;
        match result {
            Ok(Ok(true)) => {
                low.insert(image.0);
            }
            Ok(Ok(false)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "blur decode failed"),
            Err(e) => tracing::warn!(error = %e, "blur task failed"),
        }
    }
    low
}
