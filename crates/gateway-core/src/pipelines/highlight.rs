use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::model::ImageRef;

use super::{fetch_and_normalize, run_guarded};

#[derive(Debug, Deserialize)]
pub struct ScoreCategoryRequest {
    pub category: String,
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub categories: Vec<ScoreCategoryRequest>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ImageScore {
    pub image: String,
    pub score: f32,
}

#[derive(Debug, Serialize, Clone)]
pub struct CategoryScores {
    pub category: String,
    pub images: Vec<ImageScore>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScoreResponseData {
    Scores(Vec<CategoryScores>),
    Missing(Vec<String>),
}

impl Default for ScoreResponseData {
    fn default() -> Self {
        ScoreResponseData::Scores(Vec::new())
    }
}

pub async fn run(ctx: &AppContext, req: ScoreRequest) -> PipelineOutcome<ScoreResponseData> {
    run_guarded("score", run_inner(ctx, req)).await
}

async fn run_inner(ctx: &AppContext, req: ScoreRequest) -> PipelineOutcome<ScoreResponseData> {
    if req.categories.is_empty() || req.categories.iter().all(|c| c.images.is_empty()) {
        return PipelineOutcome::new(StatusTaxonomy::InvalidRequest, ScoreResponseData::default());
    }

    // Flatten to one cache lookup across every category so a single
    // embedding shared by two buckets only costs one round trip.
    let all_images: Vec<ImageRef> = req
        .categories
        .iter()
        .flat_map(|c| c.images.iter().cloned())
        .collect();

    let rows = match fetch_and_normalize(ctx, &all_images).await {
        Ok(rows) => rows,
        Err(outcome) => {
            return PipelineOutcome::new(outcome.status, ScoreResponseData::Missing(outcome.body.data));
        }
    };

    let regressor = ctx.regressor.clone();
    let categories = req.categories;
    let result = tokio::task::spawn_blocking(move || {
        let mut offset = 0usize;
        let mut out = Vec::with_capacity(categories.len());
        for cat in categories {
            let n = cat.images.len();
            let bucket_rows = &rows[offset..offset + n];
            offset += n;

            let images = cat
                .images
                .iter()
                .zip(bucket_rows.iter())
                .map(|(img, row)| ImageScore {
                    image: img.0.clone(),
                    score: regressor.score(row),
                })
                .collect();

            out.push(CategoryScores { category: cat.category, images });
        }
        out
    })
    .await;

    match result {
        Ok(scores) => PipelineOutcome::new(StatusTaxonomy::Success, ScoreResponseData::Scores(scores)),
        Err(e) => {
            tracing::error!(error = %e, "highlight scoring task failed");
            PipelineOutcome::new(StatusTaxonomy::InternalError, ScoreResponseData::default())
        }
    }
}
