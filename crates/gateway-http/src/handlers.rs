use std::sync::Arc;

use axum::{Extension, Json};
use gateway_core::context::AppContext;
use gateway_core::limiters::Limiters;
use gateway_core::pipelines::{category, duplicate, embedding, highlight, people, quality};

use crate::response::HttpOutcome;

/// Acquires `sem` before running `$body`, releasing the permit when the
/// guard drops at the end of the handler -- the thin HTTP-ingress
/// counterpart of `Limiters::acquire_timed` used by the embedding service.
macro_rules! gated {
    ($ctx:expr, $sem:expr, $op:expr, $body:expr) => {{
        let limiters = $ctx.limiters.clone();
        let (_permit, _waited) = match Limiters::acquire_timed($sem(&limiters), limiters.acquire_timeout, $op).await
        {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, op = $op, "concurrency limiter timeout");
                return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        $body
    }};
}

use axum::response::IntoResponse;

pub async fn embedding_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Json(req): Json<embedding::EmbeddingRequest>,
) -> axum::response::Response {
    gated!(ctx, |l: &Limiters| l.embedding.clone(), "embedding", {
        HttpOutcome(embedding::run(&ctx, req).await).into_response()
    })
}

pub async fn categories_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Json(req): Json<category::CategoryRequest>,
) -> axum::response::Response {
    gated!(ctx, |l: &Limiters| l.category.clone(), "category", {
        HttpOutcome(category::run(&ctx, req).await).into_response()
    })
}

pub async fn duplicates_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Json(req): Json<duplicate::DuplicateRequest>,
) -> axum::response::Response {
    gated!(ctx, |l: &Limiters| l.duplicate.clone(), "duplicate", {
        HttpOutcome(duplicate::run(&ctx, req).await).into_response()
    })
}

pub async fn quality_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Json(req): Json<quality::QualityRequest>,
) -> axum::response::Response {
    gated!(ctx, |l: &Limiters| l.quality.clone(), "quality", {
        HttpOutcome(quality::run(&ctx, req).await).into_response()
    })
}

pub async fn score_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Json(req): Json<highlight::ScoreRequest>,
) -> axum::response::Response {
    gated!(ctx, |l: &Limiters| l.score.clone(), "score", {
        HttpOutcome(highlight::run(&ctx, req).await).into_response()
    })
}

pub async fn people_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Json(req): Json<people::PeopleRequest>,
) -> axum::response::Response {
    gated!(ctx, |l: &Limiters| l.people.clone(), "people", {
        HttpOutcome(people::run(&ctx, req).await).into_response()
    })
}
