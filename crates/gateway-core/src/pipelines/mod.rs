pub mod category;
pub mod duplicate;
pub mod embedding;
pub mod highlight;
pub mod people;
pub mod quality;

use futures::FutureExt;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::{PipelineOutcome, StatusTaxonomy};
use crate::model::ImageRef;
use crate::vecmath::normalize_rows;

/// The shared prologue for the four vector pipelines: fetch every image's
/// cached embedding, and if any are missing, short-circuit with 428 and the
/// list of missing refs. On success, returns the embeddings L2-normalized
/// and in input order.
pub async fn fetch_and_normalize(
    ctx: &AppContext,
    images: &[ImageRef],
) -> Result<Vec<Vec<f32>>, PipelineOutcome<Vec<String>>> {
    let (values, missing) = ctx.cache.get_many(images).await;
    if !missing.is_empty() {
        let missing_refs = missing.into_iter().map(|r| r.0).collect::<Vec<_>>();
        return Err(PipelineOutcome::new(
            StatusTaxonomy::EmbeddingRequired,
            missing_refs,
        ));
    }

    let mut rows: Vec<Vec<f32>> = values
        .into_iter()
        .map(|v| v.expect("checked non-missing above").into_vec())
        .collect();
    normalize_rows(&mut rows);
    Ok(rows)
}

/// Runs a pipeline body, catching a panic raised inside `f` and downgrading
/// it to the uniform 500 outcome instead of propagating -- the Rust
/// counterpart of each source pipeline's outer `try/except Exception`.
pub async fn run_guarded<T, F>(op: &'static str, f: F) -> PipelineOutcome<T>
where
    T: Serialize + Default,
    F: std::future::Future<Output = PipelineOutcome<T>>,
{
    // `AssertUnwindSafe` is acceptable here: on panic we discard all
    // pipeline-local state and return a fixed error body, so nothing
    // partially-mutated is ever observed by the caller.
    match std::panic::AssertUnwindSafe(f).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!(op, "pipeline panicked, returning internal_server_error");
            PipelineOutcome::new(StatusTaxonomy::InternalError, T::default())
        }
    }
}
