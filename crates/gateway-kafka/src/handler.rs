use std::sync::Arc;

use gateway_core::context::AppContext;
use gateway_core::error::StatusTaxonomy;
use gateway_core::pipelines::{category, duplicate, embedding, highlight, people, quality};

use crate::envelope::{parse_header, ResponseEnvelope};
use crate::topics::Operation;

/// Validates and runs one record against the pipeline for `op`, returning
/// the serialized response envelope to produce to the matching response
/// topic. A malformed record still yields a 400 envelope rather than
/// failing the whole batch, matching each source handler's per-record
/// try/except.
pub async fn handle_record(op: Operation, raw: &[u8], ctx: &Arc<AppContext>) -> serde_json::Value {
    let (value, task_id, album_id) = match parse_header(raw) {
        Ok(parsed) => parsed,
        Err((task_id, album_id)) => {
            return serde_json::to_value(ResponseEnvelope::error(
                task_id,
                album_id,
                StatusTaxonomy::InvalidRequest,
                serde_json::Value::Null,
            ))
            .expect("static error envelope always serializes");
        }
    };

    macro_rules! run_or_400 {
        ($module:ident) => {{
            match serde_json::from_value(value) {
                Ok(req) => {
                    let outcome = $module::run(ctx, req).await;
                    serde_json::to_value(ResponseEnvelope::from_outcome(task_id, album_id, outcome))
                }
                Err(_) => serde_json::to_value(ResponseEnvelope::error(
                    task_id,
                    album_id,
                    StatusTaxonomy::InvalidRequest,
                    serde_json::Value::Null,
                )),
            }
            .expect("envelope always serializes")
        }};
    }

    match op {
        Operation::Embedding => run_or_400!(embedding),
        Operation::Category => run_or_400!(category),
        Operation::Duplicate => run_or_400!(duplicate),
        Operation::Quality => run_or_400!(quality),
        Operation::Score => run_or_400!(highlight),
        Operation::People => run_or_400!(people),
    }
}
