use gateway_core::error::{PipelineOutcome, ResponseBody, StatusTaxonomy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope fields every request carries regardless of operation.
/// Parsed from the raw JSON value first so a malformed or missing
/// `taskId`/`albumId` can be reported even when the operation-specific
/// payload fails to deserialize.
#[derive(Debug, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
    #[serde(rename = "albumId")]
    pub album_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ResponseEnvelope<T: Serialize> {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "albumId")]
    pub album_id: i64,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody<T>,
}

impl<T: Serialize> ResponseEnvelope<T> {
    pub fn from_outcome(task_id: String, album_id: i64, outcome: PipelineOutcome<T>) -> Self {
        Self {
            task_id,
            album_id,
            status_code: outcome.status.code(),
            body: outcome.body,
        }
    }

    pub fn error(task_id: String, album_id: i64, status: StatusTaxonomy, data: T) -> Self {
        Self {
            task_id,
            album_id,
            status_code: status.code(),
            body: ResponseBody::new(status, data),
        }
    }
}

/// Parses the raw Kafka record value, validating the envelope header is
/// present. Returns `Err` with a ready-to-serialize 400 response when the
/// record itself is malformed -- the per-partition handler still keeps
/// processing the rest of the batch in that case.
pub fn parse_header(raw: &[u8]) -> Result<(Value, String, i64), (String, i64)> {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(v) => v,
        Err(_) => return Err(("unknown".to_string(), 0)),
    };
    let header: EnvelopeHeader = match serde_json::from_value(value.clone()) {
        Ok(h) => h,
        Err(_) => return Err(("unknown".to_string(), 0)),
    };
    match (header.task_id, header.album_id) {
        (Some(task_id), Some(album_id)) => Ok((value, task_id, album_id)),
        (task_id, album_id) => Err((task_id.unwrap_or_else(|| "unknown".to_string()), album_id.unwrap_or(0))),
    }
}
