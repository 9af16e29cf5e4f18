use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use gateway_core::error::PipelineOutcome;
use serde::Serialize;

/// Adapts a pipeline outcome into an axum response: the status taxonomy's
/// numeric code plus the shared `{message, data}` envelope.
pub struct HttpOutcome<T: Serialize>(pub PipelineOutcome<T>);

impl<T: Serialize> IntoResponse for HttpOutcome<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}
