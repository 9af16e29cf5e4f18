use serde::Serialize;

/// Closed status taxonomy shared by the HTTP and Kafka surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTaxonomy {
    Success,
    InvalidRequest,
    Unauthorized,
    EmbeddingRequired,
    InternalError,
}

impl StatusTaxonomy {
    pub fn code(self) -> u16 {
        match self {
            StatusTaxonomy::Success => 201,
            StatusTaxonomy::InvalidRequest => 400,
            StatusTaxonomy::Unauthorized => 403,
            StatusTaxonomy::EmbeddingRequired => 428,
            StatusTaxonomy::InternalError => 500,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StatusTaxonomy::Success => "success",
            StatusTaxonomy::InvalidRequest => "invalid_request",
            StatusTaxonomy::Unauthorized => "unauthorized_server",
            StatusTaxonomy::EmbeddingRequired => "embedding_required",
            StatusTaxonomy::InternalError => "internal_server_error",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            201 => StatusTaxonomy::Success,
            400 => StatusTaxonomy::InvalidRequest,
            403 => StatusTaxonomy::Unauthorized,
            428 => StatusTaxonomy::EmbeddingRequired,
            500 => StatusTaxonomy::InternalError,
            _ => return None,
        })
    }
}

/// Errors raised by the cache coordinator's `set` path. `get`/`get_many`
/// never surface this -- a backend failure on read degrades to a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache limiter timeout acquiring permit")]
    LimiterTimeout,
}

/// Errors raised by the remote GPU client.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("gpu service returned non-success status: {0}")]
    HttpStatus(u16),
    #[error("gpu service response message was not \"success\": {0}")]
    BadMessage(String),
    #[error("gpu service request timed out")]
    Timeout,
    #[error("gpu service request failed: {0}")]
    Transport(String),
    #[error("gpu service response could not be decoded: {0}")]
    Decode(String),
}

/// The body shared by every response, regardless of ingress surface.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseBody<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> ResponseBody<T> {
    pub fn new(status: StatusTaxonomy, data: T) -> Self {
        Self {
            message: status.message(),
            data,
        }
    }
}

/// A fully formed pipeline outcome: status code plus its typed body data.
pub struct PipelineOutcome<T: Serialize> {
    pub status: StatusTaxonomy,
    pub body: ResponseBody<T>,
}

impl<T: Serialize> PipelineOutcome<T> {
    pub fn new(status: StatusTaxonomy, data: T) -> Self {
        Self {
            status,
            body: ResponseBody::new(status, data),
        }
    }
}
