use ficha_core::BackendError;

/// Errors raised by the REST client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("not authenticated")]
    Unauthorized,
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("invalid payload from backend: {0}")]
    InvalidWire(String),
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => BackendError::Unauthorized,
            ApiError::Status { status, detail } => BackendError::Status { status, detail },
            ApiError::Request(source) => BackendError::Transport(Box::new(source)),
            ApiError::InvalidWire(detail) => BackendError::InvalidWire(detail),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
