use thiserror::Error;

pub type ResourceResult<T> = std::result::Result<T, ResourceError>;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid create spec: {0}")]
    InvalidSpec(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
