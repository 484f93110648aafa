use thiserror::Error;

/// TRELLIS 平台统一错误类型
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("Rule store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, TrellisError>;

impl From<anyhow::Error> for TrellisError {
    fn from(err: anyhow::Error) -> Self {
        TrellisError::Internal(err.to_string())
    }
}
