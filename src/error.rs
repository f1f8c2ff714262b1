use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarketError>;

/// Error taxonomy for the marketplace core.
///
/// Ownership misses are reported as `NotFound` with the same message as a
/// genuinely absent record, so callers cannot probe for records owned by
/// someone else.
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("terminal state: {0}")]
    TerminalState(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for MarketError {
    fn from(err: rocksdb::Error) -> Self {
        MarketError::Internal(Box::new(err))
    }
}
