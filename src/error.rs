use thiserror::Error;

/// Failures from the shared position namespace.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),
    #[error("no record under key {0:?}")]
    Missing(String),
}

/// Why a peer's position line was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record has {found} fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },
    #[error("field `{field}` has unparsable value {value:?}")]
    BadField { field: &'static str, value: String },
    #[error("record is not valid UTF-8")]
    NotUtf8,
}
