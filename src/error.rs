use thiserror::Error;

/// Errors raised by the cache model itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid reference kind {0:?}, expected one of: I, L, S")]
    InvalidReference(String),
}

/// Errors raised while reading a memory reference trace.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Reference {
        line: usize,
        #[source]
        source: CacheError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
