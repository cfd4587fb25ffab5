use thiserror::Error;

/// Failure modes of the word service collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached or produced no answer.
    #[error("word service unavailable: {0}")]
    Network(String),

    /// The service rejected the request or answered with an unexpected shape.
    #[error("malformed word request: {0}")]
    Format(String),
}

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("stats storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stats serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
