use thiserror::Error;

/// Error type for at-rest seal operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SealError {
    #[error("Sealing failed: {0}")]
    SealingFailed(String),

    #[error("Stored seal is malformed: {0}")]
    MalformedSeal(String),
}
