use thiserror::Error;

/// Error type for token digest operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("Digest key too short: minimum {min} bytes, got {actual}")]
    WeakKey { min: usize, actual: usize },

    #[error("Digest computation failed: {0}")]
    ComputationFailed(String),
}
