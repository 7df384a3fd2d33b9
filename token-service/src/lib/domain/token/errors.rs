use auth::DigestError;
use auth::JwtError;
use auth::RefreshTokenError;
use auth::SealError;
use thiserror::Error;

/// Error for UserId validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("User ID must not be empty")]
    Empty,

    #[error("User ID too long: maximum {max} bytes, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for token issuance and rotation.
///
/// Only `StorageUnavailable` is safe to retry automatically. `TokenNotFound`
/// deliberately covers consumed, swept, expired-at-store and never-issued
/// tokens alike.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token digest conflict: {0}")]
    Conflict(String),

    #[error("Token storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    /// Whether the whole operation may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::StorageUnavailable(_))
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => TokenError::ExpiredToken,
            JwtError::InvalidToken(_) => TokenError::InvalidToken,
            JwtError::WeakSecret { .. } | JwtError::EncodingFailed(_) => {
                TokenError::Signing(err.to_string())
            }
        }
    }
}

impl From<DigestError> for TokenError {
    fn from(err: DigestError) -> Self {
        TokenError::Signing(err.to_string())
    }
}

impl From<SealError> for TokenError {
    fn from(err: SealError) -> Self {
        match err {
            SealError::MalformedSeal(_) => TokenError::InvalidToken,
            SealError::SealingFailed(_) => TokenError::Signing(err.to_string()),
        }
    }
}

impl From<RefreshTokenError> for TokenError {
    fn from(err: RefreshTokenError) -> Self {
        TokenError::Signing(err.to_string())
    }
}
