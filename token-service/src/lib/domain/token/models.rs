use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::token::errors::UserIdError;

/// User identifier supplied by the caller.
///
/// The service trusts whoever authenticated the user upstream; it only
/// checks the identifier is usable as a claim and a column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    const MAX_LENGTH: usize = 255;

    /// Create a validated user ID.
    ///
    /// # Errors
    /// * `Empty` - Identifier is empty or whitespace
    /// * `TooLong` - Identifier longer than 255 bytes
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(UserIdError::Empty);
        }

        if id.len() > Self::MAX_LENGTH {
            return Err(UserIdError::TooLong {
                max: Self::MAX_LENGTH,
                actual: id.len(),
            });
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Surrogate identifier of a stored refresh token record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTokenId(pub Uuid);

impl RefreshTokenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RefreshTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Client details recorded alongside a refresh token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClientContext {
    pub fn new(user_agent: Option<String>, ip_address: Option<String>) -> Self {
        Self {
            user_agent,
            ip_address,
        }
    }
}

/// Stored refresh token.
///
/// Holds only the keyed digest of the plaintext (and optionally a salted
/// seal). Records are never updated: they are inserted once and removed by a
/// consume or by the expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_digest: String,
    pub token_seal: Option<String>,
    pub client: ClientContext,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Whether the record is still usable at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Tokens handed to the client after a successful issue or rotation.
///
/// `refresh_token` is the only copy of the plaintext that ever leaves the
/// service. `expires_at` is the access token expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_user_id_valid() {
        let id = UserId::new("user-123").unwrap();
        assert_eq!(id.as_str(), "user-123");
        assert_eq!(id.to_string(), "user-123");
    }

    #[test]
    fn test_user_id_empty() {
        assert_eq!(UserId::new(""), Err(UserIdError::Empty));
        assert_eq!(UserId::new("   "), Err(UserIdError::Empty));
    }

    #[test]
    fn test_user_id_too_long() {
        let result = UserId::new("a".repeat(256));
        assert_eq!(
            result,
            Err(UserIdError::TooLong {
                max: 255,
                actual: 256
            })
        );
    }

    #[test]
    fn test_record_liveness() {
        let now = Utc::now();
        let record = RefreshTokenRecord {
            id: RefreshTokenId::new(),
            user_id: UserId::new("user-123").unwrap(),
            token_digest: "digest".to_string(),
            token_seal: None,
            client: ClientContext::default(),
            issued_at: now,
            expires_at: now + Duration::days(7),
        };

        assert!(record.is_live(now));
        assert!(!record.is_live(now + Duration::days(7)));
    }
}
