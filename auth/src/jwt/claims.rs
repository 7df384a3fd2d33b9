use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by an access token.
///
/// All fields are mandatory: a token missing any of them does not
/// deserialize and is rejected as invalid. Timestamps are NumericDate values
/// in Unix seconds with millisecond fractions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Unique token identifier
    pub jti: String,

    /// Identifier of the authenticated user
    pub user_id: String,

    /// Issued at (Unix timestamp)
    pub iat: f64,

    /// Not before (Unix timestamp)
    pub nbf: f64,

    /// Expiration time (Unix timestamp, inclusive)
    pub exp: f64,
}

impl AccessTokenClaims {
    /// Build claims for a token issued at `now` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `user_id` - User identifier to embed
    /// * `now` - Issue instant
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with a fresh `jti`, `iat = nbf = now` and `exp = now + ttl`
    pub fn new(user_id: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            jti: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            iat: instant_to_numeric_date(now),
            nbf: instant_to_numeric_date(now),
            exp: instant_to_numeric_date(now + ttl),
        }
    }

    /// Check if the token is past its expiry at `now`.
    ///
    /// The validity window `[nbf, exp]` is inclusive at both ends.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > numeric_date_to_instant(self.exp)
    }

    /// Check if the token is not yet valid at `now`.
    pub fn is_premature(&self, now: DateTime<Utc>) -> bool {
        now < numeric_date_to_instant(self.nbf)
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        numeric_date_to_instant(self.exp)
    }
}

fn instant_to_numeric_date(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 1000.0
}

fn numeric_date_to_instant(seconds: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
