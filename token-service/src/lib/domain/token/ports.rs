use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::token::models::ClientContext;
use crate::domain::token::models::RefreshTokenId;
use crate::domain::token::models::RefreshTokenRecord;
use crate::domain::token::models::TokenPair;
use crate::domain::token::models::UserId;
use crate::token::errors::TokenError;

/// Port for token issuance and rotation.
#[async_trait]
pub trait TokenRotationPort: Send + Sync + 'static {
    /// Issue a fresh access/refresh token pair.
    ///
    /// # Arguments
    /// * `user_id` - Already authenticated user
    /// * `client` - Client details stored with the refresh token
    ///
    /// # Returns
    /// Token pair; the refresh token plaintext is not retrievable afterwards
    ///
    /// # Errors
    /// * `Conflict` - Digest collision persisted across retries
    /// * `StorageUnavailable` - Store failed or timed out
    /// * `Signing` - Key or random source failure
    async fn issue(&self, user_id: &UserId, client: ClientContext)
        -> Result<TokenPair, TokenError>;

    /// Exchange a refresh token for a new pair.
    ///
    /// The presented token is consumed whether or not the exchange succeeds.
    ///
    /// # Arguments
    /// * `user_id` - User the caller claims the token belongs to
    /// * `refresh_token` - Plaintext refresh token presented by the client
    /// * `client` - Client details stored with the new refresh token
    ///
    /// # Returns
    /// New token pair
    ///
    /// # Errors
    /// * `TokenNotFound` - Unknown, already rotated, swept or expired token
    /// * `InvalidToken` - Token belongs to another user
    /// * `ExpiredToken` - Token expired by the service clock
    /// * `StorageUnavailable` - Store failed or timed out
    async fn rotate(
        &self,
        user_id: &UserId,
        refresh_token: &str,
        client: ClientContext,
    ) -> Result<TokenPair, TokenError>;

    /// Verify an access token.
    ///
    /// # Returns
    /// User the token was issued to
    ///
    /// # Errors
    /// * `ExpiredToken` - Authentic but past its expiry
    /// * `InvalidToken` - Forged, malformed or not yet valid
    async fn validate_access(&self, access_token: &str) -> Result<UserId, TokenError>;

    /// Remove every refresh token already past its expiry.
    ///
    /// # Returns
    /// Number of records removed
    ///
    /// # Errors
    /// * `StorageUnavailable` - Store failed or timed out
    async fn purge_expired(&self) -> Result<u64, TokenError>;
}

/// Durable storage of refresh token records, keyed by token digest.
///
/// Implementations own the record set exclusively. `consume_by_digest` must be
/// atomic across processes: of any number of concurrent calls with the same
/// digest, at most one returns the record.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + 'static {
    /// Persist a new record.
    ///
    /// # Returns
    /// Stored record
    ///
    /// # Errors
    /// * `Conflict` - A live record with the same digest exists
    /// * `StorageUnavailable` - Storage operation failed
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, TokenError>;

    /// Atomically look up and delete the record with this digest.
    ///
    /// A matching record already past its expiry is deleted too, but reported
    /// as not found.
    ///
    /// # Returns
    /// The deleted live record
    ///
    /// # Errors
    /// * `TokenNotFound` - No live record matched
    /// * `StorageUnavailable` - Storage operation failed
    async fn consume_by_digest(&self, digest: &str) -> Result<RefreshTokenRecord, TokenError>;

    /// Read a record without consuming it.
    ///
    /// # Returns
    /// Optional record (None if not found)
    ///
    /// # Errors
    /// * `StorageUnavailable` - Storage operation failed
    async fn find_by_digest(&self, digest: &str)
        -> Result<Option<RefreshTokenRecord>, TokenError>;

    /// Delete a record by its surrogate key.
    ///
    /// # Errors
    /// * `TokenNotFound` - No record with this ID
    /// * `StorageUnavailable` - Storage operation failed
    async fn delete_by_id(&self, id: &RefreshTokenId) -> Result<(), TokenError>;

    /// Delete every record with `expires_at < before`.
    ///
    /// # Returns
    /// Number of records removed
    ///
    /// # Errors
    /// * `StorageUnavailable` - Storage operation failed
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, TokenError>;
}
