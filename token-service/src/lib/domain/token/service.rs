use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use auth::generate_refresh_token;
use auth::AccessTokenCodec;
use auth::Clock;
use auth::TokenHasher;
use auth::TokenSealer;
use chrono::Duration;

use crate::domain::token::models::ClientContext;
use crate::domain::token::models::RefreshTokenId;
use crate::domain::token::models::RefreshTokenRecord;
use crate::domain::token::models::TokenPair;
use crate::domain::token::models::UserId;
use crate::token::errors::TokenError;
use crate::token::ports::RefreshTokenStore;
use crate::token::ports::TokenRotationPort;

/// Attempts at storing a freshly generated refresh token before a digest
/// conflict is reported to the caller.
const MAX_INSERT_ATTEMPTS: u32 = 3;

/// Tunables of the rotation manager.
#[derive(Debug, Clone)]
pub struct RotationSettings {
    /// Lifetime of refresh tokens
    pub refresh_ttl: Duration,
    /// Deadline applied to every store call
    pub store_timeout: std::time::Duration,
    /// Store an Argon2id seal of each refresh token next to its digest
    pub seal_at_rest: bool,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            refresh_ttl: Duration::days(7),
            store_timeout: std::time::Duration::from_secs(5),
            seal_at_rest: false,
        }
    }
}

/// Domain service issuing and rotating token pairs.
///
/// Every collaborator is injected: the store owns the refresh token records,
/// the codec owns the signing key, the hasher owns the digest key. The manager
/// keeps no state of its own between calls.
pub struct RotationManager<S>
where
    S: RefreshTokenStore,
{
    store: Arc<S>,
    codec: Arc<AccessTokenCodec>,
    hasher: TokenHasher,
    sealer: TokenSealer,
    clock: Arc<dyn Clock>,
    settings: RotationSettings,
}

impl<S> RotationManager<S>
where
    S: RefreshTokenStore,
{
    /// Create a new rotation manager with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Refresh token persistence implementation
    /// * `codec` - Access token signer/verifier
    /// * `hasher` - Keyed digest used as the store lookup key
    /// * `clock` - Time source for expiry decisions
    /// * `settings` - Refresh TTL, store deadline and sealing switch
    ///
    /// # Returns
    /// Configured rotation manager instance
    pub fn new(
        store: Arc<S>,
        codec: Arc<AccessTokenCodec>,
        hasher: TokenHasher,
        clock: Arc<dyn Clock>,
        settings: RotationSettings,
    ) -> Self {
        Self {
            store,
            codec,
            hasher,
            sealer: TokenSealer::new(),
            clock,
            settings,
        }
    }

    /// Run a store operation under the configured deadline.
    async fn with_deadline<T, F>(&self, operation: F) -> Result<T, TokenError>
    where
        F: Future<Output = Result<T, TokenError>>,
    {
        tokio::time::timeout(self.settings.store_timeout, operation)
            .await
            .map_err(|_| {
                TokenError::StorageUnavailable(format!(
                    "store operation exceeded {} ms",
                    self.settings.store_timeout.as_millis()
                ))
            })?
    }

    async fn seal(&self, plaintext: &str) -> Result<Option<String>, TokenError> {
        if !self.settings.seal_at_rest {
            return Ok(None);
        }

        let sealer = self.sealer.clone();
        let plaintext = plaintext.to_string();
        let seal = tokio::task::spawn_blocking(move || sealer.seal(&plaintext))
            .await
            .map_err(|e| TokenError::Signing(e.to_string()))??;

        Ok(Some(seal))
    }

    async fn verify_seal(&self, plaintext: &str, seal: &str) -> Result<bool, TokenError> {
        let sealer = self.sealer.clone();
        let plaintext = plaintext.to_string();
        let seal = seal.to_string();

        let matches = tokio::task::spawn_blocking(move || sealer.verify(&plaintext, &seal))
            .await
            .map_err(|e| TokenError::Signing(e.to_string()))??;

        Ok(matches)
    }

    /// Generate, digest and persist a new refresh token.
    ///
    /// A digest conflict is answered with a fresh random value, up to
    /// `MAX_INSERT_ATTEMPTS` times.
    async fn store_refresh_token(
        &self,
        user_id: &UserId,
        client: ClientContext,
    ) -> Result<(String, RefreshTokenRecord), TokenError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let plaintext = generate_refresh_token()?;
            let token_digest = self.hasher.digest(&plaintext)?;
            let token_seal = self.seal(&plaintext).await?;
            let issued_at = self.clock.now();

            let record = RefreshTokenRecord {
                id: RefreshTokenId::new(),
                user_id: user_id.clone(),
                token_digest,
                token_seal,
                client: client.clone(),
                issued_at,
                expires_at: issued_at + self.settings.refresh_ttl,
            };

            match self.with_deadline(self.store.insert(record)).await {
                Ok(stored) => return Ok((plaintext, stored)),
                Err(TokenError::Conflict(_)) if attempt < MAX_INSERT_ATTEMPTS => {
                    tracing::warn!(
                        user_id = %user_id,
                        attempt,
                        "Refresh token digest conflict, regenerating"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<S> TokenRotationPort for RotationManager<S>
where
    S: RefreshTokenStore,
{
    async fn issue(
        &self,
        user_id: &UserId,
        client: ClientContext,
    ) -> Result<TokenPair, TokenError> {
        let (refresh_token, record) = self.store_refresh_token(user_id, client).await?;

        let access = match self.codec.sign(user_id.as_str()) {
            Ok(signed) => signed,
            Err(e) => {
                // The plaintext never reaches the client, so the record is unreachable.
                let cleanup = self.with_deadline(self.store.delete_by_id(&record.id)).await;
                if let Err(cleanup) = cleanup {
                    tracing::error!(
                        record_id = %record.id,
                        error = %cleanup,
                        "Failed to remove refresh token after signing failure"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(
            user_id = %user_id,
            record_id = %record.id,
            refresh_expires_at = %record.expires_at,
            "Token pair issued"
        );

        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
            expires_at: access.expires_at,
        })
    }

    async fn rotate(
        &self,
        user_id: &UserId,
        refresh_token: &str,
        client: ClientContext,
    ) -> Result<TokenPair, TokenError> {
        let digest = self.hasher.digest(refresh_token)?;

        let record = match self
            .with_deadline(self.store.consume_by_digest(&digest))
            .await
        {
            Ok(record) => record,
            Err(TokenError::TokenNotFound) => {
                tracing::warn!(
                    user_id = %user_id,
                    "Refresh token not found (unknown, expired or already rotated)"
                );
                return Err(TokenError::TokenNotFound);
            }
            Err(e) => return Err(e),
        };

        // From here on the presented token is gone whatever the outcome.
        if record.user_id != *user_id {
            tracing::warn!(
                user_id = %user_id,
                record_id = %record.id,
                "Refresh token presented for another user"
            );
            return Err(TokenError::InvalidToken);
        }

        if !record.is_live(self.clock.now()) {
            tracing::debug!(record_id = %record.id, "Consumed refresh token was expired");
            return Err(TokenError::ExpiredToken);
        }

        if let Some(seal) = &record.token_seal {
            if !self.verify_seal(refresh_token, seal).await? {
                tracing::warn!(record_id = %record.id, "Refresh token seal mismatch");
                return Err(TokenError::InvalidToken);
            }
        }

        tracing::debug!(user_id = %user_id, record_id = %record.id, "Refresh token consumed");

        self.issue(user_id, client).await
    }

    async fn validate_access(&self, access_token: &str) -> Result<UserId, TokenError> {
        let user_id = self.codec.verify(access_token)?;
        UserId::new(user_id).map_err(|_| TokenError::InvalidToken)
    }

    async fn purge_expired(&self) -> Result<u64, TokenError> {
        let now = self.clock.now();
        let removed = self
            .with_deadline(self.store.delete_expired(now))
            .await?;

        if removed > 0 {
            tracing::info!(count = removed, "Expired refresh tokens purged");
        }

        Ok(removed)
    }
}
