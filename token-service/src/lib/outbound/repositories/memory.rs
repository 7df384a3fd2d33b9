use std::sync::Arc;

use async_trait::async_trait;
use auth::Clock;
use auth::SystemClock;
use chrono::DateTime;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::token::models::RefreshTokenId;
use crate::domain::token::models::RefreshTokenRecord;
use crate::domain::token::ports::RefreshTokenStore;
use crate::token::errors::TokenError;

/// Refresh token store held in process memory.
///
/// Records are keyed by digest in a sharded concurrent map. `DashMap::remove`
/// takes the shard write lock, so a consume is atomic within the process. Not
/// suitable for deployments with more than one process.
pub struct InMemoryRefreshTokenStore {
    records: DashMap<String, RefreshTokenRecord>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRefreshTokenStore {
    /// Create an empty store using the wall clock for liveness.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// Number of records currently held, live or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, TokenError> {
        let now = self.clock.now();

        match self.records.entry(record.token_digest.clone()) {
            Entry::Occupied(existing) if existing.get().is_live(now) => Err(TokenError::Conflict(
                "live refresh token with the same digest exists".to_string(),
            )),
            Entry::Occupied(mut expired) => {
                expired.insert(record.clone());
                Ok(record)
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn consume_by_digest(&self, digest: &str) -> Result<RefreshTokenRecord, TokenError> {
        let (_, record) = self
            .records
            .remove(digest)
            .ok_or(TokenError::TokenNotFound)?;

        if record.is_live(self.clock.now()) {
            Ok(record)
        } else {
            Err(TokenError::TokenNotFound)
        }
    }

    async fn find_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<RefreshTokenRecord>, TokenError> {
        Ok(self.records.get(digest).map(|entry| entry.value().clone()))
    }

    async fn delete_by_id(&self, id: &RefreshTokenId) -> Result<(), TokenError> {
        let digest = self
            .records
            .iter()
            .find(|entry| entry.value().id == *id)
            .map(|entry| entry.key().clone())
            .ok_or(TokenError::TokenNotFound)?;

        self.records
            .remove_if(&digest, |_, record| record.id == *id)
            .map(|_| ())
            .ok_or(TokenError::TokenNotFound)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, TokenError> {
        let mut removed = 0u64;
        self.records.retain(|_, record| {
            let keep = record.expires_at >= before;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
