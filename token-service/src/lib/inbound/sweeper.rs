use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::token::ports::TokenRotationPort;
use crate::token::errors::TokenError;

/// Periodically removes expired refresh tokens from the store.
pub struct ExpiredTokenSweeper {
    token_service: Arc<dyn TokenRotationPort>,
    interval: Duration,
}

impl ExpiredTokenSweeper {
    /// Shortest accepted sweep period; `tokio::time::interval` rejects zero.
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(token_service: Arc<dyn TokenRotationPort>, interval: Duration) -> Self {
        Self {
            token_service,
            interval: interval.max(Self::MIN_INTERVAL),
        }
    }

    /// Run a single sweep.
    pub async fn sweep(&self) -> Result<u64, TokenError> {
        let count = self.token_service.purge_expired().await?;
        tracing::debug!(count, "Expired token sweep finished");
        Ok(count)
    }

    /// Sweep forever at the configured interval. Failed sweeps are logged and
    /// retried on the next tick.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_seconds = self.interval.as_secs(),
            "Expired token sweeper started"
        );

        loop {
            ticker.tick().await;

            if let Err(e) = self.sweep().await {
                tracing::error!(error = %e, "Expired token sweep failed");
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::token::models::ClientContext;
    use crate::domain::token::models::TokenPair;
    use crate::domain::token::models::UserId;

    struct CountingService {
        calls: AtomicU64,
        fail: bool,
    }

    #[async_trait]
    impl TokenRotationPort for CountingService {
        async fn issue(
            &self,
            _user_id: &UserId,
            _client: ClientContext,
        ) -> Result<TokenPair, TokenError> {
            unimplemented!()
        }

        async fn rotate(
            &self,
            _user_id: &UserId,
            _refresh_token: &str,
            _client: ClientContext,
        ) -> Result<TokenPair, TokenError> {
            unimplemented!()
        }

        async fn validate_access(&self, _access_token: &str) -> Result<UserId, TokenError> {
            unimplemented!()
        }

        async fn purge_expired(&self) -> Result<u64, TokenError> {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                Err(TokenError::StorageUnavailable("connection refused".to_string()))
            } else {
                Ok(calls)
            }
        }
    }

    #[tokio::test]
    async fn test_sweep_reports_count() {
        let service = Arc::new(CountingService {
            calls: AtomicU64::new(0),
            fail: false,
        });
        let sweeper = ExpiredTokenSweeper::new(service.clone(), Duration::from_secs(60));

        assert_eq!(sweeper.sweep().await, Ok(1));
        assert_eq!(sweeper.sweep().await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_going_after_failures() {
        let service = Arc::new(CountingService {
            calls: AtomicU64::new(0),
            fail: true,
        });
        let handle =
            ExpiredTokenSweeper::new(service.clone(), Duration::from_secs(10)).spawn();

        tokio::time::sleep(Duration::from_secs(35)).await;
        handle.abort();

        assert!(service.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let service = Arc::new(CountingService {
            calls: AtomicU64::new(0),
            fail: false,
        });
        let handle = ExpiredTokenSweeper::new(service.clone(), Duration::ZERO).spawn();

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(!handle.is_finished());
        handle.abort();
        let calls = service.calls.load(Ordering::SeqCst);
        assert!((2..=3).contains(&calls));
    }
}
