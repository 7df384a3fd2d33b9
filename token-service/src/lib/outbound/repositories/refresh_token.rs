use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::token::models::ClientContext;
use crate::domain::token::models::RefreshTokenId;
use crate::domain::token::models::RefreshTokenRecord;
use crate::domain::token::models::UserId;
use crate::domain::token::ports::RefreshTokenStore;
use crate::token::errors::TokenError;

/// Refresh token store backed by PostgreSQL.
///
/// Liveness is judged by the database clock (`NOW()`), so every process
/// sharing the table agrees on it.
pub struct PostgresRefreshTokenStore {
    pool: PgPool,
}

impl PostgresRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: String,
    token_digest: String,
    token_seal: Option<String>,
    user_agent: Option<String>,
    ip_address: Option<String>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ConsumedRow {
    #[sqlx(flatten)]
    record: RefreshTokenRow,
    live: bool,
}

impl TryFrom<RefreshTokenRow> for RefreshTokenRecord {
    type Error = TokenError;

    fn try_from(row: RefreshTokenRow) -> Result<Self, Self::Error> {
        Ok(RefreshTokenRecord {
            id: RefreshTokenId(row.id),
            user_id: UserId::new(row.user_id)?,
            token_digest: row.token_digest,
            token_seal: row.token_seal,
            client: ClientContext::new(row.user_agent, row.ip_address),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        })
    }
}

fn storage_error(e: sqlx::Error) -> TokenError {
    TokenError::StorageUnavailable(e.to_string())
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, TokenError> {
        // An expired leftover with the same digest is replaced; a live one wins.
        let result = sqlx::query(
            r#"
            INSERT INTO refresh_tokens
                (id, user_id, token_digest, token_seal, user_agent, ip_address, issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (token_digest) DO UPDATE
            SET id = EXCLUDED.id,
                user_id = EXCLUDED.user_id,
                token_seal = EXCLUDED.token_seal,
                user_agent = EXCLUDED.user_agent,
                ip_address = EXCLUDED.ip_address,
                issued_at = EXCLUDED.issued_at,
                expires_at = EXCLUDED.expires_at
            WHERE refresh_tokens.expires_at <= NOW()
            "#,
        )
        .bind(record.id.0)
        .bind(record.user_id.as_str())
        .bind(&record.token_digest)
        .bind(record.token_seal.as_deref())
        .bind(record.client.user_agent.as_deref())
        .bind(record.client.ip_address.as_deref())
        .bind(record.issued_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return TokenError::Conflict(format!("record {} already exists", record.id));
                }
            }
            storage_error(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(TokenError::Conflict(
                "live refresh token with the same digest exists".to_string(),
            ));
        }

        Ok(record)
    }

    async fn consume_by_digest(&self, digest: &str) -> Result<RefreshTokenRecord, TokenError> {
        // A single DELETE ... RETURNING: concurrent callers serialize on the
        // row lock and only the first one gets a row back.
        let row = sqlx::query_as::<_, ConsumedRow>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token_digest = $1
            RETURNING id, user_id, token_digest, token_seal, user_agent, ip_address,
                      issued_at, expires_at, (expires_at > NOW()) AS live
            "#,
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(ConsumedRow { record, live: true }) => record.try_into(),
            Some(ConsumedRow { record, live: false }) => {
                tracing::debug!(record_id = %record.id, "Consumed refresh token was already expired");
                Err(TokenError::TokenNotFound)
            }
            None => Err(TokenError::TokenNotFound),
        }
    }

    async fn find_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<RefreshTokenRecord>, TokenError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, user_id, token_digest, token_seal, user_agent, ip_address,
                   issued_at, expires_at
            FROM refresh_tokens
            WHERE token_digest = $1
            "#,
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(RefreshTokenRecord::try_from).transpose()
    }

    async fn delete_by_id(&self, id: &RefreshTokenId) -> Result<(), TokenError> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(TokenError::TokenNotFound);
        }

        Ok(())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, TokenError> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected())
    }
}
