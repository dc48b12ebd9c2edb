/// Bearer token records
///
/// Only the SHA-256 digest of a token is stored; see [`crate::auth::token`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE personal_access_tokens (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     last_used_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PersonalAccessToken {
    pub id: i64,

    pub user_id: i64,

    /// Hex SHA-256 digest of the plaintext token
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// Touched on every successful validation
    pub last_used_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl PersonalAccessToken {
    /// Stores the digest of a freshly issued token
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        token_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        let token = sqlx::query_as::<_, PersonalAccessToken>(
            r#"
            INSERT INTO personal_access_tokens (user_id, token_hash)
            VALUES ($1, $2)
            RETURNING id, user_id, token_hash, last_used_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Resolves a digest to its owner and records the use
    ///
    /// # Returns
    ///
    /// The owning user ID, or `None` for an unknown or revoked token
    pub async fn touch_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<i64>, sqlx::Error> {
        let user_id: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE personal_access_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user_id.map(|(id,)| id))
    }

    /// Lists a user's tokens, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tokens = sqlx::query_as::<_, PersonalAccessToken>(
            r#"
            SELECT id, user_id, token_hash, last_used_at, created_at
            FROM personal_access_tokens
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tokens)
    }

    /// Deletes every token of a user
    ///
    /// # Returns
    ///
    /// Number of tokens removed (0 is not an error)
    pub async fn delete_all_for_user(pool: &PgPool, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM personal_access_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
