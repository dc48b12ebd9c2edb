//! PostgreSQL stores
//!
//! Thin adapters from the store traits onto the model functions. `sqlx`
//! errors become [`crate::error::StoreError`], with unique index violations
//! split out.

use super::{StoreResult, TareaStore, TokenStore, UserStore};
use crate::auth::token::{generate_token, hash_token, validate_token_format};
use crate::models::personal_access_token::PersonalAccessToken;
use crate::models::tarea::{CreateTarea, Tarea, UpdateTarea};
use crate::models::user::{CreateUser, UpdateUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_many(&self, ids: &[i64]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(User::find_many(&self.pool, ids).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool> {
        Ok(User::email_taken(&self.pool, email, except).await?)
    }

    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn update(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[derive(Debug, Clone)]
pub struct PgTareaStore {
    pool: PgPool,
}

impl PgTareaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TareaStore for PgTareaStore {
    async fn list(&self) -> StoreResult<Vec<Tarea>> {
        Ok(Tarea::list(&self.pool).await?)
    }

    async fn list_by_users(&self, user_ids: &[i64]) -> StoreResult<Vec<Tarea>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Tarea::list_by_users(&self.pool, user_ids).await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Tarea>> {
        Ok(Tarea::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, data: CreateTarea) -> StoreResult<Tarea> {
        Ok(Tarea::create(&self.pool, data).await?)
    }

    async fn update(&self, id: i64, data: UpdateTarea) -> StoreResult<Option<Tarea>> {
        Ok(Tarea::update(&self.pool, id, data).await?)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(Tarea::delete(&self.pool, id).await?)
    }
}

#[derive(Debug, Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn issue(&self, user_id: i64) -> StoreResult<String> {
        let (token, digest) = generate_token();
        let record = PersonalAccessToken::create(&self.pool, user_id, &digest).await?;

        debug!(user_id, token_id = record.id, "Issued access token");
        Ok(token)
    }

    async fn validate(&self, token: &str) -> StoreResult<Option<i64>> {
        if !validate_token_format(token) {
            return Ok(None);
        }
        Ok(PersonalAccessToken::touch_by_hash(&self.pool, &hash_token(token)).await?)
    }

    async fn revoke_all(&self, user_id: i64) -> StoreResult<u64> {
        Ok(PersonalAccessToken::delete_all_for_user(&self.pool, user_id).await?)
    }
}
