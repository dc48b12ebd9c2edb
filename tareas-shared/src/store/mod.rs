//! Persistence seams
//!
//! Services talk to storage only through these traits. Two backends exist:
//!
//! - [`postgres`]: the production backend, delegating to the model SQL
//! - [`memory`]: `tokio::sync::RwLock` maps used by tests and local tooling
//!
//! Both enforce the same rules: unique user email, insertion-ordered listings,
//! and tareas that survive their owner.

use crate::error::StoreError;
use crate::models::tarea::{CreateTarea, Tarea, UpdateTarea};
use crate::models::user::{CreateUser, UpdateUser, User};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryTareaStore, InMemoryTokenStore, InMemoryUserStore};
pub use postgres::{PgTareaStore, PgTokenStore, PgUserStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Name of the unique index on `users.email`
pub const USERS_EMAIL_UNIQUE: &str = "users_email_unique";

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, ordered by ID
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Users whose ID is in `ids`, ordered by ID; unknown IDs are skipped
    async fn find_many(&self, ids: &[i64]) -> StoreResult<Vec<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Whether `email` belongs to a user other than `except`
    async fn email_taken(&self, email: &str, except: Option<i64>) -> StoreResult<bool>;

    /// Fails with `StoreError::UniqueViolation` on a duplicate email
    async fn create(&self, data: CreateUser) -> StoreResult<User>;

    /// `None` when the user does not exist
    async fn update(&self, id: i64, data: UpdateUser) -> StoreResult<Option<User>>;

    /// `false` when the user does not exist
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

/// Tarea persistence
#[async_trait]
pub trait TareaStore: Send + Sync {
    /// All tareas, ordered by ID
    async fn list(&self) -> StoreResult<Vec<Tarea>>;

    /// Tareas owned by any of `user_ids`, ordered by ID
    async fn list_by_users(&self, user_ids: &[i64]) -> StoreResult<Vec<Tarea>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Tarea>>;

    async fn create(&self, data: CreateTarea) -> StoreResult<Tarea>;

    /// `None` when the tarea does not exist
    async fn update(&self, id: i64, data: UpdateTarea) -> StoreResult<Option<Tarea>>;

    /// `false` when the tarea does not exist
    async fn delete(&self, id: i64) -> StoreResult<bool>;
}

/// Opaque bearer token persistence
///
/// Tokens never expire; they live until [`TokenStore::revoke_all`] runs for
/// their owner.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Issues a new token for `user_id` and returns the plaintext
    ///
    /// Only a digest is kept, so the plaintext cannot be recovered later.
    async fn issue(&self, user_id: i64) -> StoreResult<String>;

    /// Resolves a plaintext token to its owner, `None` if unknown or revoked
    async fn validate(&self, token: &str) -> StoreResult<Option<i64>>;

    /// Revokes every token of `user_id`, returning how many were removed
    async fn revoke_all(&self, user_id: i64) -> StoreResult<u64>;
}
