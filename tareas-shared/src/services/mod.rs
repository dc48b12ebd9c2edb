//! Business operations over the stores
//!
//! - [`auth`]: register, login, token authentication, logout
//! - [`users`]: user CRUD with eager-loaded tareas
//! - [`tareas`]: tarea CRUD with eager-loaded owner
//!
//! Every service is cheap to clone (it only holds `Arc`s) and performs one
//! store write per mutating call.

pub mod auth;
pub mod tareas;
pub mod users;

pub use auth::{AuthService, LoginResult};
pub use tareas::TareaService;
pub use users::UserService;

use crate::error::{ServiceError, StoreError};

/// Maps a store failure, translating a unique index hit into the caller-facing
/// "already taken" error for `field`
pub(crate) fn unique_as_taken(field: &'static str) -> impl Fn(StoreError) -> ServiceError {
    move |err| match err {
        StoreError::UniqueViolation(_) => ServiceError::UniqueConstraintViolation { field },
        other => ServiceError::Store(other),
    }
}
