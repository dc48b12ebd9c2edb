/// Database models
///
/// Each model owns its SQL as `impl` block functions taking a `&PgPool`. The
/// PostgreSQL stores in [`crate::store::postgres`] delegate to them.
///
/// # Models
///
/// - `user`: user accounts, plus the register/create/login payloads
/// - `tarea`: tasks owned by users
/// - `personal_access_token`: digests of issued bearer tokens

pub mod personal_access_token;
pub mod tarea;
pub mod user;
