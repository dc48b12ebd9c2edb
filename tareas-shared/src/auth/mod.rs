/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing behind the `PasswordHasher` trait
/// - [`token`]: opaque bearer token generation and SHA-256 digests
///
/// Token persistence lives in [`crate::store`]; the login/logout flow lives in
/// [`crate::services::auth`].

pub mod password;
pub mod token;
