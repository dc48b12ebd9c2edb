/// Middleware for the API server
///
/// - `auth`: bearer token guard for the protected route group

pub mod auth;
