/// Authentication endpoints
///
/// - `POST /auth/register` - create an account
/// - `POST /auth/login` - exchange credentials for a bearer token
/// - `GET /auth/profile` - the authenticated user
/// - `POST /auth/logout` - revoke every token of the authenticated user

use crate::{
    app::AppState,
    error::{ApiResult, MessageResponse},
    extract::ApiJson,
    middleware::auth::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use tareas_shared::{
    models::user::{Credentials, RegisterUser, User},
    services::LoginResult,
};

/// Register a new user
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ana",
///   "email": "ana@example.com",
///   "password": "secret",
///   "password_confirmation": "secret"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the user (no password hash). No token is issued.
///
/// # Errors
///
/// - `400 Bad Request`: blank field, confirmation mismatch or email taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "ana@example.com", "password": "secret" }
/// ```
///
/// # Response
///
/// ```json
/// { "user": { "id": 1, "name": "Ana", ... }, "token": "tareas_..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: `{"message": "Invalid credentials"}`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> ApiResult<Json<LoginResult>> {
    Ok(Json(state.auth.login(credentials).await?))
}

/// The authenticated user
pub async fn profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

/// Logout
///
/// Revokes all of the user's tokens, not only the one presented.
///
/// # Response
///
/// ```json
/// { "message": "Logged out" }
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth.logout(user.id).await?;
    Ok(MessageResponse::new("Logged out"))
}
