/// Bearer token guard
///
/// Applied to every route except registration, login and health. It reads
/// `Authorization: Bearer <token>`, resolves the token to a user and stores
/// it as [`CurrentUser`] in the request extensions.
///
/// Any failure short-circuits with `401 {"message": "Unauthenticated."}`.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tareas_shared::{error::ServiceError, models::user::User};

/// The user owning the presented token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extracts the token from an `Authorization` header
///
/// The scheme is matched case-insensitively; an empty token counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub async fn require_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ServiceError::Unauthenticated)?;
    let user = state.auth.authenticate(&token).await?;

    tracing::debug!(user_id = user.id, "Request authenticated");

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
