/// User endpoints (all require a bearer token)
///
/// - `GET /users` - every user with its tareas
/// - `POST /users` - create a user
/// - `GET /users/:id` - one user with its tareas
/// - `PUT /users/:id` - replace name, email and password
/// - `DELETE /users/:id` - delete a user; its tareas are kept

use crate::{
    app::AppState,
    error::{ApiResult, MessageResponse},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Json};
use tareas_shared::models::user::{User, UserInput, UserWithTareas};

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserWithTareas>>> {
    Ok(Json(state.users.list().await?))
}

/// Create a user
///
/// ```text
/// POST /users
///
/// { "name": "Bea", "email": "bea@example.com", "password": "secret" }
/// ```
///
/// `201 Created` with the user; `400` on a blank field or a taken email.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UserInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserWithTareas>> {
    Ok(Json(state.users.get(id).await?))
}

/// Replace a user
///
/// All three fields are required. Keeping the current email is allowed.
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UserInput>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.update(id, input).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.delete(id).await?;
    Ok(MessageResponse::new("Registro eliminado"))
}
