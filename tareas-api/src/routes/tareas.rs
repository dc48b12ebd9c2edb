/// Tarea endpoints (all require a bearer token)
///
/// - `GET /tareas` - every tarea with its owner as `usuario`
/// - `POST /tareas` - create a tarea
/// - `GET /tareas/:id` - one tarea with its owner
/// - `PUT /tareas/:id` - replace every field
/// - `DELETE /tareas/:id` - delete a tarea
///
/// # Payload
///
/// ```json
/// {
///   "id_usuario": 1,
///   "titulo": "Comprar pan",
///   "descripcion": "Integral, dos barras",
///   "fecha_limite": "2025-03-01",
///   "estado": "pendiente"
/// }
/// ```
///
/// `estado` must be `pendiente`, `en progreso` or `completada`.

use crate::{
    app::AppState,
    error::{ApiResult, MessageResponse},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Json};
use tareas_shared::models::tarea::{Tarea, TareaInput, TareaWithUsuario};

pub async fn list_tareas(State(state): State<AppState>) -> ApiResult<Json<Vec<TareaWithUsuario>>> {
    Ok(Json(state.tareas.list().await?))
}

pub async fn create_tarea(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TareaInput>,
) -> ApiResult<(StatusCode, Json<Tarea>)> {
    let tarea = state.tareas.create(input).await?;
    Ok((StatusCode::CREATED, Json(tarea)))
}

/// A missing tarea is a `400`, like every other lookup
pub async fn get_tarea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<TareaWithUsuario>> {
    Ok(Json(state.tareas.get(id).await?))
}

pub async fn update_tarea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<TareaInput>,
) -> ApiResult<Json<Tarea>> {
    Ok(Json(state.tareas.update(id, input).await?))
}

pub async fn delete_tarea(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.tareas.delete(id).await?;
    Ok(MessageResponse::new("Tarea eliminada correctamente"))
}
