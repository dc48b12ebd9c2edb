/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
///
/// `database` is `"disconnected"` (and `status` `"degraded"`) when the ping
/// fails, and `"in_memory"` when no pool is attached.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;
use tareas_shared::db::pool;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match &state.db {
        Some(db) => match pool::health_check(db).await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Health check could not reach the database");
                "disconnected"
            }
        },
        None => "in_memory",
    };

    Ok(Json(HealthResponse {
        status: if database == "disconnected" {
            "degraded"
        } else {
            "healthy"
        },
        version: env!("CARGO_PKG_VERSION"),
        database,
    }))
}
