/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Failures render as:
///
/// - `400 {"error": "..."}` for validation, uniqueness, not-found and
///   malformed requests (validation adds a `details` list)
/// - `401 {"message": "..."}` for bad credentials and missing/invalid tokens
/// - `500 {"error": "An internal error occurred"}` for store and hashing
///   failures, with the cause logged
///
/// # Example
///
/// ```
/// use axum::http::StatusCode;
/// use axum::response::IntoResponse;
/// use tareas_api::error::ApiError;
/// use tareas_shared::error::ServiceError;
///
/// let response = ApiError::from(ServiceError::InvalidCredentials).into_response();
/// assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tareas_shared::error::{FieldError, ServiceError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Input failed validation (400)
    ValidationError {
        message: String,
        details: Vec<FieldError>,
    },

    /// Unauthorized (401)
    Unauthorized(String),

    /// Internal server error (500); the message is logged, never returned
    InternalError(String),
}

/// Body of a 400/500 response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Body of a 401 response, also used for plain success messages
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError { message, .. } => {
                write!(f, "Validation failed: {}", message)
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error,
                    details: None,
                }),
            )
                .into_response(),
            ApiError::ValidationError { message, details } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: message,
                    details: Some(details),
                }),
            )
                .into_response(),
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, MessageResponse::new(message)).into_response()
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "An internal error occurred".to_string(),
                        details: None,
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(details) => ApiError::ValidationError { message, details },
            ServiceError::UniqueConstraintViolation { field } => ApiError::ValidationError {
                details: vec![FieldError::new(field, message.clone())],
                message,
            },
            ServiceError::NotFound { .. } => ApiError::BadRequest(message),
            ServiceError::InvalidCredentials | ServiceError::Unauthenticated => {
                ApiError::Unauthorized(message)
            }
            ServiceError::Store(_) | ServiceError::Password(_) => ApiError::InternalError(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
