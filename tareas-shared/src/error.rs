//! Error types shared by the stores and services
//!
//! Stores fail with [`StoreError`]; services fail with [`ServiceError`], which
//! is the taxonomy the HTTP layer maps onto status codes.

use crate::auth::password::PasswordError;
use serde::Serialize;
use std::fmt;
use validator::{ValidationError, ValidationErrors};

/// Result type returned by the services
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the offending field
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Persistence failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write (carries the constraint name)
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Failure of a service operation
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// One or more input rules failed
    #[error("{}", ValidationSummary(.0))]
    Validation(Vec<FieldError>),

    /// The value of `field` already belongs to another record
    #[error("The {field} has already been taken.")]
    UniqueConstraintViolation { field: &'static str },

    /// No record with this id
    #[error("No query results for model [{entity}] {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Login failed; deliberately does not say which part was wrong
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or revoked bearer token
    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    /// Shorthand for a validation failure on a single field
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

/// Flattens `validator` output into a list ordered by field name
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| default_message(field, error)),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Message for a rule declared without one
///
/// A `length` rule reports either a blank value or one over the column
/// limit, depending on which bound failed.
fn default_message(field: &str, error: &ValidationError) -> String {
    let label = field.replace('_', " ");
    if error.code != "length" {
        return format!("The {} field is invalid.", label);
    }

    let length = error
        .params
        .get("value")
        .and_then(|value| value.as_str())
        .map(|value| value.chars().count() as u64);
    let max = error.params.get("max").and_then(|max| max.as_u64());

    match (length, max) {
        (Some(length), Some(max)) if length > max => format!(
            "The {} field must not be greater than {} characters.",
            label, max
        ),
        _ => format!("The {} field is required.", label),
    }
}

/// First message, plus a count of the rest
struct ValidationSummary<'a>(&'a [FieldError]);

impl fmt::Display for ValidationSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [] => write!(f, "The given data was invalid."),
            [only] => write!(f, "{}", only.message),
            [first, rest @ ..] => {
                let noun = if rest.len() == 1 { "error" } else { "errors" };
                write!(f, "{} (and {} more {})", first.message, rest.len(), noun)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_single_validation_message() {
        let err = ServiceError::invalid("name", "The name field is required.");
        assert_eq!(err.to_string(), "The name field is required.");
    }

    #[test]
    fn test_validation_message_counts_remaining_errors() {
        let err = ServiceError::Validation(vec![
            FieldError::new("email", "The email field is required."),
            FieldError::new("name", "The name field is required."),
            FieldError::new("password", "The password field is required."),
        ]);
        assert_eq!(
            err.to_string(),
            "The email field is required. (and 2 more errors)"
        );
    }

    #[test]
    fn test_unique_violation_message() {
        let err = ServiceError::UniqueConstraintViolation { field: "email" };
        assert_eq!(err.to_string(), "The email has already been taken.");
    }

    #[test]
    fn test_not_found_message() {
        let err = ServiceError::NotFound {
            entity: "Tarea",
            id: 7,
        };
        assert_eq!(err.to_string(), "No query results for model [Tarea] 7");
    }

    #[derive(Debug, Validate)]
    struct Named {
        #[validate(length(min = 1, max = 255))]
        full_name: String,
    }

    #[test]
    fn test_length_messages() {
        let blank = Named {
            full_name: String::new(),
        };
        let details = field_errors(&blank.validate().unwrap_err());
        assert_eq!(details[0].field, "full_name");
        assert_eq!(details[0].message, "The full name field is required.");

        let long = Named {
            full_name: "ñ".repeat(256),
        };
        let details = field_errors(&long.validate().unwrap_err());
        assert_eq!(
            details[0].message,
            "The full name field must not be greater than 255 characters."
        );

        let at_limit = Named {
            full_name: "ñ".repeat(255),
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_row_not_found_is_plain_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }
}
