/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Email comparison is exact (case-sensitive).
///
/// # Example
///
/// ```no_run
/// use tareas_shared::models::user::{CreateUser, User};
/// use tareas_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Ana".to_string(),
///         email: "ana@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&pool, "ana@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use crate::models::tarea::Tarea;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

/// A user account
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (assigned by the database)
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A user together with the tareas it owns
#[derive(Debug, Clone, Serialize)]
pub struct UserWithTareas {
    #[serde(flatten)]
    pub user: User,

    pub tareas: Vec<Tarea>,
}

/// Row data for inserting a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Argon2id hash, never the plaintext password
    pub password_hash: String,
}

/// Row data for replacing a user; every column is overwritten
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Self-service registration payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub email: String,

    #[validate(
        length(min = 1, message = "The password field is required."),
        must_match(
            other = "password_confirmation",
            message = "The password field confirmation does not match."
        )
    )]
    pub password: String,

    pub password_confirmation: String,
}

/// Administrative create/replace payload for `/users`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub email: String,

    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl RegisterUser {
    /// Trims surrounding whitespace from name and email (passwords are kept verbatim)
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

impl UserInput {
    /// Trims surrounding whitespace from name and email (passwords are kept verbatim)
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            ..self
        }
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint `users_email_unique`)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds several users at once (used for eager loading task owners)
    ///
    /// Unknown IDs are silently skipped.
    pub async fn find_many(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Finds a user by exact email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists every user in insertion order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Checks whether an email is held by a user other than `except`
    pub async fn email_taken(
        pool: &PgPool,
        email: &str,
        except: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Replaces every mutable column of a user
    ///
    /// # Returns
    ///
    /// The updated user, or `None` if no user has this ID
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user
    ///
    /// Tareas owned by the user are left in place. Its tokens cascade.
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::field_errors;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "ana@example.com");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2id"));
    }

    #[test]
    fn test_user_with_tareas_is_flattened() {
        let json = serde_json::to_value(UserWithTareas {
            user: sample_user(),
            tareas: vec![],
        })
        .unwrap();

        assert_eq!(json["name"], "Ana");
        assert_eq!(json["tareas"], serde_json::json!([]));
        assert!(json.get("user").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_register_requires_all_fields() {
        let input = RegisterUser::default();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_register_requires_matching_confirmation() {
        let input = RegisterUser {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
            password_confirmation: "other".to_string(),
        };
        let errors = input.validate().unwrap_err();

        assert_eq!(errors.field_errors().len(), 1);
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_trimmed_keeps_password_verbatim() {
        let input = UserInput {
            name: "  Ana ".to_string(),
            email: " ana@example.com ".to_string(),
            password: " spaced ".to_string(),
        }
        .trimmed();

        assert_eq!(input.name, "Ana");
        assert_eq!(input.email, "ana@example.com");
        assert_eq!(input.password, " spaced ");
    }

    #[test]
    fn test_name_and_email_fit_the_column() {
        let register = RegisterUser {
            name: "a".repeat(256),
            email: format!("{}@example.com", "b".repeat(250)),
            password: "secret".to_string(),
            password_confirmation: "secret".to_string(),
        };
        let details = field_errors(&register.validate().unwrap_err());
        let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "name"]);
        assert_eq!(
            details[1].message,
            "The name field must not be greater than 255 characters."
        );

        let input = UserInput {
            name: "a".repeat(255),
            email: "x".repeat(256),
            password: "secret".to_string(),
        };
        let details = field_errors(&input.validate().unwrap_err());
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "email");
    }

    #[test]
    fn test_whitespace_name_fails_after_trim() {
        let input = UserInput {
            name: "   ".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        }
        .trimmed();

        assert!(input.validate().is_err());
    }
}
