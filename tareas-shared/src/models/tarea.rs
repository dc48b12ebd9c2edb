/// Tarea (task) model and database operations
///
/// Column names are English; the JSON representation keeps the Spanish wire
/// names clients use (`id_usuario`, `titulo`, `descripcion`, `fecha_creacion`,
/// `fecha_limite`, `estado`).
///
/// # Schema
///
/// ```sql
/// CREATE TYPE tarea_estado AS ENUM ('pendiente', 'en progreso', 'completada');
///
/// CREATE TABLE tareas (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     creation_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     due_date DATE,
///     status tarea_estado NOT NULL DEFAULT 'pendiente',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `user_id` has no foreign key: tareas outlive their owner.

use crate::models::user::User;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Lifecycle status of a tarea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tarea_estado")]
pub enum TareaEstado {
    #[sqlx(rename = "pendiente")]
    #[serde(rename = "pendiente")]
    Pendiente,

    #[sqlx(rename = "en progreso")]
    #[serde(rename = "en progreso")]
    EnProgreso,

    #[sqlx(rename = "completada")]
    #[serde(rename = "completada")]
    Completada,
}

impl TareaEstado {
    pub const ALL: [TareaEstado; 3] = [
        TareaEstado::Pendiente,
        TareaEstado::EnProgreso,
        TareaEstado::Completada,
    ];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TareaEstado::Pendiente => "pendiente",
            TareaEstado::EnProgreso => "en progreso",
            TareaEstado::Completada => "completada",
        }
    }
}

impl Default for TareaEstado {
    fn default() -> Self {
        TareaEstado::Pendiente
    }
}

impl fmt::Display for TareaEstado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the three statuses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tarea estado: {0:?}")]
pub struct UnknownEstado(pub String);

impl FromStr for TareaEstado {
    type Err = UnknownEstado;

    /// Exact match only; `"Pendiente"` or `"en_progreso"` are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TareaEstado::ALL
            .into_iter()
            .find(|estado| estado.as_str() == s)
            .ok_or_else(|| UnknownEstado(s.to_string()))
    }
}

/// A task owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Tarea {
    pub id: i64,

    /// Owner; may reference a user that no longer exists
    #[serde(rename = "id_usuario")]
    pub user_id: i64,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "descripcion")]
    pub description: String,

    #[serde(rename = "fecha_creacion")]
    pub creation_date: DateTime<Utc>,

    #[serde(rename = "fecha_limite")]
    pub due_date: Option<NaiveDate>,

    #[serde(rename = "estado")]
    pub status: TareaEstado,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A tarea together with its owner (`null` when orphaned)
#[derive(Debug, Clone, Serialize)]
pub struct TareaWithUsuario {
    #[serde(flatten)]
    pub tarea: Tarea,

    pub usuario: Option<User>,
}

/// Row data for inserting a tarea
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTarea {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TareaEstado,
}

/// Row data for replacing a tarea; every column is overwritten
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTarea {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TareaEstado,
}

impl From<CreateTarea> for UpdateTarea {
    fn from(data: CreateTarea) -> Self {
        Self {
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            status: data.status,
        }
    }
}

/// Create/replace payload for `/tareas`
///
/// `fecha_limite` and `estado` arrive as strings and are parsed by the
/// service so bad values surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TareaInput {
    #[validate(required(message = "The id usuario field is required."))]
    pub id_usuario: Option<i64>,

    #[validate(length(min = 1, max = 255))]
    pub titulo: String,

    #[validate(length(min = 1, message = "The descripcion field is required."))]
    pub descripcion: String,

    #[validate(length(min = 1, message = "The fecha limite field is required."))]
    pub fecha_limite: String,

    #[validate(length(min = 1, message = "The estado field is required."))]
    pub estado: String,
}

impl TareaInput {
    /// Trims surrounding whitespace from every string field
    pub fn trimmed(self) -> Self {
        Self {
            id_usuario: self.id_usuario,
            titulo: self.titulo.trim().to_string(),
            descripcion: self.descripcion.trim().to_string(),
            fecha_limite: self.fecha_limite.trim().to_string(),
            estado: self.estado.trim().to_string(),
        }
    }
}

/// Parses a due date
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps; the
/// time part, if any, is dropped.
pub fn parse_due_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

impl Tarea {
    /// Inserts a new tarea; `creation_date` defaults to now
    pub async fn create(pool: &PgPool, data: CreateTarea) -> Result<Self, sqlx::Error> {
        let tarea = sqlx::query_as::<_, Tarea>(
            r#"
            INSERT INTO tareas (user_id, title, description, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, creation_date, due_date, status,
                      created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(tarea)
    }

    /// Finds a tarea by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let tarea = sqlx::query_as::<_, Tarea>(
            r#"
            SELECT id, user_id, title, description, creation_date, due_date, status,
                   created_at, updated_at
            FROM tareas
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tarea)
    }

    /// Lists every tarea in insertion order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tareas = sqlx::query_as::<_, Tarea>(
            r#"
            SELECT id, user_id, title, description, creation_date, due_date, status,
                   created_at, updated_at
            FROM tareas
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tareas)
    }

    /// Lists the tareas owned by any of the given users, in insertion order
    pub async fn list_by_users(pool: &PgPool, user_ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        let tareas = sqlx::query_as::<_, Tarea>(
            r#"
            SELECT id, user_id, title, description, creation_date, due_date, status,
                   created_at, updated_at
            FROM tareas
            WHERE user_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await?;

        Ok(tareas)
    }

    /// Replaces every mutable column in a single statement
    ///
    /// # Returns
    ///
    /// The updated tarea, or `None` if no tarea has this ID
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTarea,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tarea = sqlx::query_as::<_, Tarea>(
            r#"
            UPDATE tareas
            SET user_id = $2, title = $3, description = $4, due_date = $5, status = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, creation_date, due_date, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(tarea)
    }

    /// Deletes a tarea
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tareas WHERE id = $1")
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

    #[test]
    fn test_estado_as_str() {
        assert_eq!(TareaEstado::Pendiente.as_str(), "pendiente");
        assert_eq!(TareaEstado::EnProgreso.as_str(), "en progreso");
        assert_eq!(TareaEstado::Completada.as_str(), "completada");
    }

    #[test]
    fn test_estado_from_str() {
        for estado in TareaEstado::ALL {
            assert_eq!(estado.as_str().parse::<TareaEstado>(), Ok(estado));
        }
        assert!("Pendiente".parse::<TareaEstado>().is_err());
        assert!("en_progreso".parse::<TareaEstado>().is_err());
        assert!("bogus".parse::<TareaEstado>().is_err());
        assert!("".parse::<TareaEstado>().is_err());
    }

    #[test]
    fn test_estado_serializes_with_space() {
        assert_eq!(
            serde_json::to_value(TareaEstado::EnProgreso).unwrap(),
            serde_json::json!("en progreso")
        );
        assert_eq!(TareaEstado::default(), TareaEstado::Pendiente);
    }

    #[test]
    fn test_tarea_uses_wire_names() {
        let tarea = Tarea {
            id: 3,
            user_id: 9,
            title: "Comprar pan".to_string(),
            description: "Integral".to_string(),
            creation_date: Utc::now(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            status: TareaEstado::Completada,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(TareaWithUsuario {
            tarea,
            usuario: None,
        })
        .unwrap();

        assert_eq!(json["id_usuario"], 9);
        assert_eq!(json["titulo"], "Comprar pan");
        assert_eq!(json["descripcion"], "Integral");
        assert_eq!(json["fecha_limite"], "2025-01-31");
        assert_eq!(json["estado"], "completada");
        assert!(json["fecha_creacion"].is_string());
        assert!(json["usuario"].is_null());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_parse_due_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 15);

        assert_eq!(parse_due_date("2025-03-15"), expected);
        assert_eq!(parse_due_date("2025-03-15 18:30:00"), expected);
        assert_eq!(parse_due_date("2025-03-15T18:30:00Z"), expected);
        assert_eq!(parse_due_date("15/03/2025"), None);
        assert_eq!(parse_due_date("2025-02-30"), None);
        assert_eq!(parse_due_date("mañana"), None);
    }

    #[test]
    fn test_titulo_fits_the_column() {
        let input = TareaInput {
            id_usuario: Some(1),
            titulo: "t".repeat(256),
            descripcion: "d".repeat(10_000),
            fecha_limite: "2025-03-15".to_string(),
            estado: "pendiente".to_string(),
        };
        let details = field_errors(&input.validate().unwrap_err());

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "titulo");
        assert_eq!(
            details[0].message,
            "The titulo field must not be greater than 255 characters."
        );
    }

    #[test]
    fn test_input_requires_every_field() {
        let errors = TareaInput::default().validate().unwrap_err();
        let fields = errors.field_errors();

        for field in ["id_usuario", "titulo", "descripcion", "fecha_limite", "estado"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
    }
}
