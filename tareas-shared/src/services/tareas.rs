//! Tarea CRUD
//!
//! Writes validate the whole payload, parse `estado` and `fecha_limite`, and
//! check that the owner exists before touching the store. Reads attach the
//! owning user, or `null` for orphaned tareas.

use crate::error::{field_errors, FieldError, ServiceError, ServiceResult};
use crate::models::tarea::{
    parse_due_date, CreateTarea, Tarea, TareaEstado, TareaInput, TareaWithUsuario,
};
use crate::models::user::User;
use crate::store::{TareaStore, UserStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct TareaService {
    tareas: Arc<dyn TareaStore>,
    users: Arc<dyn UserStore>,
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound { entity: "Tarea", id }
}

/// Checks the payload and converts it to row data
///
/// All field problems are reported together; owner existence is checked
/// separately since it needs the store.
fn parse_input(input: TareaInput) -> ServiceResult<CreateTarea> {
    let input = input.trimmed();
    let mut errors = match input.validate() {
        Ok(()) => Vec::new(),
        Err(e) => field_errors(&e),
    };

    let due_date = if input.fecha_limite.is_empty() {
        None
    } else {
        let parsed = parse_due_date(&input.fecha_limite);
        if parsed.is_none() {
            errors.push(FieldError::new(
                "fecha_limite",
                "The fecha limite field must be a valid date.",
            ));
        }
        parsed
    };

    let status = if input.estado.is_empty() {
        None
    } else {
        let parsed = input.estado.parse::<TareaEstado>().ok();
        if parsed.is_none() {
            errors.push(FieldError::new("estado", "The selected estado is invalid."));
        }
        parsed
    };

    match (input.id_usuario, due_date, status) {
        (Some(user_id), Some(due_date), Some(status)) if errors.is_empty() => Ok(CreateTarea {
            user_id,
            title: input.titulo,
            description: input.descripcion,
            due_date,
            status,
        }),
        _ => {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            Err(ServiceError::Validation(errors))
        }
    }
}

impl TareaService {
    pub fn new(tareas: Arc<dyn TareaStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tareas, users }
    }

    async fn ensure_owner_exists(&self, user_id: i64) -> ServiceResult<()> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::invalid(
                "id_usuario",
                "The selected id usuario is invalid.",
            ));
        }
        Ok(())
    }

    /// All tareas in insertion order, each with its owner
    ///
    /// Owners are fetched in one batch.
    pub async fn list(&self) -> ServiceResult<Vec<TareaWithUsuario>> {
        let tareas = self.tareas.list().await?;

        let mut owner_ids: Vec<i64> = tareas.iter().map(|t| t.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<i64, User> = self
            .users
            .find_many(&owner_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        debug!(count = tareas.len(), "Listed tareas");
        Ok(tareas
            .into_iter()
            .map(|tarea| {
                let usuario = owners.get(&tarea.user_id).cloned();
                TareaWithUsuario { tarea, usuario }
            })
            .collect())
    }

    /// One tarea with its owner
    ///
    /// # Errors
    ///
    /// `NotFound` if no tarea has this ID
    pub async fn get(&self, id: i64) -> ServiceResult<TareaWithUsuario> {
        let tarea = self.tareas.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        let usuario = self.users.find_by_id(tarea.user_id).await?;

        Ok(TareaWithUsuario { tarea, usuario })
    }

    /// Creates a tarea
    ///
    /// # Errors
    ///
    /// `Validation` if a field is missing, `estado` is not one of
    /// `pendiente`, `en progreso`, `completada`, `fecha_limite` is not a date,
    /// or `id_usuario` names no user. Nothing is written in that case.
    pub async fn create(&self, input: TareaInput) -> ServiceResult<Tarea> {
        let data = parse_input(input)?;
        self.ensure_owner_exists(data.user_id).await?;

        let tarea = self.tareas.create(data).await?;
        info!(tarea_id = tarea.id, user_id = tarea.user_id, "Tarea created");
        Ok(tarea)
    }

    /// Replaces every field of a tarea
    ///
    /// # Errors
    ///
    /// `NotFound` if the tarea does not exist (checked first), otherwise the
    /// same validation errors as [`TareaService::create`]
    pub async fn update(&self, id: i64, input: TareaInput) -> ServiceResult<Tarea> {
        if self.tareas.find_by_id(id).await?.is_none() {
            return Err(not_found(id));
        }

        let data = parse_input(input)?;
        self.ensure_owner_exists(data.user_id).await?;

        let tarea = self
            .tareas
            .update(id, data.into())
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(tarea_id = id, "Tarea updated");
        Ok(tarea)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.tareas.delete(id).await? {
            return Err(not_found(id));
        }

        info!(tarea_id = id, "Tarea deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::store::{InMemoryTareaStore, InMemoryUserStore};
    use chrono::NaiveDate;

    struct Fixture {
        service: TareaService,
        users: Arc<InMemoryUserStore>,
        tareas: Arc<InMemoryTareaStore>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserStore::new());
        let tareas = Arc::new(InMemoryTareaStore::new());
        let service = TareaService::new(tareas.clone(), users.clone());
        Fixture {
            service,
            users,
            tareas,
        }
    }

    async fn add_user(f: &Fixture, email: &str) -> User {
        f.users
            .create(CreateUser {
                name: "Ana".to_string(),
                email: email.to_string(),
                password_hash: "h".to_string(),
            })
            .await
            .unwrap()
    }

    fn input(user_id: i64, estado: &str) -> TareaInput {
        TareaInput {
            id_usuario: Some(user_id),
            titulo: "Comprar pan".to_string(),
            descripcion: "Integral".to_string(),
            fecha_limite: "2025-03-01".to_string(),
            estado: estado.to_string(),
        }
    }

    fn fields(err: ServiceError) -> Vec<String> {
        match err {
            ServiceError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_with_owner() {
        let f = fixture();
        let user = add_user(&f, "ana@example.com").await;

        let tarea = f.service.create(input(user.id, "en progreso")).await.unwrap();
        assert_eq!(tarea.status, TareaEstado::EnProgreso);
        assert_eq!(tarea.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));

        let fetched = f.service.get(tarea.id).await.unwrap();
        assert_eq!(fetched.tarea, tarea);
        assert_eq!(fetched.usuario.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_invalid_estado_persists_nothing() {
        let f = fixture();
        let user = add_user(&f, "ana@example.com").await;

        let err = f.service.create(input(user.id, "bogus")).await.unwrap_err();

        assert_eq!(fields(err), vec!["estado"]);
        assert!(f.tareas.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields_are_reported_together() {
        let f = fixture();
        let err = f.service.create(TareaInput::default()).await.unwrap_err();

        assert_eq!(
            fields(err),
            vec!["descripcion", "estado", "fecha_limite", "id_usuario", "titulo"]
        );
    }

    #[tokio::test]
    async fn test_bad_date_and_estado_are_reported_together() {
        let f = fixture();
        let mut bad = input(1, "later");
        bad.fecha_limite = "tomorrow".to_string();

        assert_eq!(
            fields(f.service.create(bad).await.unwrap_err()),
            vec!["estado", "fecha_limite"]
        );
    }

    #[tokio::test]
    async fn test_unknown_owner_is_rejected() {
        let f = fixture();
        let err = f.service.create(input(404, "pendiente")).await.unwrap_err();

        assert_eq!(fields(err), vec!["id_usuario"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.service.get(1).await,
            Err(ServiceError::NotFound { entity: "Tarea", id: 1 })
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_every_field() {
        let f = fixture();
        let ana = add_user(&f, "ana@example.com").await;
        let bea = add_user(&f, "bea@example.com").await;
        let created = f.service.create(input(ana.id, "pendiente")).await.unwrap();

        let replacement = TareaInput {
            id_usuario: Some(bea.id),
            titulo: "Llamar".to_string(),
            descripcion: "Al banco".to_string(),
            fecha_limite: "2025-12-24".to_string(),
            estado: "completada".to_string(),
        };
        let updated = f.service.update(created.id, replacement).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, bea.id);
        assert_eq!(updated.title, "Llamar");
        assert_eq!(updated.description, "Al banco");
        assert_eq!(updated.due_date, NaiveDate::from_ymd_opt(2025, 12, 24));
        assert_eq!(updated.status, TareaEstado::Completada);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let f = fixture();
        let user = add_user(&f, "ana@example.com").await;

        assert!(matches!(
            f.service.update(77, input(user.id, "pendiente")).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let f = fixture();
        let user = add_user(&f, "ana@example.com").await;
        let tarea = f.service.create(input(user.id, "pendiente")).await.unwrap();

        f.service.delete(tarea.id).await.unwrap();
        assert!(matches!(
            f.service.delete(tarea.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_orphaned_tarea_lists_with_null_owner() {
        let f = fixture();
        let ana = add_user(&f, "ana@example.com").await;
        let bea = add_user(&f, "bea@example.com").await;
        f.service.create(input(ana.id, "pendiente")).await.unwrap();
        f.service.create(input(bea.id, "pendiente")).await.unwrap();

        f.users.delete(ana.id).await.unwrap();
        let listed = f.service.list().await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed[0].usuario.is_none());
        assert_eq!(listed[1].usuario.as_ref().map(|u| u.id), Some(bea.id));
    }
}
