//! User CRUD
//!
//! Reads return users with their tareas attached. Writes take the full
//! payload; there are no partial updates.

use crate::auth::password::PasswordHasher;
use crate::error::{ServiceError, ServiceResult};
use crate::models::tarea::Tarea;
use crate::models::user::{CreateUser, UpdateUser, User, UserInput, UserWithTareas};
use crate::services::unique_as_taken;
use crate::store::{TareaStore, TokenStore, UserStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tareas: Arc<dyn TareaStore>,
    tokens: Arc<dyn TokenStore>,
    hasher: Arc<dyn PasswordHasher>,
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound { entity: "User", id }
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tareas: Arc<dyn TareaStore>,
        tokens: Arc<dyn TokenStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            tareas,
            tokens,
            hasher,
        }
    }

    /// All users in insertion order, each with its tareas
    ///
    /// Two store reads regardless of the number of users.
    pub async fn list(&self) -> ServiceResult<Vec<UserWithTareas>> {
        let users = self.users.list().await?;
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();

        let mut by_owner: HashMap<i64, Vec<Tarea>> = HashMap::new();
        for tarea in self.tareas.list_by_users(&ids).await? {
            by_owner.entry(tarea.user_id).or_default().push(tarea);
        }

        debug!(count = users.len(), "Listed users");
        Ok(users
            .into_iter()
            .map(|user| {
                let tareas = by_owner.remove(&user.id).unwrap_or_default();
                UserWithTareas { user, tareas }
            })
            .collect())
    }

    /// One user with its tareas
    pub async fn get(&self, id: i64) -> ServiceResult<UserWithTareas> {
        let user = self.users.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        let tareas = self.tareas.list_by_users(&[id]).await?;

        Ok(UserWithTareas { user, tareas })
    }

    /// Creates a user
    ///
    /// # Errors
    ///
    /// - `Validation` if any field is blank
    /// - `UniqueConstraintViolation` if the email is taken
    pub async fn create(&self, input: UserInput) -> ServiceResult<User> {
        let input = input.trimmed();
        input.validate()?;

        if self.users.email_taken(&input.email, None).await? {
            return Err(ServiceError::UniqueConstraintViolation { field: "email" });
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .create(CreateUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(unique_as_taken("email"))?;

        info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Replaces name, email and password of a user
    ///
    /// The user's own current email does not count as taken.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist (checked before validation)
    /// - `Validation` if any field is blank
    /// - `UniqueConstraintViolation` if another user holds the email
    pub async fn update(&self, id: i64, input: UserInput) -> ServiceResult<User> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(not_found(id));
        }

        let input = input.trimmed();
        input.validate()?;

        if self.users.email_taken(&input.email, Some(id)).await? {
            return Err(ServiceError::UniqueConstraintViolation { field: "email" });
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .update(
                id,
                UpdateUser {
                    name: input.name,
                    email: input.email,
                    password_hash,
                },
            )
            .await
            .map_err(unique_as_taken("email"))?
            .ok_or_else(|| not_found(id))?;

        info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Deletes a user and revokes its tokens
    ///
    /// Its tareas are kept and become orphaned.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.users.delete(id).await? {
            return Err(not_found(id));
        }

        let revoked = self.tokens.revoke_all(id).await?;
        info!(user_id = id, revoked, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use crate::models::tarea::{CreateTarea, TareaEstado};
    use crate::store::{InMemoryTareaStore, InMemoryTokenStore, InMemoryUserStore};
    use chrono::NaiveDate;

    struct Fixture {
        service: UserService,
        hasher: Arc<Argon2Hasher>,
        tareas: Arc<InMemoryTareaStore>,
        tokens: Arc<InMemoryTokenStore>,
    }

    fn fixture() -> Fixture {
        let hasher = Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap());
        let tareas = Arc::new(InMemoryTareaStore::new());
        let tokens = Arc::new(InMemoryTokenStore::new());
        let service = UserService::new(
            Arc::new(InMemoryUserStore::new()),
            tareas.clone(),
            tokens.clone(),
            hasher.clone(),
        );
        Fixture {
            service,
            hasher,
            tareas,
            tokens,
        }
    }

    fn input(name: &str, email: &str, password: &str) -> UserInput {
        UserInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn add_tarea(store: &InMemoryTareaStore, user_id: i64, title: &str) -> Tarea {
        store
            .create(CreateTarea {
                user_id,
                title: title.to_string(),
                description: "d".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
                status: TareaEstado::Pendiente,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_attaches_tareas_to_owner() {
        let f = fixture();
        let ana = f.service.create(input("Ana", "ana@example.com", "pw")).await.unwrap();
        let bea = f.service.create(input("Bea", "bea@example.com", "pw")).await.unwrap();
        add_tarea(&f.tareas, ana.id, "a1").await;
        add_tarea(&f.tareas, bea.id, "b1").await;
        add_tarea(&f.tareas, ana.id, "a2").await;

        let listed = f.service.list().await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].user.id, ana.id);
        let titles: Vec<&str> = listed[0].tareas.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2"]);
        assert_eq!(listed[1].tareas.len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.service.get(99).await,
            Err(ServiceError::NotFound { entity: "User", id: 99 })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let f = fixture();
        let err = f.service.create(input(" ", "", "")).await.unwrap_err();

        match err {
            ServiceError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "name", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields_and_rehashes() {
        let f = fixture();
        let user = f.service.create(input("Ana", "ana@example.com", "old")).await.unwrap();

        let updated = f
            .service
            .update(user.id, input("Ana Maria", "ana.maria@example.com", "new"))
            .await
            .unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.email, "ana.maria@example.com");
        assert!(f.hasher.verify("new", &updated.password_hash).unwrap());
        assert!(!f.hasher.verify("old", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_own_email() {
        let f = fixture();
        let user = f.service.create(input("Ana", "ana@example.com", "pw")).await.unwrap();

        let updated = f
            .service
            .update(user.id, input("Ana B", "ana@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(updated.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_update_cannot_take_another_email() {
        let f = fixture();
        let ana = f.service.create(input("Ana", "ana@example.com", "pw")).await.unwrap();
        f.service.create(input("Bea", "bea@example.com", "pw")).await.unwrap();

        let err = f
            .service
            .update(ana.id, input("Ana", "bea@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UniqueConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found_before_validation() {
        let f = fixture();
        assert!(matches!(
            f.service.update(5, input("", "", "")).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_keeps_tareas_and_revokes_tokens() {
        let f = fixture();
        let user = f.service.create(input("Ana", "ana@example.com", "pw")).await.unwrap();
        let tarea = add_tarea(&f.tareas, user.id, "orphan").await;
        let token = f.tokens.issue(user.id).await.unwrap();

        f.service.delete(user.id).await.unwrap();

        assert!(f.tareas.find_by_id(tarea.id).await.unwrap().is_some());
        assert_eq!(f.tokens.validate(&token).await.unwrap(), None);
        assert!(matches!(
            f.service.delete(user.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
