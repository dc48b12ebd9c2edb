/// Authentication flow: register, login, token authentication and logout
///
/// Tokens are opaque and never expire; logout revokes every token the user
/// holds, not just the one presented.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tareas_shared::auth::password::Argon2Hasher;
/// use tareas_shared::models::user::{Credentials, RegisterUser};
/// use tareas_shared::services::AuthService;
/// use tareas_shared::store::{InMemoryTokenStore, InMemoryUserStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthService::new(
///     Arc::new(InMemoryUserStore::new()),
///     Arc::new(InMemoryTokenStore::new()),
///     Arc::new(Argon2Hasher::with_params(1024, 1, 1)?),
/// );
///
/// auth.register(RegisterUser {
///     name: "Ana".into(),
///     email: "ana@example.com".into(),
///     password: "secret".into(),
///     password_confirmation: "secret".into(),
/// })
/// .await?;
///
/// let login = auth
///     .login(Credentials { email: "ana@example.com".into(), password: "secret".into() })
///     .await?;
/// assert_eq!(auth.authenticate(&login.token).await?.id, login.user.id);
///
/// auth.logout(login.user.id).await?;
/// assert!(auth.authenticate(&login.token).await.is_err());
/// # Ok(())
/// # }
/// ```

use crate::auth::password::PasswordHasher;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{CreateUser, Credentials, RegisterUser, User};
use crate::services::unique_as_taken;
use crate::store::{TokenStore, UserStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

/// Successful login: the user and a freshly issued bearer token
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is blank or the confirmation differs
    /// - `UniqueConstraintViolation` if the email is taken, including when a
    ///   concurrent registration wins the race at the unique index
    pub async fn register(&self, input: RegisterUser) -> ServiceResult<User> {
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

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues a new token
    ///
    /// Unknown email, wrong password and blank fields all fail with the same
    /// `InvalidCredentials` error.
    pub async fn login(&self, credentials: Credentials) -> ServiceResult<LoginResult> {
        let email = credentials.email.trim();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(ServiceError::InvalidCredentials);
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(&credentials.password, &user.password_hash)? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id).await?;
        info!(user_id = user.id, "User logged in");

        Ok(LoginResult { user, token })
    }

    /// Resolves a bearer token to its user (the profile lookup)
    ///
    /// A token whose user has been deleted is treated as unknown.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let user_id = self
            .tokens
            .validate(token)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)
    }

    /// Revokes every token of `user_id`
    ///
    /// The caller has already resolved the presented token through
    /// [`AuthService::authenticate`]; no second lookup happens here.
    ///
    /// # Returns
    ///
    /// Number of tokens revoked
    pub async fn logout(&self, user_id: i64) -> ServiceResult<u64> {
        let revoked = self.tokens.revoke_all(user_id).await?;
        info!(user_id, revoked, "User logged out");
        Ok(revoked)
    }
}
