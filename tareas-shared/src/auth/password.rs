/// Password hashing using Argon2id
///
/// Services depend on the [`PasswordHasher`] trait so the cost parameters can
/// be tuned per environment. [`Argon2Hasher::default`] uses the production
/// parameters:
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// Hashes are PHC strings, so verification reads the parameters back from the
/// stored hash and keeps working after the configured cost changes.
///
/// # Example
///
/// ```
/// use tareas_shared::auth::password::{Argon2Hasher, PasswordHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Argon2Hasher::with_params(1024, 1, 1)?;
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash)?);
/// assert!(!hasher.verify("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// One-way password hashing
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Checks a plaintext password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the hash itself is
    /// unusable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id implementation of [`PasswordHasher`]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Memory cost used in production (KiB)
    pub const DEFAULT_MEMORY_KIB: u32 = 65536;

    /// Iterations used in production
    pub const DEFAULT_ITERATIONS: u32 = 3;

    /// Lanes used in production
    pub const DEFAULT_PARALLELISM: u32 = 4;

    /// Builds a hasher with explicit cost parameters
    ///
    /// # Arguments
    ///
    /// * `memory_kib` - Memory cost in KiB (must be at least `8 * parallelism`)
    /// * `iterations` - Number of passes
    /// * `parallelism` - Number of lanes
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if argon2 rejects the parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(memory_kib)
            .t_cost(iterations)
            .p_cost(parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        let params = ParamsBuilder::new()
            .m_cost(Self::DEFAULT_MEMORY_KIB)
            .t_cost(Self::DEFAULT_ITERATIONS)
            .p_cost(Self::DEFAULT_PARALLELISM)
            .output_len(32)
            .build()
            .unwrap_or_default();

        Self { params }
    }
}

impl PasswordHasher for Argon2Hasher {
    /// Output looks like:
    ///
    /// ```text
    /// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
    /// ```
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;
        if parsed_hash.hash.is_none() {
            return Err(PasswordError::InvalidHash("Hash has no output field".to_string()));
        }

        // Parameters come from the PHC string, not from `self`
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
        }
    }
}
