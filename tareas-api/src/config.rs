/// Configuration management for the API server
///
/// Loaded from environment variables (and a `.env` file when present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `RUN_MIGRATIONS`: apply pending migrations at startup (default: true)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: *)
/// - `PASSWORD_HASH_MEMORY_KIB`: Argon2 memory cost (default: 65536)
/// - `PASSWORD_HASH_ITERATIONS`: Argon2 passes (default: 3)
/// - `PASSWORD_HASH_PARALLELISM`: Argon2 lanes (default: 4)
/// - `RUST_LOG`: log filter (default: tareas_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use tareas_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::env;
use std::str::FromStr;
use tareas_shared::auth::password::Argon2Hasher;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub password: PasswordConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Argon2Hasher::DEFAULT_MEMORY_KIB,
            iterations: Argon2Hasher::DEFAULT_ITERATIONS,
            parallelism: Argon2Hasher::DEFAULT_PARALLELISM,
        }
    }
}

/// Reads `key`, falling back to `default` when unset
fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a variable cannot be
    /// parsed
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let mut cors_origins = parse_origins(&var_or("CORS_ORIGINS", "*".to_string())?);
        if cors_origins.is_empty() {
            cors_origins.push("*".to_string());
        }

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: var_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: var_or("PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: var_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            api: ApiConfig {
                host: var_or("API_HOST", "0.0.0.0".to_string())?,
                port: var_or("API_PORT", 8080u16)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10u32)?,
                run_migrations: var_or("RUN_MIGRATIONS", true)?,
            },
            password,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Builds the password hasher from the configured cost
    pub fn password_hasher(&self) -> anyhow::Result<Argon2Hasher> {
        let PasswordConfig {
            memory_kib,
            iterations,
            parallelism,
        } = self.password;

        Argon2Hasher::with_params(memory_kib, iterations, parallelism)
            .context("Invalid PASSWORD_HASH_* settings")
    }
}
