/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tareas_api::app::{build_router, AppState, Stores};
/// use tareas_api::config::Config;
/// use tareas_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::new(&config.database.url)).await?;
/// let hasher = Arc::new(config.password_hasher()?);
///
/// let state = AppState::new(Stores::postgres(pool.clone()), hasher, config).with_database(pool);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::auth::require_token, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tareas_shared::{
    auth::password::PasswordHasher,
    services::{AuthService, TareaService, UserService},
    store::{
        InMemoryTareaStore, InMemoryTokenStore, InMemoryUserStore, PgTareaStore, PgTokenStore,
        PgUserStore, TareaStore, TokenStore, UserStore,
    },
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// The three stores the services run on
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tareas: Arc<dyn TareaStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            tareas: Arc::new(PgTareaStore::new(pool.clone())),
            tokens: Arc::new(PgTokenStore::new(pool)),
        }
    }

    /// Empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            tareas: Arc::new(InMemoryTareaStore::new()),
            tokens: Arc::new(InMemoryTokenStore::new()),
        }
    }
}

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside
/// is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub tareas: TareaService,

    /// Pool pinged by `/health`; `None` when running on in-memory stores
    pub db: Option<PgPool>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services onto `stores`
    pub fn new(stores: Stores, hasher: Arc<dyn PasswordHasher>, config: Config) -> Self {
        let Stores {
            users,
            tareas,
            tokens,
        } = stores;

        Self {
            auth: AuthService::new(users.clone(), tokens.clone(), hasher.clone()),
            users: UserService::new(users.clone(), tareas.clone(), tokens, hasher),
            tareas: TareaService::new(tareas, users),
            db: None,
            config: Arc::new(config),
        }
    }

    /// Attaches the pool used by the health check
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.db = Some(pool);
        self
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the complete Axum router
///
/// ```text
/// /
/// ├── GET    /health                 (public)
/// ├── POST   /auth/register          (public)
/// ├── POST   /auth/login             (public)
/// ├── GET    /auth/profile           (token)
/// ├── POST   /auth/logout            (token)
/// ├── GET    /users, POST /users     (token)
/// ├── GET|PUT|DELETE /users/:id      (token)
/// ├── GET    /tareas, POST /tareas   (token)
/// └── GET|PUT|DELETE /tareas/:id     (token)
/// ```
///
/// Layers, outermost first: CORS, tracing, then the token guard on the
/// protected group.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/auth/profile", get(routes::auth::profile))
        .route("/auth/logout", post(routes::auth::logout))
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/tareas",
            get(routes::tareas::list_tareas).post(routes::tareas::create_tarea),
        )
        .route(
            "/tareas/:id",
            get(routes::tareas::get_tarea)
                .put(routes::tareas::update_tarea)
                .delete(routes::tareas::delete_tarea),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_token,
        ));

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
