//! Common test utilities for the API integration tests
//!
//! Every `TestContext` runs the real router on fresh in-memory stores with a
//! cheap Argon2 cost, so tests are isolated and need no database.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tareas_api::app::{build_router, AppState, Stores};
use tareas_api::config::{ApiConfig, Config, DatabaseConfig, PasswordConfig};
use tower::ServiceExt;

pub const PASSWORD: &str = "secret-password";

pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

/// Configuration that never touches the environment
pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            run_migrations: false,
        },
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let hasher = Arc::new(config.password_hasher().expect("valid test hasher"));
        let state = AppState::new(Stores::in_memory(), hasher, config);
        let app = build_router(state.clone());

        Self { app, state }
    }

    /// Sends a request and returns the status and parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user and returns the response body
    pub async fn register(&self, name: &str, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "password": PASSWORD,
                    "password_confirmation": PASSWORD,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body
    }

    /// Logs in and returns the token
    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/login",
                None,
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token in body").to_string()
    }

    /// Registers and logs in; returns (user id, token)
    pub async fn signed_in(&self, name: &str, email: &str) -> (i64, String) {
        let user = self.register(name, email).await;
        let token = self.login(email).await;
        (user["id"].as_i64().expect("numeric id"), token)
    }
}

/// A valid tarea payload
pub fn tarea_payload(user_id: i64, titulo: &str, estado: &str) -> Value {
    json!({
        "id_usuario": user_id,
        "titulo": titulo,
        "descripcion": "Descripcion de prueba",
        "fecha_limite": "2025-06-30",
        "estado": estado,
    })
}
