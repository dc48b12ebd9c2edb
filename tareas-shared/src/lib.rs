//! # Tareas Shared Library
//!
//! Domain types, persistence and business logic behind the Tareas API.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing and bearer token primitives
//! - `db`: connection pool and migrations
//! - `error`: store and service error types
//! - `models`: database models and request payloads
//! - `services`: auth, user and tarea operations
//! - `store`: persistence traits with PostgreSQL and in-memory backends

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
