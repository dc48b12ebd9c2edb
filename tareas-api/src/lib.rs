//! # Tareas API Server Library
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from environment variables
//! - `error`: error handling and HTTP response mapping
//! - `extract`: extractors with JSON error rejections
//! - `middleware`: bearer token guard
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
