/// API route handlers, organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: register, login, profile, logout
/// - `users`: user CRUD
/// - `tareas`: tarea CRUD

pub mod auth;
pub mod health;
pub mod tareas;
pub mod users;
