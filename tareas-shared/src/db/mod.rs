/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded migration runner and status
///
/// Models and their SQL are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
