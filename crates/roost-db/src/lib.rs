//! Database layer for the Roost rental platform.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode
//! initialization, embedded SQL migrations, and database configuration
//! loading. Every table the query layer touches is created through
//! versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: the whole platform runs against a single
//!   embedded database file, with no external database process required.
//!   WAL mode allows concurrent readers with a single writer, which
//!   matches the read-heavy search/lookup access pattern.
//! - **`r2d2` connection pool**: every query operation borrows a
//!   connection per call and returns it when the call completes; the pool
//!   bounds the number of simultaneous live connections and queues excess
//!   borrowers.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, ensuring the schema ships with the code that depends
//!   on it and cannot drift.

mod config;
mod migrations;
mod pool;

pub use config::{load_config, Config, ConfigError, DatabaseConfig};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
