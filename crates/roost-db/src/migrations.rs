//! Embedded SQL migration runner.
//!
//! Migrations are SQL files embedded at compile time. They run
//! sequentially on startup, tracked by the `_roost_migrations` table, and
//! each runs exactly once; an already-applied migration is skipped.

use rusqlite::Connection;
use thiserror::Error;

/// A single embedded migration.
struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. New migrations are appended here.
const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "000_users",
        sql: include_str!("migrations/000_users.sql"),
    },
    Migration {
        name: "001_properties",
        sql: include_str!("migrations/001_properties.sql"),
    },
    Migration {
        name: "002_reservations",
        sql: include_str!("migrations/002_reservations.sql"),
    },
    Migration {
        name: "003_property_reviews",
        sql: include_str!("migrations/003_property_reviews.sql"),
    },
    Migration {
        name: "004_indexes",
        sql: include_str!("migrations/004_indexes.sql"),
    },
];

/// Errors that can occur during migration execution.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A SQL statement within a migration failed.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        /// The name of the migration that failed.
        name: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// Failed to query migration state.
    #[error("failed to check migration state: {0}")]
    StateQuery(rusqlite::Error),
}

impl MigrationError {
    fn execution(name: &str, source: rusqlite::Error) -> Self {
        Self::ExecutionFailed {
            name: name.to_string(),
            source,
        }
    }
}

/// Runs all pending migrations against the given connection.
///
/// Each migration runs inside a transaction together with its tracking
/// record, so a failed migration leaves no partial schema behind. Returns
/// the number of migrations applied by this call.
///
/// # Errors
///
/// Returns `MigrationError` if any migration fails to execute or if the
/// tracking table cannot be queried.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    run_migrations_from_list(conn, MIGRATIONS)
}

fn run_migrations_from_list(
    conn: &Connection,
    migrations: &[Migration],
) -> Result<usize, MigrationError> {
    // The tracking table must exist before we can check what has been
    // applied, so it is bootstrapped outside the migration list itself.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _roost_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| MigrationError::execution("_roost_migrations_bootstrap", e))?;

    let mut applied = 0;

    for migration in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _roost_migrations WHERE name = ?1",
                [migration.name],
                |row| row.get(0),
            )
            .map_err(MigrationError::StateQuery)?;

        if already_applied {
            tracing::debug!(
                migration = migration.name,
                "migration already applied, skipping"
            );
            continue;
        }

        tracing::info!(migration = migration.name, "applying migration");

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| MigrationError::execution(migration.name, e))?;

        tx.execute_batch(migration.sql)
            .map_err(|e| MigrationError::execution(migration.name, e))?;

        tx.execute(
            "INSERT INTO _roost_migrations (name) VALUES (?1)",
            [migration.name],
        )
        .map_err(|e| MigrationError::execution(migration.name, e))?;

        tx.commit()
            .map_err(|e| MigrationError::execution(migration.name, e))?;

        applied += 1;
    }

    Ok(applied)
}
