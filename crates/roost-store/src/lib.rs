//! Query layer for the Roost rental platform.
//!
//! Implements the six data-access operations the web application consumes:
//! user lookup by email and by id, user creation, per-guest reservation
//! listing, filtered property search with aggregated review ratings, and
//! property creation. Each operation is a single parameterized statement
//! against a pooled SQLite connection; there are no transactions spanning
//! operations and no cross-call ordering guarantees.
//!
//! Two call surfaces exist: synchronous functions over a borrowed
//! [`rusqlite::Connection`], and the pooled async [`Store`] facade that
//! borrows a connection per call and applies a per-query deadline.
//!
//! # Error policy
//!
//! Not-found and failure are never collapsed: lookups return
//! `Ok(None)` for an absent row and `Err` for a real failure, and writes
//! propagate constraint violations (duplicate email, dangling foreign
//! keys) to the caller instead of resolving empty.

mod properties;
mod reservations;
mod store;
mod users;

pub use properties::{add_property, search_properties};
pub use reservations::reservations_for_guest;
pub use store::{Store, StoreSettings};
pub use users::{add_user, get_user_by_email, get_user_by_id};

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected or failed a statement. Constraint violations
    /// on insert land here.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Borrowing a connection from the pool failed.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The operation did not complete within the configured deadline.
    #[error("query '{operation}' timed out")]
    Timeout {
        /// Name of the operation that hit the deadline.
        operation: &'static str,
    },

    /// The worker running the query died before producing a result.
    #[error("query worker terminated unexpectedly")]
    Canceled,
}
