//! Pooled async facade over the query layer.
//!
//! Callers in async context (web request handlers) go through [`Store`]:
//! each call borrows a connection from the shared pool inside a blocking
//! task, runs one statement, and returns the connection when the closure
//! completes. Multiple calls may be in flight concurrently; the pool
//! bounds the number of simultaneous live connections and queues excess
//! borrowers.

use std::time::Duration;

use roost_db::DbPool;
use roost_types::{GuestStay, NewProperty, NewUser, Property, PropertyFilters, PropertyListing, User};
use rusqlite::Connection;

use crate::{properties, reservations, users, StoreError};

/// Tunables for the [`Store`] facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// Deadline for a single query operation.
    pub query_timeout: Duration,

    /// Row cap applied when a caller passes no explicit limit.
    pub default_limit: i64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(5),
            default_limit: 10,
        }
    }
}

/// Handle to the data-access layer: the shared connection pool plus query
/// settings.
///
/// Created once at process start and cloned into every caller; clones
/// share the same pool, which lives for the process lifetime with no
/// explicit teardown.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    settings: StoreSettings,
}

impl Store {
    /// Creates a store with default settings.
    pub fn new(pool: DbPool) -> Self {
        Self::with_settings(pool, StoreSettings::default())
    }

    /// Creates a store with explicit settings.
    pub fn with_settings(pool: DbPool, settings: StoreSettings) -> Self {
        Self { pool, settings }
    }

    /// Borrows a pooled connection inside a blocking task and runs `f`
    /// under the configured deadline.
    ///
    /// A timeout does not interrupt the blocking statement; it finishes
    /// in the background and its connection rejoins the pool. Lock waits
    /// inside SQLite are separately bounded by the pool's busy timeout.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let task = tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        });

        match tokio::time::timeout(self.settings.query_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::error!(operation, error = %join_err, "query worker terminated");
                Err(StoreError::Canceled)
            }
            Err(_) => Err(StoreError::Timeout { operation }),
        }
    }

    /// Looks up a user by email. `Ok(None)` when no account matches;
    /// the match is case-sensitive.
    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_owned();
        self.run("user_by_email", move |conn| {
            users::get_user_by_email(conn, &email)
        })
        .await
    }

    /// Looks up a user by primary key. `Ok(None)` when no account matches.
    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.run("user_by_id", move |conn| users::get_user_by_id(conn, id))
            .await
    }

    /// Inserts a new user and returns the stored row.
    pub async fn add_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.run("add_user", move |conn| users::add_user(conn, &user))
            .await
    }

    /// Lists a guest's reservations joined to their properties. A `None`
    /// limit falls back to the configured default row cap.
    pub async fn reservations_for_guest(
        &self,
        guest_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<GuestStay>, StoreError> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        self.run("reservations_for_guest", move |conn| {
            reservations::reservations_for_guest(conn, guest_id, limit)
        })
        .await
    }

    /// Searches listings with the given optional filters. A `None` limit
    /// falls back to the configured default row cap.
    pub async fn search_properties(
        &self,
        filters: PropertyFilters,
        limit: Option<i64>,
    ) -> Result<Vec<PropertyListing>, StoreError> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        self.run("search_properties", move |conn| {
            properties::search_properties(conn, &filters, limit)
        })
        .await
    }

    /// Inserts a new property and returns the stored row.
    pub async fn add_property(&self, property: NewProperty) -> Result<Property, StoreError> {
        self.run("add_property", move |conn| {
            properties::add_property(conn, &property)
        })
        .await
    }
}
