//! User account lookup and creation.

use roost_types::{NewUser, User};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::StoreError;

/// Looks up a user by email.
///
/// The match is literal and case-sensitive: `A@B.com` and `a@b.com` name
/// different accounts. Returns `Ok(None)` when no account matches.
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            "SELECT id, name, email, password FROM users WHERE email = ?1",
            [email],
            map_row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Looks up a user by primary key. Returns `Ok(None)` when no account
/// matches.
pub fn get_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            "SELECT id, name, email, password FROM users WHERE id = ?1",
            [id],
            map_row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Inserts a new user and returns the stored row, including the
/// database-generated id.
///
/// No uniqueness pre-check is made; a duplicate email fails on the UNIQUE
/// constraint and propagates as [`StoreError::Database`].
pub fn add_user(conn: &Connection, user: &NewUser) -> Result<User, StoreError> {
    let created = conn.query_row(
        "INSERT INTO users (name, email, password)
         VALUES (?1, ?2, ?3)
         RETURNING id, name, email, password",
        params![user.name, user.email, user.password],
        map_row_to_user,
    )?;
    Ok(created)
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
    })
}
