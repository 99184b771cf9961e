use botica_core::models::user::User;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StorageError;

pub fn insert_user(conn: &Connection, username: &str, full_name: &str) -> Result<User, StorageError> {
    conn.execute(
        "INSERT INTO users (username, full_name) VALUES (?1, ?2)",
        params![username, full_name],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        full_name: full_name.to_string(),
    })
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, StorageError> {
    let user = conn
        .query_row(
            "SELECT id, username, full_name FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    full_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}
