// src/db/models/auth_token.rs

//! API tokens, one per user

use crate::db::{is_unique_violation, now_timestamp};
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A bearer token bound to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_at: String,
}

impl AuthToken {
    /// Store a token for `user_id`; a user already holding one is a `Conflict`
    pub fn insert(conn: &Connection, key: &str, user_id: i64) -> Result<Self> {
        let created_at = now_timestamp();
        conn.execute(
            "INSERT INTO auth_tokens (key, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![key, user_id, &created_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!("user {} already has a token", user_id))
            } else {
                e.into()
            }
        })?;

        Ok(Self {
            key: key.to_string(),
            user_id,
            created_at,
        })
    }

    pub fn find_by_key(conn: &Connection, key: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT key, user_id, created_at FROM auth_tokens WHERE key = ?1")?;
        let token = stmt.query_row([key], Self::from_row).optional()?;
        Ok(token)
    }

    pub fn find_by_user(conn: &Connection, user_id: i64) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = ?1")?;
        let token = stmt.query_row([user_id], Self::from_row).optional()?;
        Ok(token)
    }

    /// Remove the user's token; returns whether one existed
    pub fn delete_for_user(conn: &Connection, user_id: i64) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM auth_tokens WHERE user_id = ?1", [user_id])?;
        Ok(deleted > 0)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            user_id: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}
