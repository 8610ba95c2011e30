// src/db/models/user.rs

//! User accounts
//!
//! Email and username are both unique. Passwords are stored only as the
//! salted digest produced by `crate::auth::hash_password`.

use crate::db::{is_unique_violation, now_timestamp};
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, is_staff, date_joined";

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub date_joined: Option<String>,
}

impl User {
    /// Create a new (unsaved) user
    pub fn new(
        email: String,
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: None,
            email,
            username,
            first_name,
            last_name,
            password_hash,
            is_staff: false,
            date_joined: None,
        }
    }

    /// Insert this user, failing with `Conflict` on a duplicate email or username
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        let date_joined = now_timestamp();
        conn.execute(
            "INSERT INTO users (email, username, first_name, last_name, password_hash, is_staff, date_joined)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &self.email,
                &self.username,
                &self.first_name,
                &self.last_name,
                &self.password_hash,
                self.is_staff,
                &date_joined,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!(
                    "user with email '{}' or username '{}' already exists",
                    self.email, self.username
                ))
            } else {
                e.into()
            }
        })?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        self.date_joined = Some(date_joined);
        Ok(id)
    }

    /// Find a user by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE id = ?1"))?;
        let user = stmt.query_row([id], Self::from_row).optional()?;
        Ok(user)
    }

    /// Find a user by email (exact match)
    pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE email = ?1"))?;
        let user = stmt.query_row([email], Self::from_row).optional()?;
        Ok(user)
    }

    /// Find a user by username (exact match)
    pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM users WHERE username = ?1"))?;
        let user = stmt.query_row([username], Self::from_row).optional()?;
        Ok(user)
    }

    /// List users ordered by ID
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM users ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let users = stmt
            .query_map([limit, offset], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Total number of users
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Replace the stored password digest
    pub fn update_password(conn: &Connection, id: i64, password_hash: &str) -> Result<()> {
        let updated = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    /// Grant or revoke staff rights
    pub fn set_staff(conn: &Connection, id: i64, is_staff: bool) -> Result<()> {
        let updated = conn.execute(
            "UPDATE users SET is_staff = ?1 WHERE id = ?2",
            params![is_staff, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    /// Convert a database row to a User
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            email: row.get(1)?,
            username: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            password_hash: row.get(5)?,
            is_staff: row.get(6)?,
            date_joined: row.get(7)?,
        })
    }
}
