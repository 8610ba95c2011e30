// src/db/models/subscription.rs

//! Follower to author subscriptions

use super::user::User;
use crate::db::is_unique_violation;
use crate::error::{Error, Result};
use rusqlite::{Connection, ErrorCode};

pub struct Subscription;

impl Subscription {
    /// Subscribe `user_id` to `author_id`
    ///
    /// A duplicate pair or a self-subscription is a `Conflict`.
    pub fn insert(conn: &Connection, user_id: i64, author_id: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO subscriptions (user_id, author_id) VALUES (?1, ?2)",
            [user_id, author_id],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!("already subscribed to user {}", author_id))
            } else if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
                && user_id == author_id
            {
                Error::Conflict("cannot subscribe to yourself".to_string())
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    /// Remove a subscription; returns whether it existed
    pub fn delete(conn: &Connection, user_id: i64, author_id: i64) -> Result<bool> {
        let deleted = conn.execute(
            "DELETE FROM subscriptions WHERE user_id = ?1 AND author_id = ?2",
            [user_id, author_id],
        )?;
        Ok(deleted > 0)
    }

    pub fn exists(conn: &Connection, user_id: i64, author_id: i64) -> Result<bool> {
        let exists = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM subscriptions WHERE user_id = ?1 AND author_id = ?2)",
            [user_id, author_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Authors followed by `user_id`, ordered by author ID
    pub fn list_authors(conn: &Connection, user_id: i64, limit: i64, offset: i64) -> Result<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                    u.password_hash, u.is_staff, u.date_joined
             FROM users u
             JOIN subscriptions s ON s.author_id = u.id
             WHERE s.user_id = ?1
             ORDER BY u.id
             LIMIT ?2 OFFSET ?3",
        )?;

        let authors = stmt
            .query_map([user_id, limit, offset], User::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(authors)
    }

    pub fn count_authors(conn: &Connection, user_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM subscriptions WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
