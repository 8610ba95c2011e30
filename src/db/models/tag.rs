// src/db/models/tag.rs

//! Recipe categorization tags
//!
//! Name, color and slug are each unique across all tags.

use crate::db::is_unique_violation;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A tag (e.g. "Breakfast", `#E26C2D`, `breakfast`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Option<i64>,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: String, color: String, slug: String) -> Self {
        Self {
            id: None,
            name,
            color,
            slug,
        }
    }

    /// Insert this tag, failing with `Conflict` if any unique column clashes
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO tags (name, color, slug) VALUES (?1, ?2, ?3)",
            params![&self.name, &self.color, &self.slug],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!(
                    "tag with name '{}', color '{}' or slug '{}' already exists",
                    self.name, self.color, self.slug
                ))
            } else {
                e.into()
            }
        })?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare("SELECT id, name, color, slug FROM tags WHERE id = ?1")?;
        let tag = stmt.query_row([id], Self::from_row).optional()?;
        Ok(tag)
    }

    /// List all tags ordered by ID
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT id, name, color, slug FROM tags ORDER BY id")?;

        let tags = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    /// Tags attached to a recipe, ordered by ID
    pub fn for_recipe(conn: &Connection, recipe_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.color, t.slug
             FROM tags t
             JOIN recipe_tags rt ON rt.tag_id = t.id
             WHERE rt.recipe_id = ?1
             ORDER BY t.id",
        )?;

        let tags = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            color: row.get(2)?,
            slug: row.get(3)?,
        })
    }
}
