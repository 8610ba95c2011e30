// src/db/models/ingredient.rs

//! Ingredient reference data
//!
//! An ingredient is a (name, measurement unit) pair; the same name may
//! appear with several units ("milk, ml" and "milk, g").

use super::{escape_like, search_key};
use crate::db::is_unique_violation;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: Option<i64>,
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    pub fn new(name: String, measurement_unit: String) -> Self {
        Self {
            id: None,
            name,
            measurement_unit,
        }
    }

    /// Insert this ingredient, failing with `Conflict` on a duplicate pair
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO ingredients (name, measurement_unit, name_search) VALUES (?1, ?2, ?3)",
            params![&self.name, &self.measurement_unit, search_key(&self.name)],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!(
                    "ingredient '{}, {}' already exists",
                    self.name, self.measurement_unit
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
        let mut stmt =
            conn.prepare("SELECT id, name, measurement_unit FROM ingredients WHERE id = ?1")?;
        let ingredient = stmt.query_row([id], Self::from_row).optional()?;
        Ok(ingredient)
    }

    /// Ingredients whose name starts with `prefix`, ordered by name
    ///
    /// Matching ignores case in any script (against `name_search`). An
    /// empty prefix lists everything.
    pub fn search_prefix(conn: &Connection, prefix: &str) -> Result<Vec<Self>> {
        let pattern = format!("{}%", escape_like(&search_key(prefix)));
        let mut stmt = conn.prepare(
            "SELECT id, name, measurement_unit FROM ingredients
             WHERE name_search LIKE ?1 ESCAPE '\\'
             ORDER BY name_search, measurement_unit",
        )?;

        let ingredients = stmt
            .query_map([&pattern], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            measurement_unit: row.get(2)?,
        })
    }
}
