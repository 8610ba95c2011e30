// src/db/models/recipe_list.rs

//! Per-user recipe lists: favorites and the shopping cart
//!
//! Both are plain (user, recipe) join tables with a unique pair. A
//! duplicate insert is reported as `Conflict`; the constraint is the only
//! guard, so concurrent adds cannot both succeed.

use crate::db::is_unique_violation;
use crate::error::{Error, Result};
use rusqlite::{Connection, Row};
use serde::Serialize;

/// Which per-user list a recipe is put on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    /// Backing join table
    pub fn table(self) -> &'static str {
        match self {
            Self::Favorites => "favorite_recipes",
            Self::ShoppingCart => "shopping_cart_recipes",
        }
    }

    /// Human-readable name used in messages
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }

    /// Put a recipe on the user's list
    pub fn add(self, conn: &Connection, user_id: i64, recipe_id: i64) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, recipe_id) VALUES (?1, ?2)",
                self.table()
            ),
            [user_id, recipe_id],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!("recipe {} is already in {}", recipe_id, self.as_str()))
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    /// Take a recipe off the list; returns whether it was there
    pub fn remove(self, conn: &Connection, user_id: i64, recipe_id: i64) -> Result<bool> {
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND recipe_id = ?2",
                self.table()
            ),
            [user_id, recipe_id],
        )?;
        Ok(deleted > 0)
    }
}

/// One line of the aggregated shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

impl ShoppingListItem {
    /// Sum ingredient amounts over every recipe in the user's cart
    ///
    /// Grouped by ingredient, ordered by ingredient name.
    pub fn for_user(conn: &Connection, user_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total_amount
             FROM shopping_cart_recipes sc
             JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
             JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE sc.user_id = ?1
             GROUP BY i.id, i.name, i.measurement_unit
             ORDER BY i.name COLLATE NOCASE, i.measurement_unit",
        )?;

        let items = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            measurement_unit: row.get(1)?,
            total_amount: row.get(2)?,
        })
    }
}
