// src/db/models/recipe_ingredient.rs

//! Recipe composition: which ingredients, in what amount

use crate::error::Result;
use rusqlite::{Connection, Row, params};
use std::collections::HashSet;

/// Inclusive bounds for `recipe_ingredients.amount`
pub const MIN_AMOUNT: i64 = 1;
pub const MAX_AMOUNT: i64 = 10_000;

/// An ingredient as used by a particular recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Join row between a recipe and an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i64,
}

impl RecipeIngredient {
    pub fn new(recipe_id: i64, ingredient_id: i64, amount: i64) -> Self {
        Self {
            recipe_id,
            ingredient_id,
            amount,
        }
    }

    /// Insert, or update the amount if the pair already exists
    pub fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(recipe_id, ingredient_id) DO UPDATE SET amount = excluded.amount",
            params![self.recipe_id, self.ingredient_id, self.amount],
        )?;
        Ok(())
    }

    /// Ingredients of a recipe with their amounts, ordered by ingredient name
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> Result<Vec<IngredientAmount>> {
        let mut stmt = conn.prepare(
            "SELECT i.id, i.name, i.measurement_unit, ri.amount
             FROM recipe_ingredients ri
             JOIN ingredients i ON i.id = ri.ingredient_id
             WHERE ri.recipe_id = ?1
             ORDER BY i.name, i.id",
        )?;

        let items = stmt
            .query_map([recipe_id], Self::amount_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Make the recipe's ingredient set exactly `entries`
    ///
    /// Rows for ingredients not in `entries` are deleted, new ones are
    /// inserted and overlapping ones get the new amount.
    pub fn replace_for_recipe(conn: &Connection, recipe_id: i64, entries: &[(i64, i64)]) -> Result<()> {
        let keep: HashSet<i64> = entries.iter().map(|(id, _)| *id).collect();

        let existing: Vec<i64> = conn
            .prepare("SELECT ingredient_id FROM recipe_ingredients WHERE recipe_id = ?1")?
            .query_map([recipe_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for ingredient_id in existing.into_iter().filter(|id| !keep.contains(id)) {
            conn.execute(
                "DELETE FROM recipe_ingredients WHERE recipe_id = ?1 AND ingredient_id = ?2",
                [recipe_id, ingredient_id],
            )?;
        }

        for &(ingredient_id, amount) in entries {
            Self::new(recipe_id, ingredient_id, amount).upsert(conn)?;
        }

        Ok(())
    }

    fn amount_from_row(row: &Row) -> rusqlite::Result<IngredientAmount> {
        Ok(IngredientAmount {
            ingredient_id: row.get(0)?,
            name: row.get(1)?,
            measurement_unit: row.get(2)?,
            amount: row.get(3)?,
        })
    }
}
