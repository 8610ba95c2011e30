// src/db/models/recipe_tag.rs

//! Recipe to tag associations

use crate::error::Result;
use rusqlite::Connection;
use std::collections::HashSet;

pub struct RecipeTag;

impl RecipeTag {
    /// Attach a tag; attaching twice is a no-op
    pub fn insert(conn: &Connection, recipe_id: i64, tag_id: i64) -> Result<()> {
        conn.execute(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?1, ?2)
             ON CONFLICT(recipe_id, tag_id) DO NOTHING",
            [recipe_id, tag_id],
        )?;
        Ok(())
    }

    /// Tag IDs of a recipe
    pub fn tag_ids(conn: &Connection, recipe_id: i64) -> Result<Vec<i64>> {
        let ids = conn
            .prepare("SELECT tag_id FROM recipe_tags WHERE recipe_id = ?1 ORDER BY tag_id")?
            .query_map([recipe_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Make the recipe's tag set exactly `tag_ids`
    pub fn replace_for_recipe(conn: &Connection, recipe_id: i64, tag_ids: &[i64]) -> Result<()> {
        let keep: HashSet<i64> = tag_ids.iter().copied().collect();

        for tag_id in Self::tag_ids(conn, recipe_id)?
            .into_iter()
            .filter(|id| !keep.contains(id))
        {
            conn.execute(
                "DELETE FROM recipe_tags WHERE recipe_id = ?1 AND tag_id = ?2",
                [recipe_id, tag_id],
            )?;
        }

        for &tag_id in tag_ids {
            Self::insert(conn, recipe_id, tag_id)?;
        }

        Ok(())
    }
}
