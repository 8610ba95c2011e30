// src/db/models/recipe.rs

//! Recipes and the filtered recipe listing
//!
//! A recipe belongs to one author. Its ingredients and tags live in
//! `recipe_ingredients` / `recipe_tags` and cascade with it. Listing
//! queries compute the per-viewer flags (`is_favorited`,
//! `is_in_shopping_cart`) in the same statement; they are never stored.

use super::{escape_like, search_key};
use super::recipe_list::RecipeList;
use crate::db::{is_unique_violation, now_timestamp};
use crate::error::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

const COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.pub_date";

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: Option<i64>,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    /// Storage-relative image path
    pub image: String,
    pub cooking_time: i64,
    pub pub_date: Option<String>,
}

/// A recipe together with the viewer-dependent flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRow {
    pub recipe: Recipe,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Combinable listing filters; all present conditions must hold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Tag slugs; a recipe matches if it carries any of them
    pub tags: Vec<String>,
    pub author_id: Option<i64>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    /// Case-insensitive substring of the recipe name
    pub search: Option<String>,
}

impl RecipeFilter {
    /// Build the WHERE clause and its parameters for `viewer_id`
    ///
    /// An anonymous viewer has no favorites and no cart: `true` filters
    /// match nothing, `false` filters match everything.
    fn where_clause(&self, viewer_id: Option<i64>) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if !self.tags.is_empty() {
            let placeholders = vec!["?"; self.tags.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id
                         WHERE rt.recipe_id = r.id AND t.slug IN ({placeholders}))"
            ));
            values.extend(self.tags.iter().cloned().map(Value::Text));
        }

        if let Some(author_id) = self.author_id {
            clauses.push("r.author_id = ?".to_string());
            values.push(Value::Integer(author_id));
        }

        for (list, wanted) in [
            (RecipeList::Favorites, self.is_favorited),
            (RecipeList::ShoppingCart, self.is_in_shopping_cart),
        ] {
            let Some(wanted) = wanted else { continue };
            match viewer_id {
                Some(viewer_id) => {
                    let negate = if wanted { "" } else { "NOT " };
                    clauses.push(format!(
                        "{negate}EXISTS (SELECT 1 FROM {} m WHERE m.recipe_id = r.id AND m.user_id = ?)",
                        list.table()
                    ));
                    values.push(Value::Integer(viewer_id));
                }
                None if wanted => clauses.push("0".to_string()),
                None => {}
            }
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            clauses.push("r.name_search LIKE ? ESCAPE '\\'".to_string());
            values.push(Value::Text(format!("%{}%", escape_like(&search_key(search)))));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

impl Recipe {
    /// Create a new (unsaved) recipe
    pub fn new(author_id: i64, name: String, text: String, image: String, cooking_time: i64) -> Self {
        Self {
            id: None,
            author_id,
            name,
            text,
            image,
            cooking_time,
            pub_date: None,
        }
    }

    /// Insert this recipe, stamping `pub_date`
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        let pub_date = now_timestamp();
        conn.execute(
            "INSERT INTO recipes (author_id, name, text, image, cooking_time, pub_date, name_search)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.author_id,
                &self.name,
                &self.text,
                &self.image,
                self.cooking_time,
                &pub_date,
                search_key(&self.name),
            ],
        )
        .map_err(|e| self.map_unique(e))?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        self.pub_date = Some(pub_date);
        Ok(id)
    }

    /// Write name, text, image and cooking time back to the row
    pub fn update(&self, conn: &Connection) -> Result<()> {
        let id = self.id.ok_or_else(|| {
            Error::InitError("Cannot update recipe without ID".to_string())
        })?;

        conn.execute(
            "UPDATE recipes SET name = ?1, text = ?2, image = ?3, cooking_time = ?4, name_search = ?5
             WHERE id = ?6",
            params![
                &self.name,
                &self.text,
                &self.image,
                self.cooking_time,
                search_key(&self.name),
                id
            ],
        )
        .map_err(|e| self.map_unique(e))?;

        Ok(())
    }

    fn map_unique(&self, e: rusqlite::Error) -> Error {
        if is_unique_violation(&e) {
            Error::Conflict(format!("recipe named '{}' already exists", self.name))
        } else {
            e.into()
        }
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM recipes r WHERE r.id = ?1"))?;
        let recipe = stmt.query_row([id], Self::from_row).optional()?;
        Ok(recipe)
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare(&format!("SELECT {COLUMNS} FROM recipes r WHERE r.name = ?1"))?;
        let recipe = stmt.query_row([name], Self::from_row).optional()?;
        Ok(recipe)
    }

    /// Delete a recipe; join rows cascade. Returns whether a row was removed.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// One recipe with the flags for `viewer_id`
    pub fn find_row(conn: &Connection, id: i64, viewer_id: Option<i64>) -> Result<Option<RecipeRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS}, {} FROM recipes r WHERE r.id = ?",
            flag_columns()
        ))?;
        let row = stmt
            .query_row(params![viewer_id, viewer_id, id], Self::row_from_row)
            .optional()?;
        Ok(row)
    }

    /// Filtered listing, newest first
    pub fn query(
        conn: &Connection,
        filter: &RecipeFilter,
        viewer_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>> {
        let (where_sql, filter_values) = filter.where_clause(viewer_id);
        let sql = format!(
            "SELECT {COLUMNS}, {} FROM recipes r {where_sql}
             ORDER BY r.pub_date DESC, r.id DESC
             LIMIT ? OFFSET ?",
            flag_columns()
        );

        let viewer = viewer_id.map_or(Value::Null, Value::Integer);
        let mut values = vec![viewer.clone(), viewer];
        values.extend(filter_values);
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), Self::row_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Number of recipes matching `filter` for `viewer_id`
    pub fn count_filtered(
        conn: &Connection,
        filter: &RecipeFilter,
        viewer_id: Option<i64>,
    ) -> Result<i64> {
        let (where_sql, values) = filter.where_clause(viewer_id);
        let sql = format!("SELECT COUNT(*) FROM recipes r {where_sql}");
        let count = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(count)
    }

    /// Most recent recipes of an author
    pub fn list_by_author(conn: &Connection, author_id: i64, limit: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM recipes r WHERE r.author_id = ?1
             ORDER BY r.pub_date DESC, r.id DESC LIMIT ?2"
        ))?;

        let recipes = stmt
            .query_map([author_id, limit], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    pub fn count_by_author(conn: &Connection, author_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM recipes WHERE author_id = ?1",
            [author_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of recipes referencing a stored image
    pub fn count_by_image(conn: &Connection, image: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM recipes WHERE image = ?1",
            [image],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            author_id: row.get(1)?,
            name: row.get(2)?,
            text: row.get(3)?,
            image: row.get(4)?,
            cooking_time: row.get(5)?,
            pub_date: row.get(6)?,
        })
    }

    fn row_from_row(row: &Row) -> rusqlite::Result<RecipeRow> {
        Ok(RecipeRow {
            recipe: Self::from_row(row)?,
            is_favorited: row.get(7)?,
            is_in_shopping_cart: row.get(8)?,
        })
    }
}

/// The two flag columns; each consumes one viewer parameter
fn flag_columns() -> String {
    format!(
        "EXISTS (SELECT 1 FROM {} f WHERE f.recipe_id = r.id AND f.user_id = ?),
         EXISTS (SELECT 1 FROM {} c WHERE c.recipe_id = r.id AND c.user_id = ?)",
        RecipeList::Favorites.table(),
        RecipeList::ShoppingCart.table()
    )
}
