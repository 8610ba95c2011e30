// src/repository/sqlite.rs

//! SQLite-backed repository
//!
//! A thin adapter over `db::models`; it borrows one connection for the
//! duration of a request.

use super::{
    IngredientEntry, IngredientRepository, RecipeListRepository, RecipeRepository,
    SubscriptionRepository, TagRepository, TokenRepository, UserRepository,
};
use crate::db::models::{
    AuthToken, Ingredient, IngredientAmount, Recipe, RecipeFilter, RecipeIngredient, RecipeList,
    RecipeRow, RecipeTag, ShoppingListItem, Subscription, Tag, User,
};
use crate::error::{Error, Result};
use rusqlite::Connection;
use tracing::debug;

pub struct SqliteRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

/// Fail with `NotFound` on the first unknown ingredient or tag ID
fn check_references(
    conn: &Connection,
    ingredients: &[IngredientEntry],
    tag_ids: &[i64],
) -> Result<()> {
    for &(ingredient_id, _) in ingredients {
        if Ingredient::find_by_id(conn, ingredient_id)?.is_none() {
            return Err(Error::NotFound(format!("Ingredient {}", ingredient_id)));
        }
    }
    for &tag_id in tag_ids {
        if Tag::find_by_id(conn, tag_id)?.is_none() {
            return Err(Error::NotFound(format!("Tag {}", tag_id)));
        }
    }
    Ok(())
}

impl UserRepository for SqliteRepository<'_> {
    fn insert_user(&self, user: &mut User) -> Result<i64> {
        user.insert(self.conn)
    }

    fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        User::find_by_id(self.conn, id)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        User::find_by_email(self.conn, email)
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        User::find_by_username(self.conn, username)
    }

    fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        User::list(self.conn, limit, offset)
    }

    fn count_users(&self) -> Result<i64> {
        User::count(self.conn)
    }

    fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()> {
        User::update_password(self.conn, user_id, password_hash)
    }
}

impl TokenRepository for SqliteRepository<'_> {
    fn token_for_user(&self, user_id: i64) -> Result<Option<AuthToken>> {
        AuthToken::find_by_user(self.conn, user_id)
    }

    fn insert_token(&self, key: &str, user_id: i64) -> Result<AuthToken> {
        AuthToken::insert(self.conn, key, user_id)
    }

    fn user_by_token(&self, key: &str) -> Result<Option<User>> {
        match AuthToken::find_by_key(self.conn, key)? {
            Some(token) => User::find_by_id(self.conn, token.user_id),
            None => Ok(None),
        }
    }

    fn delete_token(&self, user_id: i64) -> Result<bool> {
        AuthToken::delete_for_user(self.conn, user_id)
    }
}

impl TagRepository for SqliteRepository<'_> {
    fn insert_tag(&self, tag: &mut Tag) -> Result<i64> {
        tag.insert(self.conn)
    }

    fn tag_by_id(&self, id: i64) -> Result<Option<Tag>> {
        Tag::find_by_id(self.conn, id)
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        Tag::list_all(self.conn)
    }

    fn tags_for_recipe(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        Tag::for_recipe(self.conn, recipe_id)
    }
}

impl IngredientRepository for SqliteRepository<'_> {
    fn insert_ingredient(&self, ingredient: &mut Ingredient) -> Result<i64> {
        ingredient.insert(self.conn)
    }

    fn ingredient_by_id(&self, id: i64) -> Result<Option<Ingredient>> {
        Ingredient::find_by_id(self.conn, id)
    }

    fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>> {
        Ingredient::search_prefix(self.conn, prefix)
    }
}

impl RecipeRepository for SqliteRepository<'_> {
    fn create_recipe(
        &self,
        recipe: &mut Recipe,
        ingredients: &[IngredientEntry],
        tag_ids: &[i64],
    ) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        check_references(&tx, ingredients, tag_ids)?;

        let written = (|| -> Result<i64> {
            let recipe_id = recipe.insert(&tx)?;
            for &(ingredient_id, amount) in ingredients {
                RecipeIngredient::new(recipe_id, ingredient_id, amount).upsert(&tx)?;
            }
            for &tag_id in tag_ids {
                RecipeTag::insert(&tx, recipe_id, tag_id)?;
            }
            Ok(recipe_id)
        })();

        let recipe_id = match written.and_then(|id| tx.commit().map(|_| id).map_err(Error::from)) {
            Ok(id) => id,
            Err(e) => {
                // Rolled back; the struct must not claim a row
                recipe.id = None;
                recipe.pub_date = None;
                return Err(e);
            }
        };

        debug!(
            "Created recipe {} with {} ingredients and {} tags",
            recipe_id,
            ingredients.len(),
            tag_ids.len()
        );
        Ok(recipe_id)
    }

    fn update_recipe(
        &self,
        recipe: &Recipe,
        ingredients: Option<&[IngredientEntry]>,
        tag_ids: Option<&[i64]>,
    ) -> Result<()> {
        let recipe_id = recipe
            .id
            .ok_or_else(|| Error::InitError("Cannot update recipe without ID".to_string()))?;

        let tx = self.conn.unchecked_transaction()?;
        check_references(&tx, ingredients.unwrap_or_default(), tag_ids.unwrap_or_default())?;

        recipe.update(&tx)?;
        if let Some(ingredients) = ingredients {
            RecipeIngredient::replace_for_recipe(&tx, recipe_id, ingredients)?;
        }
        if let Some(tag_ids) = tag_ids {
            RecipeTag::replace_for_recipe(&tx, recipe_id, tag_ids)?;
        }

        tx.commit()?;
        debug!("Updated recipe {}", recipe_id);
        Ok(())
    }

    fn delete_recipe(&self, id: i64) -> Result<bool> {
        Recipe::delete(self.conn, id)
    }

    fn recipe_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        Recipe::find_by_id(self.conn, id)
    }

    fn recipe_by_name(&self, name: &str) -> Result<Option<Recipe>> {
        Recipe::find_by_name(self.conn, name)
    }

    fn recipe_row(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<RecipeRow>> {
        Recipe::find_row(self.conn, id, viewer_id)
    }

    fn query_recipes(
        &self,
        filter: &RecipeFilter,
        viewer_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>> {
        Recipe::query(self.conn, filter, viewer_id, limit, offset)
    }

    fn count_recipes(&self, filter: &RecipeFilter, viewer_id: Option<i64>) -> Result<i64> {
        Recipe::count_filtered(self.conn, filter, viewer_id)
    }

    fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<IngredientAmount>> {
        RecipeIngredient::list_for_recipe(self.conn, recipe_id)
    }

    fn recent_recipes_by_author(&self, author_id: i64, limit: i64) -> Result<Vec<Recipe>> {
        Recipe::list_by_author(self.conn, author_id, limit)
    }

    fn count_recipes_by_author(&self, author_id: i64) -> Result<i64> {
        Recipe::count_by_author(self.conn, author_id)
    }

    fn count_recipes_with_image(&self, image: &str) -> Result<i64> {
        Recipe::count_by_image(self.conn, image)
    }
}

impl RecipeListRepository for SqliteRepository<'_> {
    fn add_to_list(&self, list: RecipeList, user_id: i64, recipe_id: i64) -> Result<()> {
        list.add(self.conn, user_id, recipe_id)
    }

    fn remove_from_list(&self, list: RecipeList, user_id: i64, recipe_id: i64) -> Result<bool> {
        list.remove(self.conn, user_id, recipe_id)
    }

    fn shopping_list(&self, user_id: i64) -> Result<Vec<ShoppingListItem>> {
        ShoppingListItem::for_user(self.conn, user_id)
    }
}

impl SubscriptionRepository for SqliteRepository<'_> {
    fn subscribe(&self, user_id: i64, author_id: i64) -> Result<()> {
        Subscription::insert(self.conn, user_id, author_id)
    }

    fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Subscription::delete(self.conn, user_id, author_id)
    }

    fn is_subscribed(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Subscription::exists(self.conn, user_id, author_id)
    }

    fn subscribed_authors(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<User>> {
        Subscription::list_authors(self.conn, user_id, limit, offset)
    }

    fn count_subscribed_authors(&self, user_id: i64) -> Result<i64> {
        Subscription::count_authors(self.conn, user_id)
    }
}
