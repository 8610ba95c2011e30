// src/repository/mod.rs

//! Repository interfaces for Foodgram entities
//!
//! Services never touch SQL directly. They are generic over these traits,
//! one per entity, so the storage backend can be swapped or faked in
//! tests. [`SqliteRepository`] is the production implementation.
//!
//! Recipe writes that span several tables (`create_recipe`,
//! `update_recipe`) are atomic: either every row is written or none is.

mod sqlite;

pub use sqlite::SqliteRepository;

use crate::db::models::{
    AuthToken, Ingredient, IngredientAmount, Recipe, RecipeFilter, RecipeList, RecipeRow,
    ShoppingListItem, Tag, User,
};
use crate::error::Result;

/// (ingredient id, amount) pair of a recipe
pub type IngredientEntry = (i64, i64);

pub trait UserRepository {
    /// Insert a user, setting its ID
    fn insert_user(&self, user: &mut User) -> Result<i64>;

    fn user_by_id(&self, id: i64) -> Result<Option<User>>;

    fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Users ordered by ID
    fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>>;

    fn count_users(&self) -> Result<i64>;

    fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()>;
}

pub trait TokenRepository {
    fn token_for_user(&self, user_id: i64) -> Result<Option<AuthToken>>;

    fn insert_token(&self, key: &str, user_id: i64) -> Result<AuthToken>;

    /// Resolve a token key to its owner
    fn user_by_token(&self, key: &str) -> Result<Option<User>>;

    /// Returns whether a token existed
    fn delete_token(&self, user_id: i64) -> Result<bool>;
}

pub trait TagRepository {
    fn insert_tag(&self, tag: &mut Tag) -> Result<i64>;

    fn tag_by_id(&self, id: i64) -> Result<Option<Tag>>;

    fn list_tags(&self) -> Result<Vec<Tag>>;

    fn tags_for_recipe(&self, recipe_id: i64) -> Result<Vec<Tag>>;
}

pub trait IngredientRepository {
    fn insert_ingredient(&self, ingredient: &mut Ingredient) -> Result<i64>;

    fn ingredient_by_id(&self, id: i64) -> Result<Option<Ingredient>>;

    /// Case-insensitive name prefix search, ordered by name
    fn search_ingredients(&self, prefix: &str) -> Result<Vec<Ingredient>>;
}

pub trait RecipeRepository {
    /// Insert a recipe with its ingredients and tags in one transaction
    ///
    /// Fails with `NotFound` (and writes nothing) if any ingredient or tag
    /// ID does not exist.
    fn create_recipe(
        &self,
        recipe: &mut Recipe,
        ingredients: &[IngredientEntry],
        tag_ids: &[i64],
    ) -> Result<i64>;

    /// Write recipe fields and, when given, replace its ingredients or tags
    ///
    /// Same atomicity and `NotFound` rules as `create_recipe`.
    fn update_recipe(
        &self,
        recipe: &Recipe,
        ingredients: Option<&[IngredientEntry]>,
        tag_ids: Option<&[i64]>,
    ) -> Result<()>;

    /// Returns whether the recipe existed
    fn delete_recipe(&self, id: i64) -> Result<bool>;

    fn recipe_by_id(&self, id: i64) -> Result<Option<Recipe>>;

    fn recipe_by_name(&self, name: &str) -> Result<Option<Recipe>>;

    /// One recipe with the flags for `viewer_id`
    fn recipe_row(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<RecipeRow>>;

    /// Filtered listing, newest first
    fn query_recipes(
        &self,
        filter: &RecipeFilter,
        viewer_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>>;

    fn count_recipes(&self, filter: &RecipeFilter, viewer_id: Option<i64>) -> Result<i64>;

    fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<IngredientAmount>>;

    fn recent_recipes_by_author(&self, author_id: i64, limit: i64) -> Result<Vec<Recipe>>;

    fn count_recipes_by_author(&self, author_id: i64) -> Result<i64>;

    /// How many recipes point at a stored image
    fn count_recipes_with_image(&self, image: &str) -> Result<i64>;
}

pub trait RecipeListRepository {
    /// Add to a list; a duplicate is a `Conflict`
    fn add_to_list(&self, list: RecipeList, user_id: i64, recipe_id: i64) -> Result<()>;

    /// Returns whether the recipe was on the list
    fn remove_from_list(&self, list: RecipeList, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Ingredient totals over the user's shopping cart
    fn shopping_list(&self, user_id: i64) -> Result<Vec<ShoppingListItem>>;
}

pub trait SubscriptionRepository {
    /// A duplicate pair or a self-subscription is a `Conflict`
    fn subscribe(&self, user_id: i64, author_id: i64) -> Result<()>;

    /// Returns whether the subscription existed
    fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<bool>;

    fn is_subscribed(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Followed authors ordered by ID
    fn subscribed_authors(&self, user_id: i64, limit: i64, offset: i64) -> Result<Vec<User>>;

    fn count_subscribed_authors(&self, user_id: i64) -> Result<i64>;
}

/// Everything the services need from storage
pub trait Repository:
    UserRepository
    + TokenRepository
    + TagRepository
    + IngredientRepository
    + RecipeRepository
    + RecipeListRepository
    + SubscriptionRepository
{
}

impl<T> Repository for T where
    T: UserRepository
        + TokenRepository
        + TagRepository
        + IngredientRepository
        + RecipeRepository
        + RecipeListRepository
        + SubscriptionRepository
{
}
