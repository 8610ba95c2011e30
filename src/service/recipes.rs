// src/service/recipes.rs

//! Recipe aggregate: create, update, delete, read and filtered listing
//!
//! A recipe is written together with its ingredient amounts and tags in
//! one transaction. Reads attach the per-viewer flags and the author's
//! `is_subscribed` state; nothing viewer-dependent is stored.

use super::{RecipeShortView, TagView, UserView, require_text, stored_id};
use crate::auth::Viewer;
use crate::db::models::{MAX_AMOUNT, MIN_AMOUNT, Recipe, RecipeFilter, RecipeRow};
use crate::error::{Error, Result};
use crate::media::MediaStore;
use crate::pagination::{Page, PageRequest, PaginationConfig};
use crate::repository::{IngredientEntry, Repository};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

pub const MAX_NAME_LEN: usize = 200;
pub const MIN_COOKING_TIME: i64 = 1;

/// Listing filters
pub type RecipeQuery = RecipeFilter;

/// One ingredient line of a write request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IngredientInput {
    pub id: i64,
    pub amount: i64,
}

/// Body of a create request
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeCreate {
    pub ingredients: Vec<IngredientInput>,
    #[serde(default)]
    pub tags: Vec<i64>,
    /// `data:image/...;base64,...`
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

/// Body of a partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeUpdate {
    pub ingredients: Option<Vec<IngredientInput>>,
    pub tags: Option<Vec<i64>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Full read shape of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub pub_date: Option<String>,
}

/// Parse a boolean query flag (`1`, `0`, `true`, `false`)
pub fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(Error::validation(field, "expected 1, 0, true or false")),
    }
}

fn validate_name<R: Repository + ?Sized>(
    repo: &R,
    name: &str,
    recipe_id: Option<i64>,
) -> Result<String> {
    let name = require_text("name", name, MAX_NAME_LEN)?;
    if let Some(existing) = repo.recipe_by_name(&name)?
        && existing.id != recipe_id
    {
        return Err(Error::validation("name", "a recipe with this name already exists"));
    }
    Ok(name)
}

fn validate_cooking_time(cooking_time: i64) -> Result<i64> {
    if cooking_time < MIN_COOKING_TIME {
        return Err(Error::validation(
            "cooking_time",
            format!("must be at least {}", MIN_COOKING_TIME),
        ));
    }
    Ok(cooking_time)
}

fn validate_ingredients(ingredients: &[IngredientInput]) -> Result<Vec<IngredientEntry>> {
    if ingredients.is_empty() {
        return Err(Error::validation("ingredients", "at least one ingredient is required"));
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(ingredients.len());
    for item in ingredients {
        if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&item.amount) {
            return Err(Error::validation(
                "ingredients",
                format!(
                    "amount for ingredient {} must be between {} and {}",
                    item.id, MIN_AMOUNT, MAX_AMOUNT
                ),
            ));
        }
        if !seen.insert(item.id) {
            return Err(Error::validation(
                "ingredients",
                format!("ingredient {} is listed more than once", item.id),
            ));
        }
        entries.push((item.id, item.amount));
    }
    Ok(entries)
}

fn validate_tags(tags: &[i64]) -> Result<Vec<i64>> {
    let mut seen = HashSet::new();
    for &tag in tags {
        if !seen.insert(tag) {
            return Err(Error::validation("tags", format!("tag {} is listed more than once", tag)));
        }
    }
    Ok(tags.to_vec())
}

/// Remove a stored image unless some recipe still points at it
///
/// The caller holds `media.lock()`.
fn release_image<R: Repository + ?Sized>(repo: &R, media: &MediaStore, image: &str) {
    let result = repo
        .count_recipes_with_image(image)
        .and_then(|refs| if refs == 0 { media.remove(image) } else { Ok(false) });
    if let Err(e) = result {
        warn!("Failed to release image {}: {}", image, e);
    }
}

/// Load a recipe the viewer may modify: author or staff
fn editable_recipe<R: Repository + ?Sized>(repo: &R, viewer: &Viewer, id: i64) -> Result<Recipe> {
    let user_id = viewer.require_id()?;
    let recipe = repo
        .recipe_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("Recipe {}", id)))?;

    if recipe.author_id != user_id && !viewer.is_staff() {
        return Err(Error::PermissionDenied(
            "only the author can change this recipe".to_string(),
        ));
    }
    Ok(recipe)
}

/// Publish a new recipe as the viewer
pub fn create_recipe<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    input: RecipeCreate,
) -> Result<RecipeView> {
    let author_id = viewer.require_id()?;

    let name = validate_name(repo, &input.name, None)?;
    let text = require_text("text", &input.text, usize::MAX)?;
    let cooking_time = validate_cooking_time(input.cooking_time)?;
    let ingredients = validate_ingredients(&input.ingredients)?;
    let tags = validate_tags(&input.tags)?;

    let recipe_id = {
        let _references = media.lock();
        let image = media.store_data_url(&input.image)?;
        let mut recipe = Recipe::new(author_id, name, text, image.clone(), cooking_time);

        match repo.create_recipe(&mut recipe, &ingredients, &tags) {
            Ok(id) => id,
            Err(e) => {
                release_image(repo, media, &image);
                return Err(e);
            }
        }
    };

    info!("User {} created recipe {}", author_id, recipe_id);
    get_recipe(repo, media, viewer, recipe_id)
}

/// Change a recipe; only the author or staff may do so
pub fn update_recipe<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    id: i64,
    input: RecipeUpdate,
) -> Result<RecipeView> {
    let mut recipe = editable_recipe(repo, viewer, id)?;

    if let Some(name) = &input.name {
        recipe.name = validate_name(repo, name, recipe.id)?;
    }
    if let Some(text) = &input.text {
        recipe.text = require_text("text", text, usize::MAX)?;
    }
    if let Some(cooking_time) = input.cooking_time {
        recipe.cooking_time = validate_cooking_time(cooking_time)?;
    }
    let ingredients = input
        .ingredients
        .as_deref()
        .map(validate_ingredients)
        .transpose()?;
    let tags = input.tags.as_deref().map(validate_tags).transpose()?;

    let references = media.lock();
    let old_image = recipe.image.clone();
    if let Some(image) = &input.image {
        recipe.image = media.store_data_url(image)?;
    }

    if let Err(e) = repo.update_recipe(&recipe, ingredients.as_deref(), tags.as_deref()) {
        if recipe.image != old_image {
            release_image(repo, media, &recipe.image);
        }
        return Err(e);
    }
    if recipe.image != old_image {
        release_image(repo, media, &old_image);
    }
    drop(references);

    info!("Recipe {} updated", id);
    get_recipe(repo, media, viewer, id)
}

/// Delete a recipe; only the author or staff may do so
pub fn delete_recipe<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    id: i64,
) -> Result<()> {
    let recipe = editable_recipe(repo, viewer, id)?;
    {
        let _references = media.lock();
        repo.delete_recipe(id)?;
        release_image(repo, media, &recipe.image);
    }

    info!("Recipe {} deleted", id);
    Ok(())
}

pub fn get_recipe<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    id: i64,
) -> Result<RecipeView> {
    let row = repo
        .recipe_row(id, viewer.user_id())?
        .ok_or_else(|| Error::NotFound(format!("Recipe {}", id)))?;
    render(repo, media, viewer, row)
}

/// Filtered, paginated listing, newest first
pub fn list_recipes<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    query: &RecipeQuery,
    page: &PageRequest,
    config: &PaginationConfig,
) -> Result<Page<RecipeView>> {
    let viewer_id = viewer.user_id();
    let count = repo.count_recipes(query, viewer_id)?;
    Page::fetch(page, config, count, |limit, offset| {
        repo.query_recipes(query, viewer_id, limit, offset)
    })?
    .try_map(|row| render(repo, media, viewer, row))
}

/// Short shape of a stored recipe
pub fn short_view<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    id: i64,
) -> Result<RecipeShortView> {
    let recipe = repo
        .recipe_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("Recipe {}", id)))?;
    RecipeShortView::new(media, recipe)
}

fn render<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    row: RecipeRow,
) -> Result<RecipeView> {
    let RecipeRow {
        recipe,
        is_favorited,
        is_in_shopping_cart,
    } = row;
    let id = stored_id(recipe.id, "Recipe")?;

    let author = repo
        .user_by_id(recipe.author_id)?
        .ok_or_else(|| Error::NotFound(format!("User {}", recipe.author_id)))?;

    let tags = repo
        .tags_for_recipe(id)?
        .into_iter()
        .map(TagView::try_from)
        .collect::<Result<Vec<_>>>()?;

    let ingredients = repo
        .recipe_ingredients(id)?
        .into_iter()
        .map(|item| RecipeIngredientView {
            id: item.ingredient_id,
            name: item.name,
            measurement_unit: item.measurement_unit,
            amount: item.amount,
        })
        .collect();

    Ok(RecipeView {
        id,
        tags,
        author: UserView::for_viewer(repo, viewer, author)?,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        image: media.url(&recipe.image),
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        pub_date: recipe.pub_date,
    })
}
