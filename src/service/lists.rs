// src/service/lists.rs

//! Favorites and shopping-cart toggles
//!
//! Adding relies on the unique (user, recipe) constraint alone: there is no
//! existence pre-check, so of two racing adds exactly one succeeds and the
//! other reports `Conflict`. Removing is idempotent.

use super::RecipeShortView;
use crate::auth::Viewer;
use crate::db::models::RecipeList;
use crate::error::{Error, Result};
use crate::media::MediaStore;
use crate::repository::Repository;
use tracing::debug;

/// Put a recipe on one of the viewer's lists
pub fn add<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    list: RecipeList,
    recipe_id: i64,
) -> Result<RecipeShortView> {
    let user_id = viewer.require_id()?;
    let recipe = repo
        .recipe_by_id(recipe_id)?
        .ok_or_else(|| Error::NotFound(format!("Recipe {}", recipe_id)))?;

    repo.add_to_list(list, user_id, recipe_id)?;
    debug!("User {} added recipe {} to {}", user_id, recipe_id, list.as_str());

    RecipeShortView::new(media, recipe)
}

/// Take a recipe off one of the viewer's lists; succeeds if it was not there
pub fn remove<R: Repository + ?Sized>(
    repo: &R,
    viewer: &Viewer,
    list: RecipeList,
    recipe_id: i64,
) -> Result<()> {
    let user_id = viewer.require_id()?;
    if repo.recipe_by_id(recipe_id)?.is_none() {
        return Err(Error::NotFound(format!("Recipe {}", recipe_id)));
    }

    let removed = repo.remove_from_list(list, user_id, recipe_id)?;
    debug!(
        "User {} removed recipe {} from {} (present: {})",
        user_id,
        recipe_id,
        list.as_str(),
        removed
    );
    Ok(())
}
