// src/server/handlers/ingredients.rs
//! Ingredient endpoints (read-only, not paginated)

use crate::server::extract::IdPath;
use crate::server::{ApiResult, SharedState, with_repo};
use crate::service::{IngredientView, catalog};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearch {
    /// Name prefix, matched case-insensitively
    pub name: Option<String>,
}

/// GET /api/ingredients/?name=<prefix>
pub async fn list_ingredients(
    State(state): State<SharedState>,
    Query(search): Query<IngredientSearch>,
) -> ApiResult<Json<Vec<IngredientView>>> {
    let ingredients = with_repo(&state, move |repo, _| {
        catalog::search_ingredients(repo, search.name.as_deref())
    })
    .await?;
    Ok(Json(ingredients))
}

/// GET /api/ingredients/:id/
pub async fn get_ingredient(
    State(state): State<SharedState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<IngredientView>> {
    let ingredient = with_repo(&state, move |repo, _| catalog::get_ingredient(repo, id)).await?;
    Ok(Json(ingredient))
}
