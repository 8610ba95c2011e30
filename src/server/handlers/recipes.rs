// src/server/handlers/recipes.rs
//! Recipe endpoints: CRUD, favorites, shopping cart and its download

use super::{Paginated, QueryParams};
use crate::auth::Viewer;
use crate::db::models::{RecipeFilter, RecipeList};
use crate::error::Result;
use crate::server::extract::{ApiJson, CurrentViewer, IdPath};
use crate::server::{ApiResult, SharedState, with_repo};
use crate::service::recipes::{self, RecipeCreate, RecipeQuery, RecipeUpdate, RecipeView};
use crate::service::{RecipeShortView, lists, shopping};
use axum::{
    Json,
    extract::{OriginalUri, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

/// Listing filters from the query string
///
/// `tags` may repeat and matches any of the slugs; `search` (or `name`)
/// matches part of the recipe name.
fn recipe_query(params: &QueryParams) -> Result<RecipeQuery> {
    let flag = |field: &str| {
        params
            .get(field)
            .map(|value| recipes::parse_flag(field, value))
            .transpose()
    };

    Ok(RecipeFilter {
        tags: params.get_all("tags"),
        author_id: params.int("author")?,
        is_favorited: flag("is_favorited")?,
        is_in_shopping_cart: flag("is_in_shopping_cart")?,
        search: params
            .get("search")
            .or_else(|| params.get("name"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    })
}

/// GET /api/recipes/
pub async fn list_recipes(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Paginated<RecipeView>>> {
    let params = QueryParams::from_uri(&uri);
    let query = recipe_query(&params)?;
    let page = params.page_request()?;

    let page = with_repo(&state, move |repo, state| {
        recipes::list_recipes(
            repo,
            &state.media,
            &viewer,
            &query,
            &page,
            &state.config.pagination,
        )
    })
    .await?;

    Ok(Json(Paginated::new(page, &uri)))
}

/// POST /api/recipes/
pub async fn create_recipe(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    ApiJson(input): ApiJson<RecipeCreate>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let view = with_repo(&state, move |repo, state| {
        recipes::create_recipe(repo, &state.media, &viewer, input)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/recipes/:id/
pub async fn get_recipe(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<Json<RecipeView>> {
    let view = with_repo(&state, move |repo, state| {
        recipes::get_recipe(repo, &state.media, &viewer, id)
    })
    .await?;
    Ok(Json(view))
}

/// PATCH /api/recipes/:id/
pub async fn update_recipe(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<RecipeUpdate>,
) -> ApiResult<Json<RecipeView>> {
    let view = with_repo(&state, move |repo, state| {
        recipes::update_recipe(repo, &state.media, &viewer, id, input)
    })
    .await?;
    Ok(Json(view))
}

/// DELETE /api/recipes/:id/
pub async fn delete_recipe(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    with_repo(&state, move |repo, state| {
        recipes::delete_recipe(repo, &state.media, &viewer, id)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to_list(
    state: SharedState,
    viewer: Viewer,
    list: RecipeList,
    id: i64,
) -> ApiResult<(StatusCode, Json<RecipeShortView>)> {
    let view = with_repo(&state, move |repo, state| {
        lists::add(repo, &state.media, &viewer, list, id)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn remove_from_list(
    state: SharedState,
    viewer: Viewer,
    list: RecipeList,
    id: i64,
) -> ApiResult<StatusCode> {
    with_repo(&state, move |repo, _| lists::remove(repo, &viewer, list, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/:id/favorite/
pub async fn add_favorite(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<(StatusCode, Json<RecipeShortView>)> {
    add_to_list(state, viewer, RecipeList::Favorites, id).await
}

/// DELETE /api/recipes/:id/favorite/
pub async fn remove_favorite(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    remove_from_list(state, viewer, RecipeList::Favorites, id).await
}

/// POST /api/recipes/:id/shopping_cart/
pub async fn add_to_cart(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<(StatusCode, Json<RecipeShortView>)> {
    add_to_list(state, viewer, RecipeList::ShoppingCart, id).await
}

/// DELETE /api/recipes/:id/shopping_cart/
pub async fn remove_from_cart(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<StatusCode> {
    remove_from_list(state, viewer, RecipeList::ShoppingCart, id).await
}

/// GET /api/recipes/download_shopping_cart/
///
/// Plain-text attachment with the aggregated ingredient totals.
pub async fn download_shopping_cart(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
) -> ApiResult<impl IntoResponse> {
    let items = with_repo(&state, move |repo, _| shopping::shopping_list(repo, &viewer)).await?;
    let body = shopping::render_shopping_list(&items);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", shopping::SHOPPING_LIST_FILENAME),
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn params(query: &str) -> QueryParams {
        QueryParams::from_uri(&format!("/api/recipes/?{}", query).parse().unwrap())
    }

    #[test]
    fn test_recipe_query() {
        let query = recipe_query(&params(
            "tags=breakfast&tags=lunch&author=4&is_favorited=1&is_in_shopping_cart=false&search=soup",
        ))
        .unwrap();
        assert_eq!(query.tags, vec!["breakfast", "lunch"]);
        assert_eq!(query.author_id, Some(4));
        assert_eq!(query.is_favorited, Some(true));
        assert_eq!(query.is_in_shopping_cart, Some(false));
        assert_eq!(query.search.as_deref(), Some("soup"));
    }

    #[test]
    fn test_empty_query_is_unfiltered() {
        assert_eq!(recipe_query(&params("")).unwrap(), RecipeFilter::default());
        assert_eq!(
            recipe_query(&params("name=pie")).unwrap().search.as_deref(),
            Some("pie")
        );
    }

    #[test]
    fn test_bad_flag_rejected() {
        assert!(matches!(
            recipe_query(&params("is_favorited=maybe")),
            Err(Error::Validation { .. })
        ));
    }
}
