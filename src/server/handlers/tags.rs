// src/server/handlers/tags.rs
//! Tag endpoints (read-only, not paginated)

use crate::server::extract::IdPath;
use crate::server::{ApiResult, SharedState, with_repo};
use crate::service::{TagView, catalog};
use axum::{Json, extract::State};

/// GET /api/tags/
pub async fn list_tags(State(state): State<SharedState>) -> ApiResult<Json<Vec<TagView>>> {
    let tags = with_repo(&state, |repo, _| catalog::list_tags(repo)).await?;
    Ok(Json(tags))
}

/// GET /api/tags/:id/
pub async fn get_tag(
    State(state): State<SharedState>,
    IdPath(id): IdPath,
) -> ApiResult<Json<TagView>> {
    let tag = with_repo(&state, move |repo, _| catalog::get_tag(repo, id)).await?;
    Ok(Json(tag))
}
