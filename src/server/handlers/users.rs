// src/server/handlers/users.rs
//! User endpoints: registration, profiles, password and subscriptions

use super::{Paginated, QueryParams};
use crate::server::extract::{ApiJson, CurrentViewer, IdPath};
use crate::server::{ApiResult, SharedState, with_repo};
use crate::service::subscriptions::{self, SubscriptionView};
use crate::service::users::{self, UserCreate};
use crate::service::UserView;
use axum::{
    Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use serde::Deserialize;

/// Request body for POST /api/users/set_password/
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

/// `recipes_limit` for subscription previews; unparsable means default
fn recipes_limit(params: &QueryParams) -> Option<i64> {
    params
        .get("recipes_limit")
        .and_then(|value| value.trim().parse().ok())
}

/// GET /api/users/
pub async fn list_users(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Paginated<UserView>>> {
    let page = QueryParams::from_uri(&uri).page_request()?;
    let page = with_repo(&state, move |repo, state| {
        users::list_users(repo, &viewer, &page, &state.config.pagination)
    })
    .await?;
    Ok(Json(Paginated::new(page, &uri)))
}

/// POST /api/users/
pub async fn register(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let user = with_repo(&state, move |repo, _| users::register(repo, input)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id/
pub async fn get_user(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(id): IdPath,
) -> ApiResult<Json<UserView>> {
    let user = with_repo(&state, move |repo, _| users::get_user(repo, &viewer, id)).await?;
    Ok(Json(user))
}

/// GET /api/users/me/
pub async fn me(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
) -> ApiResult<Json<UserView>> {
    let user = with_repo(&state, move |repo, _| users::me(repo, &viewer)).await?;
    Ok(Json(user))
}

/// POST /api/users/set_password/
pub async fn set_password(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    ApiJson(request): ApiJson<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    with_repo(&state, move |repo, _| {
        users::set_password(
            repo,
            &viewer,
            &request.current_password,
            &request.new_password,
        )
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/:id/subscribe/?recipes_limit=N
pub async fn subscribe(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(author_id): IdPath,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<(StatusCode, Json<SubscriptionView>)> {
    let limit = recipes_limit(&QueryParams::from_uri(&uri));
    let view = with_repo(&state, move |repo, state| {
        subscriptions::subscribe(
            repo,
            &state.media,
            &viewer,
            author_id,
            limit,
            &state.config.pagination,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/users/:id/subscribe/
pub async fn unsubscribe(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    IdPath(author_id): IdPath,
) -> ApiResult<StatusCode> {
    with_repo(&state, move |repo, _| {
        subscriptions::unsubscribe(repo, &viewer, author_id)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions/
pub async fn subscriptions(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Paginated<SubscriptionView>>> {
    let params = QueryParams::from_uri(&uri);
    let page = params.page_request()?;
    let limit = recipes_limit(&params);

    let page = with_repo(&state, move |repo, state| {
        subscriptions::list_subscriptions(
            repo,
            &state.media,
            &viewer,
            &page,
            limit,
            &state.config.pagination,
        )
    })
    .await?;
    Ok(Json(Paginated::new(page, &uri)))
}
