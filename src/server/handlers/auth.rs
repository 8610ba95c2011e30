// src/server/handlers/auth.rs
//! Token login and logout

use crate::server::extract::{ApiJson, CurrentViewer};
use crate::server::{ApiResult, SharedState, with_repo};
use crate::service::users;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

/// POST /api/auth/token/login/
pub async fn login(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let auth_token = with_repo(&state, move |repo, _| {
        users::login(repo, &request.email, &request.password)
    })
    .await?;
    Ok(Json(LoginResponse { auth_token }))
}

/// POST /api/auth/token/logout/
pub async fn logout(
    State(state): State<SharedState>,
    CurrentViewer(viewer): CurrentViewer,
) -> ApiResult<StatusCode> {
    with_repo(&state, move |repo, _| users::logout(repo, &viewer)).await?;
    Ok(StatusCode::NO_CONTENT)
}
