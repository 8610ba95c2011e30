// src/server/extract.rs
//! Request extractors
//!
//! `Authorization: Bearer <token>` (or `Token <token>`) identifies the
//! viewer. No header means an anonymous viewer; a header that does not
//! resolve to a user is rejected outright.
//!
//! `IdPath` and `ApiJson` wrap the stock extractors so their rejections
//! render as problem details.

use crate::auth::Viewer;
use crate::error::Error;
use crate::server::{ApiError, SharedState, with_repo};
use crate::service::users;
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

/// The viewer making the current request
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

#[async_trait]
impl FromRequestParts<SharedState> for CurrentViewer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Self(Viewer::Anonymous));
        };

        let value = header.to_str().map_err(|_| Error::Unauthenticated)?;
        let token = parse_authorization(value).ok_or(Error::Unauthenticated)?;

        let viewer = with_repo(state, move |repo, _| users::authenticate(repo, &token)).await?;
        Ok(Self(viewer))
    }
}

/// Numeric `:id` path segment; anything else is not-found
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for IdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

/// JSON request body
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Extract the token from `Bearer <token>` or `Token <token>`
fn parse_authorization(value: &str) -> Option<String> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    let known = scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token");
    (known && !token.is_empty() && !token.contains(' ')).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authorization() {
        assert_eq!(parse_authorization("Bearer abc").as_deref(), Some("abc"));
        assert_eq!(parse_authorization("Token abc").as_deref(), Some("abc"));
        assert_eq!(parse_authorization("bearer  abc ").as_deref(), Some("abc"));
        assert_eq!(parse_authorization("Basic abc"), None);
        assert_eq!(parse_authorization("Bearer"), None);
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization("Bearer a b"), None);
    }
}
