// src/server/routes.rs
//! Axum router configuration for the Foodgram server
//!
//! Every API path answers with and without its trailing slash. Static
//! segments (`me`, `subscriptions`, `download_shopping_cart`) take
//! precedence over the `:id` routes beside them.

use crate::server::handlers::{auth, ingredients, recipes, tags, users};
use crate::server::{ApiError, ProblemDetails, SharedState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Uri},
    routing::{MethodRouter, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Request bodies carry base64 images
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: SharedState) -> Router {
    let routes: Vec<(&str, MethodRouter<SharedState>)> = vec![
        (
            "/api/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        ),
        (
            "/api/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        ),
        (
            "/api/recipes/:id",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        ),
        (
            "/api/recipes/:id/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        ),
        (
            "/api/recipes/:id/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        ),
        ("/api/tags", get(tags::list_tags)),
        ("/api/tags/:id", get(tags::get_tag)),
        ("/api/ingredients", get(ingredients::list_ingredients)),
        ("/api/ingredients/:id", get(ingredients::get_ingredient)),
        ("/api/users", get(users::list_users).post(users::register)),
        ("/api/users/me", get(users::me)),
        ("/api/users/set_password", post(users::set_password)),
        ("/api/users/subscriptions", get(users::subscriptions)),
        ("/api/users/:id", get(users::get_user)),
        (
            "/api/users/:id/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        ),
        ("/api/auth/token/login", post(auth::login)),
        ("/api/auth/token/logout", post(auth::logout)),
    ];

    let api = routes
        .into_iter()
        .fold(Router::new(), |router, (path, handler)| {
            with_trailing_slash(router, path, handler)
        })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new());

    let media = ServeDir::new(&state.config.media_root);
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .nest_service(&state.config.media_url, media)
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn with_trailing_slash(
    router: Router<SharedState>,
    path: &str,
    handler: MethodRouter<SharedState>,
) -> Router<SharedState> {
    router
        .route(path, handler.clone())
        .route(&format!("{}/", path), handler)
}

/// Any origin when none are configured; otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError(
        ProblemDetails::not_found(&format!("No route for {}", uri.path()))
            .with_instance(uri.path().to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::server::{AppState, ServerConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("foodgram.db");
        db::init(&db_path.to_string_lossy()).unwrap();

        let config = ServerConfig {
            db_path,
            media_root: dir.path().join("media"),
            ..ServerConfig::default()
        };
        (create_router(Arc::new(AppState::new(config))), dir)
    }

    async fn send_get(app: Router, uri: &str, token: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _dir) = app();
        let response = send_get(app, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_trailing_slash_optional() {
        let (app, _dir) = app();
        assert_eq!(send_get(app.clone(), "/api/tags/", None).await.status(), StatusCode::OK);
        assert_eq!(send_get(app, "/api/tags", None).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_problem() {
        let (app, _dir) = app();
        let response = send_get(app, "/api/nothing/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let (app, _dir) = app();
        let response = send_get(app, "/api/recipes/abc/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_huge_page_is_not_found() {
        let (app, _dir) = app();
        let response = send_get(app, "/api/recipes/?page=9223372036854775807", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let (app, _dir) = app();
        let response = send_get(app, "/api/recipes/", Some("deadbeef")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_requires_auth() {
        let (app, _dir) = app();
        let response = send_get(app, "/api/users/me/", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_anonymous_download_rejected() {
        let (app, _dir) = app();
        let response = send_get(app, "/api/recipes/download_shopping_cart/", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
