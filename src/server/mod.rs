// src/server/mod.rs
//! Foodgram REST server
//!
//! This module provides an HTTP server that:
//! - Serves the recipe, tag, ingredient and user APIs under `/api`
//! - Resolves bearer tokens into an explicit viewer per request
//! - Serves uploaded recipe images from the media directory
//!
//! Handlers are async, but every database interaction runs on the blocking
//! pool with a connection opened for that request.

mod config;
mod error;
mod extract;
mod handlers;
mod routes;

pub use config::FoodgramConfig;
pub use error::{ApiError, ApiResult, ProblemDetails};
pub use extract::CurrentViewer;
pub use routes::create_router;

use crate::db;
use crate::media::MediaStore;
use crate::pagination::PaginationConfig;
use crate::repository::SqliteRepository;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Path to the Foodgram database
    pub db_path: PathBuf,
    /// Directory holding uploaded images
    pub media_root: PathBuf,
    /// URL prefix for media files (no trailing slash)
    pub media_url: String,
    /// CORS allowed origins (empty = any origin)
    pub cors_allowed_origins: Vec<String>,
    /// Page size limits
    pub pagination: PaginationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            db_path: PathBuf::from("/var/lib/foodgram/foodgram.db"),
            media_root: PathBuf::from("/var/lib/foodgram/media"),
            media_url: "/media".to_string(),
            cors_allowed_origins: Vec::new(),
            pagination: PaginationConfig::default(),
        }
    }
}

/// Shared server state
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let media = MediaStore::new(&config.media_root, &config.media_url);
        Self { config, media }
    }

    /// Open a connection to the database
    pub fn open_db(&self) -> crate::Result<Connection> {
        db::open(&self.config.db_path.to_string_lossy())
    }
}

/// Shared state handle passed to handlers
pub type SharedState = Arc<AppState>;

/// Run `f` against a fresh repository on the blocking pool
pub(crate) async fn with_repo<T, F>(state: &SharedState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&SqliteRepository<'_>, &AppState) -> crate::Result<T> + Send + 'static,
{
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || {
        let conn = state.open_db()?;
        let repo = SqliteRepository::new(&conn);
        f(&repo, &*state)
    })
    .await
    .map_err(|e| ApiError::internal(&format!("Task join error: {}", e)))?;

    result.map_err(ApiError::from)
}

/// Run the Foodgram server until interrupted
pub async fn run_server(config: ServerConfig) -> Result<()> {
    tracing::info!("Starting Foodgram server on {}", config.bind_addr);
    tracing::info!("Database: {:?}", config.db_path);
    tracing::info!("Media: {:?} served at {}", config.media_root, config.media_url);

    db::init(&config.db_path.to_string_lossy()).context("Failed to initialize database")?;
    std::fs::create_dir_all(&config.media_root).with_context(|| {
        format!("Failed to create media directory {}", config.media_root.display())
    })?;

    let state = Arc::new(AppState::new(config.clone()));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Foodgram is ready to serve");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
