// src/lib.rs

//! Foodgram recipe-sharing backend
//!
//! Users publish recipes built from a shared ingredient catalog, tag them,
//! mark favorites, follow authors and collect recipes into a shopping cart
//! whose ingredients are summed into a downloadable shopping list.
//!
//! # Architecture
//!
//! - `db`: SQLite schema, migrations and active-record models
//! - `repository`: per-entity traits over storage, with a SQLite implementation
//! - `service`: validation, permissions and response shapes; every operation
//!   takes the requesting viewer explicitly
//! - `server` (feature `server`): the axum REST API

pub mod auth;
pub mod db;
mod error;
pub mod media;
pub mod pagination;
pub mod repository;
pub mod service;

#[cfg(feature = "server")]
pub mod server;

pub use auth::Viewer;
pub use error::{Error, Result};
