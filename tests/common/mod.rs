// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use foodgram::Viewer;
use foodgram::db;
use foodgram::media::MediaStore;
use foodgram::repository::{SqliteRepository, UserRepository};
use foodgram::service::catalog;
use foodgram::service::recipes::{self, IngredientInput, RecipeCreate, RecipeView};
use foodgram::service::users::{self, UserCreate};
use rusqlite::Connection;
use tempfile::TempDir;

/// A file-backed database and media directory.
///
/// Keep the value alive for the duration of the test; dropping it removes
/// the temporary directory.
pub struct TestEnv {
    pub dir: TempDir,
    pub db_path: String,
    pub media: MediaStore,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir
            .path()
            .join("foodgram.db")
            .to_str()
            .unwrap()
            .to_string();
        db::init(&db_path).unwrap();

        let media = MediaStore::new(dir.path().join("media"), "/media");
        let conn = db::open(&db_path).unwrap();
        Self {
            dir,
            db_path,
            media,
            conn,
        }
    }

    pub fn repo(&self) -> SqliteRepository<'_> {
        SqliteRepository::new(&self.conn)
    }

    /// Register `username` (password "password") and return its viewer
    pub fn user(&self, username: &str) -> Viewer {
        let view = users::register(
            &self.repo(),
            UserCreate {
                email: format!("{}@example.com", username),
                username: username.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password: "password".to_string(),
            },
        )
        .unwrap();
        Viewer::User(self.repo().user_by_id(view.id).unwrap().unwrap())
    }

    pub fn ingredient(&self, name: &str, unit: &str) -> i64 {
        catalog::create_ingredient(&self.repo(), name, unit).unwrap().id
    }

    pub fn tag(&self, slug: &str) -> i64 {
        catalog::create_tag(&self.repo(), &slug.to_uppercase(), "#49B64E", slug)
            .unwrap()
            .id
    }

    /// Publish a recipe with the given ingredients and tags
    pub fn recipe(
        &self,
        author: &Viewer,
        name: &str,
        ingredients: &[(i64, i64)],
        tags: &[i64],
    ) -> RecipeView {
        recipes::create_recipe(
            &self.repo(),
            &self.media,
            author,
            recipe_input(name, ingredients, tags),
        )
        .unwrap()
    }

    /// Rows in `table` that reference `recipe_id`
    pub fn count_rows(&self, table: &str, recipe_id: i64) -> i64 {
        self.conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE recipe_id = ?1", table),
                [recipe_id],
                |row| row.get(0),
            )
            .unwrap()
    }
}

pub fn recipe_input(name: &str, ingredients: &[(i64, i64)], tags: &[i64]) -> RecipeCreate {
    RecipeCreate {
        ingredients: ingredients
            .iter()
            .map(|&(id, amount)| IngredientInput { id, amount })
            .collect(),
        tags: tags.to_vec(),
        image: png_data_url(name),
        name: name.to_string(),
        text: format!("How to make {}", name),
        cooking_time: 30,
    }
}

/// A small PNG-signed payload; distinct seeds give distinct files
pub fn png_data_url(seed: &str) -> String {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(seed.as_bytes());
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}
