// src/service/mod.rs

//! Application services
//!
//! Each function takes the repository, the request's [`Viewer`] and a typed
//! input shape, and returns a typed view ready to be serialized. Nothing
//! here knows about HTTP.
//!
//! [`Viewer`]: crate::auth::Viewer

pub mod catalog;
pub mod lists;
pub mod recipes;
pub mod shopping;
pub mod subscriptions;
pub mod users;

use crate::auth::Viewer;
use crate::db::models::{Ingredient, Recipe, Tag, User};
use crate::error::{Error, Result};
use crate::media::MediaStore;
use crate::repository::SubscriptionRepository;
use serde::Serialize;

/// Public shape of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the viewer follows this user
    pub is_subscribed: bool,
}

impl UserView {
    /// Render `user` for `viewer`
    pub fn for_viewer<R: SubscriptionRepository + ?Sized>(
        repo: &R,
        viewer: &Viewer,
        user: User,
    ) -> Result<Self> {
        let id = stored_id(user.id, "User")?;
        let is_subscribed = match viewer.user_id() {
            Some(viewer_id) if viewer_id != id => repo.is_subscribed(viewer_id, id)?,
            _ => false,
        };
        Ok(Self::new(id, user, is_subscribed))
    }

    pub(crate) fn new(id: i64, user: User, is_subscribed: bool) -> Self {
        Self {
            email: user.email,
            id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl TryFrom<Tag> for TagView {
    type Error = Error;

    fn try_from(tag: Tag) -> Result<Self> {
        Ok(Self {
            id: stored_id(tag.id, "Tag")?,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl TryFrom<Ingredient> for IngredientView {
    type Error = Error;

    fn try_from(ingredient: Ingredient) -> Result<Self> {
        Ok(Self {
            id: stored_id(ingredient.id, "Ingredient")?,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        })
    }
}

/// Compact recipe shape used by list toggles and subscriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeShortView {
    pub id: i64,
    pub name: String,
    /// Public image URL
    pub image: String,
    pub cooking_time: i64,
}

impl RecipeShortView {
    pub fn new(media: &MediaStore, recipe: Recipe) -> Result<Self> {
        Ok(Self {
            id: stored_id(recipe.id, "Recipe")?,
            image: media.url(&recipe.image),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        })
    }
}

/// ID of a row read back from storage
fn stored_id(id: Option<i64>, entity: &str) -> Result<i64> {
    id.ok_or_else(|| Error::InitError(format!("{} has no ID", entity)))
}

/// Check a required text field: trimmed, non-empty, at most `max_len` chars
fn require_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(field, "this field may not be blank"));
    }
    if value.chars().count() > max_len {
        return Err(Error::validation(
            field,
            format!("ensure this field has no more than {} characters", max_len),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the service tests

    use super::*;
    use crate::auth;
    use crate::db;
    use crate::repository::{IngredientRepository, SqliteRepository, TagRepository, UserRepository};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use rusqlite::Connection;
    use tempfile::TempDir;

    pub struct Fixture {
        pub conn: Connection,
        pub media: MediaStore,
        pub media_dir: TempDir,
    }

    impl Fixture {
        pub fn new() -> Self {
            let media_dir = TempDir::new().unwrap();
            Self {
                conn: db::open_in_memory().unwrap(),
                media: MediaStore::new(media_dir.path(), "/media"),
                media_dir,
            }
        }

        pub fn repo(&self) -> SqliteRepository<'_> {
            SqliteRepository::new(&self.conn)
        }

        /// Insert a user and return a viewer for it
        pub fn user(&self, username: &str) -> Viewer {
            let mut user = User::new(
                format!("{}@example.com", username),
                username.to_string(),
                "First".to_string(),
                "Last".to_string(),
                auth::hash_password("password"),
            );
            self.repo().insert_user(&mut user).unwrap();
            Viewer::User(user)
        }

        pub fn ingredient(&self, name: &str, unit: &str) -> i64 {
            self.repo()
                .insert_ingredient(&mut Ingredient::new(name.to_string(), unit.to_string()))
                .unwrap()
        }

        pub fn tag(&self, slug: &str, color: &str) -> i64 {
            self.repo()
                .insert_tag(&mut Tag::new(slug.to_uppercase(), color.to_string(), slug.to_string()))
                .unwrap()
        }
    }

    pub fn png_data_url(seed: &str) -> String {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(seed.as_bytes());
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }
}
