// src/service/catalog.rs

//! Reference data: tags and ingredients
//!
//! Both are read-only over the API and managed from the command line.

use super::{IngredientView, TagView, require_text};
use crate::db::models::{Ingredient, Tag};
use crate::error::{Error, Result};
use crate::repository::Repository;
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

pub const MAX_TAG_NAME_LEN: usize = 200;
pub const MAX_INGREDIENT_NAME_LEN: usize = 200;
pub const MAX_UNIT_LEN: usize = 200;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("color pattern is valid"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

/// Create a tag; the color must be `#RRGGBB`
pub fn create_tag<R: Repository + ?Sized>(
    repo: &R,
    name: &str,
    color: &str,
    slug: &str,
) -> Result<TagView> {
    let name = require_text("name", name, MAX_TAG_NAME_LEN)?;
    let color = color.trim();
    if !COLOR_RE.is_match(color) {
        return Err(Error::validation("color", format!("'{}' is not a #RRGGBB color", color)));
    }
    let slug = slug.trim();
    if !SLUG_RE.is_match(slug) {
        return Err(Error::validation(
            "slug",
            "may contain only letters, digits, hyphens and underscores",
        ));
    }

    let mut tag = Tag::new(name, color.to_uppercase(), slug.to_string());
    repo.insert_tag(&mut tag)?;
    info!("Created tag {} ({})", tag.slug, tag.color);
    TagView::try_from(tag)
}

/// Every tag, ordered by ID
pub fn list_tags<R: Repository + ?Sized>(repo: &R) -> Result<Vec<TagView>> {
    repo.list_tags()?.into_iter().map(TagView::try_from).collect()
}

pub fn get_tag<R: Repository + ?Sized>(repo: &R, id: i64) -> Result<TagView> {
    repo.tag_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("Tag {}", id)))
        .and_then(TagView::try_from)
}

/// Create an ingredient; the (name, unit) pair must be new
pub fn create_ingredient<R: Repository + ?Sized>(
    repo: &R,
    name: &str,
    measurement_unit: &str,
) -> Result<IngredientView> {
    let name = require_text("name", name, MAX_INGREDIENT_NAME_LEN)?;
    let unit = require_text("measurement_unit", measurement_unit, MAX_UNIT_LEN)?;

    let mut ingredient = Ingredient::new(name, unit);
    repo.insert_ingredient(&mut ingredient)?;
    IngredientView::try_from(ingredient)
}

/// Ingredients whose name starts with `prefix` (any case), ordered by name
pub fn search_ingredients<R: Repository + ?Sized>(
    repo: &R,
    prefix: Option<&str>,
) -> Result<Vec<IngredientView>> {
    repo.search_ingredients(prefix.map(str::trim).unwrap_or_default())?
        .into_iter()
        .map(IngredientView::try_from)
        .collect()
}

pub fn get_ingredient<R: Repository + ?Sized>(repo: &R, id: i64) -> Result<IngredientView> {
    repo.ingredient_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("Ingredient {}", id)))
        .and_then(IngredientView::try_from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::Fixture;

    #[test]
    fn test_create_tag() {
        let fx = Fixture::new();
        let tag = create_tag(&fx.repo(), "Breakfast", "#e26c2d", "breakfast").unwrap();
        assert_eq!(tag.color, "#E26C2D");
        assert_eq!(get_tag(&fx.repo(), tag.id).unwrap(), tag);
        assert_eq!(list_tags(&fx.repo()).unwrap(), vec![tag]);
    }

    #[test]
    fn test_tag_validation() {
        let fx = Fixture::new();
        for color in ["red", "#12345", "#GGGGGG", "E26C2D"] {
            assert!(matches!(
                create_tag(&fx.repo(), "Lunch", color, "lunch"),
                Err(Error::Validation { .. })
            ));
        }
        assert!(matches!(
            create_tag(&fx.repo(), "Lunch", "#49B64E", "lunch time"),
            Err(Error::Validation { .. })
        ));

        create_tag(&fx.repo(), "Lunch", "#49B64E", "lunch").unwrap();
        assert!(matches!(
            create_tag(&fx.repo(), "Brunch", "#49b64e", "brunch"),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(get_tag(&fx.repo(), 99), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_ingredients() {
        let fx = Fixture::new();
        let sugar = create_ingredient(&fx.repo(), "Sugar", "g").unwrap();
        create_ingredient(&fx.repo(), "salt", "g").unwrap();
        create_ingredient(&fx.repo(), "Butter", "g").unwrap();

        assert!(matches!(
            create_ingredient(&fx.repo(), "Sugar", "g"),
            Err(Error::Conflict(_))
        ));
        create_ingredient(&fx.repo(), "Sugar", "tbsp").unwrap();

        let found = search_ingredients(&fx.repo(), Some("S")).unwrap();
        let names: Vec<_> = found.iter().map(|i| (i.name.as_str(), i.measurement_unit.as_str())).collect();
        assert_eq!(names, vec![("salt", "g"), ("Sugar", "g"), ("Sugar", "tbsp")]);

        assert_eq!(search_ingredients(&fx.repo(), None).unwrap().len(), 4);
        assert_eq!(get_ingredient(&fx.repo(), sugar.id).unwrap(), sugar);
        assert!(matches!(get_ingredient(&fx.repo(), 99), Err(Error::NotFound(_))));
    }
}
