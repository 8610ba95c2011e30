// src/service/subscriptions.rs

//! Following authors
//!
//! A subscription list entry shows the author, how many recipes they have
//! published and a few of their latest recipes. That preview is limited by
//! `recipes_limit` on its own, independently of the outer page.

use super::{RecipeShortView, UserView, stored_id};
use crate::auth::Viewer;
use crate::db::models::User;
use crate::error::{Error, Result};
use crate::media::MediaStore;
use crate::pagination::{Page, PageRequest, PaginationConfig};
use crate::repository::Repository;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<RecipeShortView>,
    pub recipes_count: i64,
}

fn author<R: Repository + ?Sized>(repo: &R, author_id: i64) -> Result<User> {
    repo.user_by_id(author_id)?
        .ok_or_else(|| Error::NotFound(format!("User {}", author_id)))
}

fn render<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    author: User,
    recipes_limit: i64,
) -> Result<SubscriptionView> {
    let author_id = stored_id(author.id, "User")?;
    let recipes = repo
        .recent_recipes_by_author(author_id, recipes_limit)?
        .into_iter()
        .map(|recipe| RecipeShortView::new(media, recipe))
        .collect::<Result<Vec<_>>>()?;

    Ok(SubscriptionView {
        author: UserView::new(author_id, author, true),
        recipes,
        recipes_count: repo.count_recipes_by_author(author_id)?,
    })
}

/// Follow `author_id`
///
/// Following yourself or following twice is a `Conflict`.
pub fn subscribe<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    author_id: i64,
    recipes_limit: Option<i64>,
    config: &PaginationConfig,
) -> Result<SubscriptionView> {
    let user_id = viewer.require_id()?;
    let author = author(repo, author_id)?;

    if user_id == author_id {
        return Err(Error::Conflict("cannot subscribe to yourself".to_string()));
    }
    repo.subscribe(user_id, author_id)?;

    info!("User {} subscribed to {}", user_id, author_id);
    render(repo, media, author, config.clamp_limit(recipes_limit))
}

/// Stop following `author_id`; succeeds if not subscribed
pub fn unsubscribe<R: Repository + ?Sized>(repo: &R, viewer: &Viewer, author_id: i64) -> Result<()> {
    let user_id = viewer.require_id()?;
    author(repo, author_id)?;

    if repo.unsubscribe(user_id, author_id)? {
        info!("User {} unsubscribed from {}", user_id, author_id);
    }
    Ok(())
}

/// Authors the viewer follows, ordered by ID
pub fn list_subscriptions<R: Repository + ?Sized>(
    repo: &R,
    media: &MediaStore,
    viewer: &Viewer,
    page: &PageRequest,
    recipes_limit: Option<i64>,
    config: &PaginationConfig,
) -> Result<Page<SubscriptionView>> {
    let user_id = viewer.require_id()?;
    let recipes_limit = config.clamp_limit(recipes_limit);

    let count = repo.count_subscribed_authors(user_id)?;
    Page::fetch(page, config, count, |limit, offset| {
        repo.subscribed_authors(user_id, limit, offset)
    })?
    .try_map(|author| render(repo, media, author, recipes_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::recipes::{self, IngredientInput, RecipeCreate};
    use crate::service::test_support::{Fixture, png_data_url};

    fn publish(fx: &Fixture, viewer: &Viewer, count: usize) {
        let flour = fx.ingredient(&format!("flour-{}", viewer.user_id().unwrap()), "g");
        for n in 0..count {
            let name = format!("{}-recipe-{}", viewer.user_id().unwrap(), n);
            let input = RecipeCreate {
                ingredients: vec![IngredientInput { id: flour, amount: 1 }],
                tags: vec![],
                image: png_data_url(&name),
                name,
                text: "text".to_string(),
                cooking_time: 1,
            };
            recipes::create_recipe(&fx.repo(), &fx.media, viewer, input).unwrap();
        }
    }

    #[test]
    fn test_subscribe_rules() {
        let fx = Fixture::new();
        let config = PaginationConfig::default();
        let reader = fx.user("reader");
        let author = fx.user("author");
        let author_id = author.user_id().unwrap();

        let view = subscribe(&fx.repo(), &fx.media, &reader, author_id, None, &config).unwrap();
        assert_eq!(view.author.username, "author");
        assert!(view.author.is_subscribed);
        assert_eq!(view.recipes_count, 0);

        let again = subscribe(&fx.repo(), &fx.media, &reader, author_id, None, &config);
        assert!(matches!(again, Err(Error::Conflict(_))));

        let reader_id = reader.user_id().unwrap();
        let own = subscribe(&fx.repo(), &fx.media, &reader, reader_id, None, &config);
        assert!(matches!(own, Err(Error::Conflict(_))));

        let missing = subscribe(&fx.repo(), &fx.media, &reader, 999, None, &config);
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let fx = Fixture::new();
        let config = PaginationConfig::default();
        let reader = fx.user("reader");
        let author_id = fx.user("author").user_id().unwrap();

        subscribe(&fx.repo(), &fx.media, &reader, author_id, None, &config).unwrap();
        unsubscribe(&fx.repo(), &reader, author_id).unwrap();
        unsubscribe(&fx.repo(), &reader, author_id).unwrap();

        let page =
            list_subscriptions(&fx.repo(), &fx.media, &reader, &PageRequest::default(), None, &config)
                .unwrap();
        assert_eq!(page.count, 0);
    }

    #[test]
    fn test_list_limits_recipes_independently() {
        let fx = Fixture::new();
        let config = PaginationConfig::default();
        let reader = fx.user("reader");
        let prolific = fx.user("prolific");
        let quiet = fx.user("quiet");
        publish(&fx, &prolific, 12);
        publish(&fx, &quiet, 1);

        for author in [&prolific, &quiet] {
            subscribe(&fx.repo(), &fx.media, &reader, author.user_id().unwrap(), None, &config)
                .unwrap();
        }

        let page = list_subscriptions(
            &fx.repo(),
            &fx.media,
            &reader,
            &PageRequest::default(),
            Some(3),
            &config,
        )
        .unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.items[0].author.username, "prolific");
        assert_eq!(page.items[0].recipes.len(), 3);
        assert_eq!(page.items[0].recipes_count, 12);
        assert_eq!(page.items[1].recipes.len(), 1);

        // Default preview size is the page size, capped at the maximum
        let page =
            list_subscriptions(&fx.repo(), &fx.media, &reader, &PageRequest::default(), None, &config)
                .unwrap();
        assert_eq!(page.items[0].recipes.len(), 6);
        let page = list_subscriptions(
            &fx.repo(),
            &fx.media,
            &reader,
            &PageRequest::default(),
            Some(100),
            &config,
        )
        .unwrap();
        assert_eq!(page.items[0].recipes.len(), 10);
    }

    #[test]
    fn test_requires_auth() {
        let fx = Fixture::new();
        let config = PaginationConfig::default();
        let result = list_subscriptions(
            &fx.repo(),
            &fx.media,
            &Viewer::Anonymous,
            &PageRequest::default(),
            None,
            &config,
        );
        assert!(matches!(result, Err(Error::Unauthenticated)));
    }
}
