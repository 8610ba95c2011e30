// src/service/users.rs

//! Accounts, tokens and user profiles

use super::{UserView, require_text, stored_id};
use crate::auth::{self, Viewer};
use crate::db::models::User;
use crate::error::{Error, Result};
use crate::pagination::{Page, PageRequest, PaginationConfig};
use crate::repository::Repository;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::info;

pub const MAX_NAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PASSWORD_LEN: usize = 128;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid")
});

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn validate_email(email: &str) -> Result<String> {
    let email = require_text("email", email, MAX_EMAIL_LEN)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(Error::validation("email", "enter a valid email address")),
    }
}

fn validate_username(username: &str) -> Result<String> {
    let username = require_text("username", username, MAX_NAME_LEN)?;
    if !USERNAME_RE.is_match(&username) {
        return Err(Error::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(username)
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("password", "this field may not be blank"));
    }
    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("ensure this field has no more than {} characters", MAX_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Create an account
///
/// A taken email or username is a validation error on that field.
pub fn register<R: Repository + ?Sized>(repo: &R, input: UserCreate) -> Result<UserView> {
    let email = validate_email(&input.email)?;
    let username = validate_username(&input.username)?;
    let first_name = require_text("first_name", &input.first_name, MAX_NAME_LEN)?;
    let last_name = require_text("last_name", &input.last_name, MAX_NAME_LEN)?;
    validate_password(&input.password)?;

    if repo.user_by_email(&email)?.is_some() {
        return Err(Error::validation("email", "a user with this email already exists"));
    }
    if repo.user_by_username(&username)?.is_some() {
        return Err(Error::validation("username", "a user with this username already exists"));
    }

    let mut user = User::new(
        email,
        username,
        first_name,
        last_name,
        auth::hash_password(&input.password),
    );
    let id = repo.insert_user(&mut user)?;

    info!("Registered user {} ({})", id, user.username);
    Ok(UserView::new(id, user, false))
}

/// Exchange email and password for the user's API token
///
/// The token is created on first login and reused afterwards.
pub fn login<R: Repository + ?Sized>(repo: &R, email: &str, password: &str) -> Result<String> {
    let user = repo
        .user_by_email(email.trim())?
        .filter(|user| auth::verify_password(password, &user.password_hash))
        .ok_or(Error::InvalidCredentials)?;
    let user_id = stored_id(user.id, "User")?;

    if let Some(token) = repo.token_for_user(user_id)? {
        return Ok(token.key);
    }
    issue_token(repo, user_id)
}

/// Create the user's token; if a concurrent login got there first, use its key
fn issue_token<R: Repository + ?Sized>(repo: &R, user_id: i64) -> Result<String> {
    match repo.insert_token(&auth::generate_token(), user_id) {
        Ok(token) => {
            info!("Issued token for user {}", user_id);
            Ok(token.key)
        }
        Err(Error::Conflict(reason)) => repo
            .token_for_user(user_id)?
            .map(|token| token.key)
            .ok_or(Error::Conflict(reason)),
        Err(e) => Err(e),
    }
}

/// Revoke the viewer's token
pub fn logout<R: Repository + ?Sized>(repo: &R, viewer: &Viewer) -> Result<()> {
    let user_id = viewer.require_id()?;
    repo.delete_token(user_id)?;
    info!("User {} logged out", user_id);
    Ok(())
}

/// Resolve a token into a viewer; an unknown token is `Unauthenticated`
pub fn authenticate<R: Repository + ?Sized>(repo: &R, token: &str) -> Result<Viewer> {
    repo.user_by_token(token)?
        .map(Viewer::User)
        .ok_or(Error::Unauthenticated)
}

pub fn get_user<R: Repository + ?Sized>(repo: &R, viewer: &Viewer, id: i64) -> Result<UserView> {
    let user = repo
        .user_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("User {}", id)))?;
    UserView::for_viewer(repo, viewer, user)
}

/// The viewer's own profile
pub fn me<R: Repository + ?Sized>(repo: &R, viewer: &Viewer) -> Result<UserView> {
    let user = viewer.require_user()?;
    UserView::for_viewer(repo, viewer, user.clone())
}

/// All users, ordered by ID
pub fn list_users<R: Repository + ?Sized>(
    repo: &R,
    viewer: &Viewer,
    page: &PageRequest,
    config: &PaginationConfig,
) -> Result<Page<UserView>> {
    let count = repo.count_users()?;
    Page::fetch(page, config, count, |limit, offset| repo.list_users(limit, offset))?
        .try_map(|user| UserView::for_viewer(repo, viewer, user))
}

/// Change the viewer's password after checking the current one
pub fn set_password<R: Repository + ?Sized>(
    repo: &R,
    viewer: &Viewer,
    current_password: &str,
    new_password: &str,
) -> Result<()> {
    let user = viewer.require_user()?;
    let user_id = stored_id(user.id, "User")?;

    if !auth::verify_password(current_password, &user.password_hash) {
        return Err(Error::validation("current_password", "invalid password"));
    }
    validate_password(new_password)?;

    repo.set_password_hash(user_id, &auth::hash_password(new_password))?;
    info!("User {} changed password", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{SubscriptionRepository, TokenRepository};
    use crate::service::test_support::Fixture;

    fn input(email: &str, username: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Vasya".to_string(),
            last_name: "Pupkin".to_string(),
            password: "Qwerty123".to_string(),
        }
    }

    #[test]
    fn test_register_and_login() {
        let fx = Fixture::new();
        let view = register(&fx.repo(), input("vasya@example.com", "vasya.pupkin")).unwrap();
        assert_eq!(view.username, "vasya.pupkin");
        assert!(!view.is_subscribed);

        let token = login(&fx.repo(), "vasya@example.com", "Qwerty123").unwrap();
        assert_eq!(token.len(), 40);
        assert_eq!(login(&fx.repo(), "vasya@example.com", "Qwerty123").unwrap(), token);

        let viewer = authenticate(&fx.repo(), &token).unwrap();
        assert_eq!(viewer.user_id(), Some(view.id));

        logout(&fx.repo(), &viewer).unwrap();
        assert!(matches!(authenticate(&fx.repo(), &token), Err(Error::Unauthenticated)));
    }

    #[test]
    fn test_token_issued_concurrently_is_reused() {
        let fx = Fixture::new();
        let view = register(&fx.repo(), input("race@example.com", "racer")).unwrap();

        let existing = fx.repo().insert_token("0123456789abcdef", view.id).unwrap();
        assert_eq!(issue_token(&fx.repo(), view.id).unwrap(), existing.key);
        assert_eq!(
            login(&fx.repo(), "race@example.com", "Qwerty123").unwrap(),
            existing.key
        );
    }

    #[test]
    fn test_bad_credentials() {
        let fx = Fixture::new();
        register(&fx.repo(), input("a@example.com", "a")).unwrap();

        assert!(matches!(
            login(&fx.repo(), "a@example.com", "wrong"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            login(&fx.repo(), "nobody@example.com", "Qwerty123"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_register_validation() {
        let fx = Fixture::new();
        register(&fx.repo(), input("taken@example.com", "taken")).unwrap();

        let cases = [
            input("taken@example.com", "fresh"),
            input("fresh@example.com", "taken"),
            input("not-an-email", "user1"),
            input("x@example.com", "bad name!"),
            input("y@example.com", &"u".repeat(MAX_NAME_LEN + 1)),
        ];
        for case in cases {
            assert!(matches!(
                register(&fx.repo(), case),
                Err(Error::Validation { .. })
            ));
        }

        let mut blank = input("z@example.com", "zed");
        blank.first_name = "  ".to_string();
        assert!(matches!(register(&fx.repo(), blank), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_profiles_and_subscription_flag() {
        let fx = Fixture::new();
        let reader = fx.user("reader");
        let author = fx.user("author");
        let author_id = author.user_id().unwrap();

        let view = get_user(&fx.repo(), &reader, author_id).unwrap();
        assert!(!view.is_subscribed);

        fx.repo().subscribe(reader.user_id().unwrap(), author_id).unwrap();
        let view = get_user(&fx.repo(), &reader, author_id).unwrap();
        assert!(view.is_subscribed);
        let view = get_user(&fx.repo(), &Viewer::Anonymous, author_id).unwrap();
        assert!(!view.is_subscribed);

        assert_eq!(me(&fx.repo(), &reader).unwrap().username, "reader");
        assert!(matches!(me(&fx.repo(), &Viewer::Anonymous), Err(Error::Unauthenticated)));
        assert!(matches!(get_user(&fx.repo(), &reader, 999), Err(Error::NotFound(_))));

        let page = list_users(
            &fx.repo(),
            &reader,
            &PageRequest::default(),
            &PaginationConfig::default(),
        )
        .unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.items[0].username, "reader");
        assert!(page.items[1].is_subscribed);
    }

    #[test]
    fn test_set_password() {
        let fx = Fixture::new();
        let user = fx.user("cook");

        let wrong = set_password(&fx.repo(), &user, "nope", "new-secret");
        assert!(matches!(wrong, Err(Error::Validation { .. })));

        set_password(&fx.repo(), &user, "password", "new-secret").unwrap();
        assert!(login(&fx.repo(), "cook@example.com", "new-secret").is_ok());
        assert!(login(&fx.repo(), "cook@example.com", "password").is_err());
    }
}
