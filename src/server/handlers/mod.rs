// src/server/handlers/mod.rs
//! HTTP request handlers for the Foodgram API

pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use crate::error::{Error, Result};
use crate::pagination::{Page, PageRequest};
use axum::http::Uri;
use serde::Serialize;
use url::form_urlencoded;

/// Paginated list body
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    /// Relative URL of the next page
    pub next: Option<String>,
    /// Relative URL of the previous page
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wrap a page, deriving the neighbour links from the request URI
    pub fn new(page: Page<T>, uri: &Uri) -> Self {
        let next = page.has_next().then(|| page_link(uri, page.page + 1));
        let previous = page.has_previous().then(|| page_link(uri, page.page - 1));
        Self {
            count: page.count,
            next,
            previous,
            results: page.items,
        }
    }
}

/// The request URI with `page` replaced; page 1 drops the parameter
fn page_link(uri: &Uri, page: i64) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()) {
        if key != "page" {
            query.append_pair(&key, &value);
        }
    }
    if page > 1 {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    }
}

/// Decoded query string; keys may repeat (`?tags=a&tags=b`)
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn from_uri(uri: &Uri) -> Self {
        Self(
            form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// First non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Every non-empty value of `key`
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Integer value of `key`; anything unparsable is a validation error
    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        self.get(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| Error::validation(key, "a valid integer is required"))
            })
            .transpose()
    }

    /// `page` and `limit`
    ///
    /// An unparsable page is not-found; an unparsable limit falls back to
    /// the default size.
    pub fn page_request(&self) -> Result<PageRequest> {
        let page = self
            .get("page")
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::NotFound(format!("Page '{}'", value)))
            })
            .transpose()?;
        let limit = self.get("limit").and_then(|value| value.trim().parse().ok());
        Ok(PageRequest { page, limit })
    }
}
