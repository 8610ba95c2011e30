// src/pagination.rs

//! Page-number pagination
//!
//! Listings take `page` (1-based) and `limit`. A missing or non-positive
//! `limit` falls back to the configured page size and anything above the
//! maximum is capped. Asking for a page past the last one is `NotFound`;
//! page 1 of an empty listing is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 10;

/// Page size limits, normally read from the `[pagination]` config section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: i64,
    pub max_page_size: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    /// Clamp a requested size to `1..=max_page_size`, defaulting to `page_size`
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(limit) if limit > 0 => limit.min(self.max_page_size),
            _ => self.page_size,
        }
    }
}

/// Raw `page`/`limit` values from a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Resolve against the limits: (page number, page size)
    pub fn resolve(&self, config: &PaginationConfig) -> Result<(i64, i64)> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(Error::NotFound(format!("Page {}", page)));
        }
        Ok((page, config.clamp_limit(self.limit)))
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Total items across all pages
    pub count: i64,
    pub page: i64,
    pub limit: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Paginate `count` items, fetching the requested slice with `fetch(limit, offset)`
    pub fn fetch<F>(request: &PageRequest, config: &PaginationConfig, count: i64, fetch: F) -> Result<Self>
    where
        F: FnOnce(i64, i64) -> Result<Vec<T>>,
    {
        let (page, limit) = request.resolve(config)?;
        let offset = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(limit))
            .filter(|&offset| page == 1 || offset < count)
            .ok_or_else(|| Error::NotFound(format!("Page {}", page)))?;

        let items = fetch(limit, offset)?;
        Ok(Self {
            count,
            page,
            limit,
            items,
        })
    }

    pub fn has_next(&self) -> bool {
        self.page
            .checked_mul(self.limit)
            .is_some_and(|seen| seen < self.count)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Convert every item, keeping the page metadata
    pub fn try_map<U, F>(self, f: F) -> Result<Page<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        Ok(Page {
            count: self.count,
            page: self.page,
            limit: self.limit,
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>>>()?,
        })
    }
}
