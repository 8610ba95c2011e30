// src/error.rs

//! Error types for Foodgram
//!
//! One taxonomy is shared by the data layer and the services: validation,
//! not-found, conflict, permission and authentication failures, plus the
//! wrapped storage and I/O errors. The HTTP layer maps each variant to a
//! status code.

use thiserror::Error;

/// Errors produced by the Foodgram library
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem failure (media storage, database directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected input, attributed to a field of the request
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Duplicate row or disallowed relationship
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authenticated, but not allowed to touch this resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The operation needs an authenticated viewer
    #[error("Authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// Email/password pair did not match
    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    /// Inline image payload could not be decoded
    #[error("Invalid image: {0}")]
    Image(String),

    /// Database or storage could not be initialized
    #[error("Initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Build a validation error for `field`
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = Error::validation("cooking_time", "must be at least 1");
        assert_eq!(err.to_string(), "Invalid cooking_time: must be at least 1");
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound("recipe 7".to_string());
        assert_eq!(err.to_string(), "recipe 7 not found");
    }
}
