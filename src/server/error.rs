// src/server/error.rs
//! RFC 7807 problem responses
//!
//! Every API error is rendered as `application/problem+json`. Library
//! errors map onto status codes here and nowhere else.

use crate::error::Error;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Problem details body
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    /// Error type URI
    #[serde(rename = "type")]
    pub error_type: String,
    /// Human-readable title
    pub title: String,
    /// HTTP status code
    pub status: u16,
    /// Detailed description
    pub detail: String,
    /// Instance URI (the request that caused the error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Additional error-specific data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl ProblemDetails {
    pub fn new(error_type: &str, title: &str, status: u16, detail: &str) -> Self {
        Self {
            error_type: format!("urn:foodgram:error:{}", error_type),
            title: title.to_string(),
            status,
            detail: detail.to_string(),
            instance: None,
            extensions: None,
        }
    }

    pub fn bad_request(detail: &str) -> Self {
        Self::new("bad_request", "Bad Request", 400, detail)
    }

    pub fn unauthorized(detail: &str) -> Self {
        Self::new("unauthorized", "Unauthorized", 401, detail)
    }

    pub fn forbidden(detail: &str) -> Self {
        Self::new("forbidden", "Forbidden", 403, detail)
    }

    pub fn not_found(detail: &str) -> Self {
        Self::new("not_found", "Not Found", 404, detail)
    }

    pub fn conflict(detail: &str) -> Self {
        Self::new("conflict", "Conflict", 409, detail)
    }

    pub fn internal(detail: &str) -> Self {
        Self::new("internal", "Internal Error", 500, detail)
    }

    /// Set the instance URI
    pub fn with_instance(mut self, instance: String) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Add extensions
    pub fn with_extensions(mut self, extensions: serde_json::Value) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

/// Error response wrapper for RFC 7807 format
#[derive(Debug)]
pub struct ApiError(pub ProblemDetails);

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn internal(detail: &str) -> Self {
        tracing::error!("{}", detail);
        Self(ProblemDetails::internal("Internal server error"))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ProblemDetails> for ApiError {
    fn from(problem: ProblemDetails) -> Self {
        Self(problem)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let detail = err.to_string();
        match err {
            Error::Validation { field, message } => Self(
                ProblemDetails::new("validation", "Validation Error", 400, &detail)
                    .with_extensions(serde_json::json!({ "field": field, "message": message })),
            ),
            Error::Image(_) => Self(
                ProblemDetails::new("validation", "Validation Error", 400, &detail)
                    .with_extensions(serde_json::json!({ "field": "image" })),
            ),
            Error::Unauthenticated | Error::InvalidCredentials => {
                Self(ProblemDetails::unauthorized(&detail))
            }
            Error::PermissionDenied(_) => Self(ProblemDetails::forbidden(&detail)),
            Error::NotFound(_) => Self(ProblemDetails::not_found(&detail)),
            Error::Conflict(_) => Self(ProblemDetails::conflict(&detail)),
            Error::Database(_) | Error::Io(_) | Error::InitError(_) => Self::internal(&detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ProblemDetails::bad_request(&rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ProblemDetails::bad_request(&rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ProblemDetails::not_found(&rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(&self.0)).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::validation("name", "blank"), 400),
            (Error::Image("bad".into()), 400),
            (Error::Unauthenticated, 401),
            (Error::InvalidCredentials, 401),
            (Error::PermissionDenied("no".into()), 403),
            (Error::NotFound("Recipe 1".into()), 404),
            (Error::Conflict("dup".into()), 409),
            (Error::InitError("boom".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).0.status, status);
        }
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = ApiError::from(Error::InitError("secret path /etc/x".into()));
        assert!(!err.0.detail.contains("/etc/x"));
    }

    #[test]
    fn test_problem_serialization() {
        let problem = ProblemDetails::not_found("Recipe 7 not found");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["type"], "urn:foodgram:error:not_found");
        assert_eq!(json["status"], 404);
        assert!(json.get("instance").is_none());
    }

    #[test]
    fn test_response_headers() {
        let response = ApiError::from(Error::Unauthenticated).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/problem+json"
        );
        assert!(response.headers().contains_key(axum::http::header::WWW_AUTHENTICATE));
    }
}
