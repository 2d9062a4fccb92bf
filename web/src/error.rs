//! Error responses for the redirect front end.
//!
//! [`AppError`] bridges resolver failures and HTTP responses: every error
//! becomes a JSON body `{"code": ..., "message": ...}` with a matching
//! status. Server errors are logged with their internal source.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use slug_registry::ResolveError;
use std::fmt;

/// Application error type for handlers
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    /// User-facing message
    message: String,
    /// Stable code for clients
    code: &'static str,
    /// Internal cause, logged but never sent
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create an error with an explicit status and code
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the internal cause
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 404 for a slug with no usable redirect
    #[must_use]
    pub fn slug_not_found(slug: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("No redirect found for '{slug}'"),
        )
    }

    /// HTTP status this error maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Any resolve failure is a 404; the backend cause is kept for logs.
impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        let slug = match &err {
            ResolveError::NotFound { slug, .. } | ResolveError::InvalidSlug(slug) => slug.clone(),
        };
        Self::slug_not_found(&slug).with_source(err)
    }
}
