//! HTTP redirect front end for the slug registry.
//!
//! A thin imperative shell around [`RedirectResolver`](slug_registry::RedirectResolver):
//!
//! | Route | Response |
//! |---|---|
//! | `GET /health` | `200 ok` |
//! | `GET /{slug}` | `301` + `Location`, or `404` JSON error |
//!
//! # Example
//!
//! ```ignore
//! use slug_registry_web::{app, AppState};
//!
//! let state = AppState::new(Arc::new(RedirectResolver::new(api)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app(state)).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{routing::get, Router};

pub use config::ServerConfig;
pub use error::AppError;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Build the front end router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/:slug", get(handlers::follow_slug))
        .with_state(state)
}
