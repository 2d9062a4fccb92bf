//! Remote slug API contract.
//!
//! The [`SlugApi`] trait is the only way the registry talks to the backend
//! that owns durable slug storage. Implementations are stateless request
//! translators:
//!
//! - `HttpSlugApi` (in `slug-registry-client`): production HTTP implementation
//! - `InMemorySlugApi` (in `slug-registry-testing`): deterministic test double
//!
//! # Dyn Compatibility
//!
//! Methods return explicit `Pin<Box<dyn Future>>` values instead of using
//! `async fn` so the registry can hold an `Arc<dyn SlugApi>` and move it into
//! effects.

use crate::slug::{NewSlug, OwnerId, SlugId, SlugRecord};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by every [`SlugApi`] operation
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Errors that can occur when talking to the slug backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network, DNS or timeout failure; no usable response arrived
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Response was not JSON or had the wrong shape (e.g. list body not an array)
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No record matches the requested slug
    #[error("Slug not found: {0}")]
    NotFound(String),

    /// Backend answered with a non-success status
    #[error("Server rejected request (status {status}): {body}")]
    ServerRejected {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },
}

impl ApiError {
    /// Short, stable label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TransportFailure(_) => "transport_failure",
            Self::MalformedResponse(_) => "malformed_response",
            Self::NotFound(_) => "not_found",
            Self::ServerRejected { .. } => "server_rejected",
        }
    }
}

/// Operations the backend exposes for slug management and resolution.
///
/// Owner-scoped operations take the owner explicitly; implementations must
/// not cache identity or any records between calls.
pub trait SlugApi: Send + Sync {
    /// Fetch every record owned by `owner`, in backend order.
    ///
    /// # Errors
    ///
    /// - `TransportFailure`: the request never completed
    /// - `MalformedResponse`: the body was not a JSON array of records
    /// - `ServerRejected`: non-success status
    fn list(&self, owner: OwnerId) -> ApiFuture<'_, Vec<SlugRecord>>;

    /// Create a record; the backend assigns its `id`.
    ///
    /// The returned record is authoritative.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] other than `NotFound`.
    fn create(&self, owner: OwnerId, slug: NewSlug) -> ApiFuture<'_, SlugRecord>;

    /// Replace the record identified by `record.id`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] other than `NotFound`.
    fn update(&self, owner: OwnerId, record: SlugRecord) -> ApiFuture<'_, ()>;

    /// Delete a single record.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] other than `NotFound`.
    fn delete(&self, owner: OwnerId, id: SlugId) -> ApiFuture<'_, ()>;

    /// Unauthenticated lookup of the redirect target for `slug`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record matches, otherwise any transport or
    /// response error.
    fn resolve(&self, slug: String) -> ApiFuture<'_, String>;
}
