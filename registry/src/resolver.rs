//! Public slug → redirect lookup.
//!
//! Independent of the owner-scoped store: any visitor can resolve any slug.

use slug_registry_core::{ApiError, SlugApi};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`RedirectResolver::resolve`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No usable redirect exists; `cause` is the backend failure, if any
    #[error("No redirect for slug '{slug}'")]
    NotFound {
        /// Requested slug
        slug: String,
        /// Backend error behind the miss
        cause: Option<ApiError>,
    },

    /// The slug is blank and was never sent to the backend
    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),
}

/// Where a slug points
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// Target as a string, suitable for a `Location` header
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves slugs through the backend
#[derive(Clone)]
pub struct RedirectResolver {
    api: Arc<dyn SlugApi>,
}

impl RedirectResolver {
    /// Resolve through `api`
    #[must_use]
    pub fn new(api: Arc<dyn SlugApi>) -> Self {
        Self { api }
    }

    /// Look up where `slug` redirects to
    ///
    /// Every backend failure is reported as [`ResolveError::NotFound`] so
    /// callers never redirect to an undefined location.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::InvalidSlug`]: `slug` is empty or whitespace
    /// - [`ResolveError::NotFound`]: unknown slug, the backend failed, or the
    ///   stored redirect contains control characters
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, slug: &str) -> Result<RedirectTarget, ResolveError> {
        if slug.trim().is_empty() {
            metrics::counter!("resolver.lookups", "outcome" => "invalid").increment(1);
            return Err(ResolveError::InvalidSlug(slug.to_string()));
        }

        match self.api.resolve(slug.to_string()).await {
            Ok(redirect) if redirect.trim().is_empty() => {
                metrics::counter!("resolver.lookups", "outcome" => "miss").increment(1);
                Err(ResolveError::NotFound {
                    slug: slug.to_string(),
                    cause: None,
                })
            },
            // Not representable as a `Location` header.
            Ok(redirect) if redirect.chars().any(char::is_control) => {
                tracing::warn!(redirect = ?redirect, "Redirect contains control characters, treating as not found");
                metrics::counter!("resolver.lookups", "outcome" => "error").increment(1);
                Err(ResolveError::NotFound {
                    slug: slug.to_string(),
                    cause: Some(ApiError::MalformedResponse(format!(
                        "redirect for '{slug}' contains control characters"
                    ))),
                })
            },
            Ok(redirect) => {
                tracing::debug!(%redirect, "Resolved");
                metrics::counter!("resolver.lookups", "outcome" => "hit").increment(1);
                Ok(RedirectTarget(redirect))
            },
            Err(ApiError::NotFound(_)) => {
                tracing::debug!("Unknown slug");
                metrics::counter!("resolver.lookups", "outcome" => "miss").increment(1);
                Err(ResolveError::NotFound {
                    slug: slug.to_string(),
                    cause: None,
                })
            },
            Err(error) => {
                tracing::warn!(kind = error.kind(), %error, "Resolve failed, treating as not found");
                metrics::counter!("resolver.lookups", "outcome" => "error").increment(1);
                Err(ResolveError::NotFound {
                    slug: slug.to_string(),
                    cause: Some(error),
                })
            },
        }
    }
}

impl fmt::Debug for RedirectResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use slug_registry_core::OwnerId;
    use slug_registry_testing::{ApiOperation, InMemorySlugApi};

    fn resolver_with(api: &InMemorySlugApi) -> RedirectResolver {
        RedirectResolver::new(Arc::new(api.clone()))
    }

    #[tokio::test]
    async fn resolves_known_slug() {
        let api = InMemorySlugApi::new();
        api.seed(&OwnerId::new("alice"), "apple-macbook-pro", "/products/apple-macbook-pro");

        let target = resolver_with(&api).resolve("apple-macbook-pro").await.unwrap();
        assert_eq!(target.as_str(), "/products/apple-macbook-pro");
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let api = InMemorySlugApi::new();
        let err = resolver_with(&api).resolve("does-not-exist").await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                slug: "does-not-exist".into(),
                cause: None,
            }
        );
    }

    #[tokio::test]
    async fn transport_failure_is_not_found_with_cause() {
        let api = InMemorySlugApi::new();
        api.fail(ApiOperation::Resolve, ApiError::TransportFailure("refused".into()));

        let err = resolver_with(&api).resolve("anything").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound {
                cause: Some(ApiError::TransportFailure(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn redirect_with_line_break_is_not_found() {
        let api = InMemorySlugApi::new();
        api.seed(&OwnerId::new("alice"), "bad", "https://example.com/\r\nSet-Cookie: x=1");

        let err = resolver_with(&api).resolve("bad").await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound {
                cause: Some(ApiError::MalformedResponse(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn blank_slug_never_reaches_backend() {
        let api = InMemorySlugApi::new();
        let err = resolver_with(&api).resolve("  ").await.unwrap_err();

        assert_eq!(err, ResolveError::InvalidSlug("  ".into()));
        assert_eq!(api.call_count(ApiOperation::Resolve), 0);
    }
}
