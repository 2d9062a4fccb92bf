//! # Slug Registry Testing
//!
//! Testing utilities for the slug registry.
//!
//! This crate provides:
//! - [`InMemorySlugApi`]: backend double with call log, failure injection and gates
//! - [`ManualSession`]: session observer driven by the test
//! - [`ReducerScenario`]: Given/When/Then harness for reducers
//! - [`strategies`]: proptest strategies for slugs and mutations
//! - [`fixtures`]: small constructors for common values
//!
//! ## Example
//!
//! ```ignore
//! use slug_registry_testing::{InMemorySlugApi, ManualSession};
//!
//! #[tokio::test]
//! async fn loads_for_signed_in_user() {
//!     let api = InMemorySlugApi::new();
//!     api.seed(&OwnerId::new("alice"), "docs", "https://docs.rs");
//!
//!     let registry = SlugRegistry::init(Arc::new(api), Arc::new(ManualSession::signed_in("alice"))).await;
//!     registry.settled().await;
//!     assert_eq!(registry.snapshot().await.len(), 1);
//! }
//! ```

pub mod backend;
pub mod scenario;
pub mod session;
pub mod strategies;

pub use backend::{ApiCall, ApiOperation, InMemorySlugApi};
pub use scenario::{assertions, ReducerScenario};
pub use session::ManualSession;

/// Small constructors for values tests use over and over
pub mod fixtures {
    use slug_registry_core::{NewSlug, OwnerId, SlugRecord, UserIdentity};

    /// A confirmed record
    #[must_use]
    pub fn record(id: &str, slug: &str, redirect: &str) -> SlugRecord {
        SlugRecord::new(id, slug, redirect)
    }

    /// An unconfirmed slug
    #[must_use]
    pub fn new_slug(slug: &str, redirect: &str) -> NewSlug {
        NewSlug::new(slug, redirect)
    }

    /// A signed-in identity
    #[must_use]
    pub fn user(uid: &str) -> UserIdentity {
        UserIdentity::new(uid)
    }

    /// An owner id
    #[must_use]
    pub fn owner(uid: &str) -> OwnerId {
        OwnerId::new(uid)
    }
}

/// Install a test-friendly tracing subscriber
///
/// Output goes through the test harness capture and honours `RUST_LOG`.
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
