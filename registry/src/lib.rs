//! # Slug Registry
//!
//! Client-side synchronized slug registry.
//!
//! [`SlugRegistry`] keeps an in-memory, observable snapshot of the signed-in
//! user's slugs in step with the backend:
//!
//! - the session changes owner → one full resync replaces the snapshot
//! - `add` waits for the backend and appends the confirmed record
//! - `update` / `remove` apply locally at once and write in the background;
//!   a failed write schedules a reconciling resync
//!
//! [`RedirectResolver`] is the separate, unauthenticated read path used to
//! turn a slug into its redirect target.
//!
//! Internally the registry is a [`SlugReducer`] driven by the generic
//! [`Store`](slug_registry_runtime::Store) runtime.

pub mod reducer;
pub mod registry;
pub mod resolver;
pub mod types;

pub use reducer::{SlugEnvironment, SlugReducer};
pub use registry::{RegistryConfig, RegistryError, SlugRegistry};
pub use resolver::{RedirectResolver, RedirectTarget, ResolveError};
pub use slug_registry_runtime::Subscription;
pub use types::{Mutation, SlugAction, SlugState, SyncPhase};
