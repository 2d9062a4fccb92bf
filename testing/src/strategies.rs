//! Proptest strategies for slug data

use proptest::prelude::*;
use slug_registry_core::NewSlug;

/// A URL-safe slug such as `spring-sale-2`
pub fn slug_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

/// A site-relative or absolute redirect target
pub fn redirect_target() -> impl Strategy<Value = String> {
    prop_oneof![
        "/[a-z0-9/-]{1,24}",
        "https://[a-z]{3,10}\\.(com|io|dev)/[a-z0-9-]{0,12}",
    ]
}

/// An unconfirmed slug
pub fn new_slug() -> impl Strategy<Value = NewSlug> {
    (slug_name(), redirect_target()).prop_map(|(slug, redirect)| NewSlug::new(slug, redirect))
}

/// Mutations a user can make against a registry
#[derive(Clone, Debug)]
pub enum Mutation {
    /// Create a new slug
    Add(NewSlug),
    /// Change the redirect of the n-th known record (modulo the count)
    Update {
        /// Index into the current snapshot
        index: usize,
        /// New target
        redirect: String,
    },
    /// Remove the n-th known record (modulo the count)
    Remove {
        /// Index into the current snapshot
        index: usize,
    },
}

/// A random mutation
pub fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        3 => new_slug().prop_map(Mutation::Add),
        2 => (any::<usize>(), redirect_target())
            .prop_map(|(index, redirect)| Mutation::Update { index, redirect }),
        1 => any::<usize>().prop_map(|index| Mutation::Remove { index }),
    ]
}
