//! Slug records and identifiers.
//!
//! A [`SlugRecord`] is the unit the registry stores: a server-assigned
//! [`SlugId`], the human-readable `slug` key and the `redirect` target.
//! The wire form is a flat JSON object with exactly those three field names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a slug record.
///
/// Opaque to the client. The registry never synthesizes one; every `SlugId`
/// in a snapshot came from a backend response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlugId(String);

impl SlugId {
    /// Wraps an identifier received from the backend
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlugId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SlugId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SlugId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identity that owns a set of slug records.
///
/// When nobody is signed in the API still needs an owner value; the
/// [`OwnerId::anonymous`] sentinel (`"-1"`) stands in for it and the backend
/// decides what, if anything, to return for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Sentinel value sent for an unauthenticated or unknown owner
    pub const ANONYMOUS: &'static str = "-1";

    /// Creates an owner id from a user identifier
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// The unauthenticated sentinel owner
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// Resolves an optional owner to a concrete one, falling back to the sentinel
    #[must_use]
    pub fn or_anonymous(owner: Option<&Self>) -> Self {
        owner.cloned().unwrap_or_else(Self::anonymous)
    }

    /// Returns `true` for the sentinel owner
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    /// Returns the owner id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A slug and the target it redirects to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugRecord {
    /// Server-assigned identifier
    pub id: SlugId,
    /// Human-readable key
    pub slug: String,
    /// Target URL
    pub redirect: String,
}

impl SlugRecord {
    /// Creates a record from its parts
    #[must_use]
    pub fn new(id: impl Into<SlugId>, slug: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            redirect: redirect.into(),
        }
    }
}

/// A slug that has not been confirmed by the backend yet (no `id`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSlug {
    /// Human-readable key
    pub slug: String,
    /// Target URL
    pub redirect: String,
}

impl NewSlug {
    /// Creates a new, unconfirmed slug
    #[must_use]
    pub fn new(slug: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            redirect: redirect.into(),
        }
    }

    /// Attaches the identifier assigned by the backend
    #[must_use]
    pub fn confirm(self, id: SlugId) -> SlugRecord {
        SlugRecord {
            id,
            slug: self.slug,
            redirect: self.redirect,
        }
    }
}
