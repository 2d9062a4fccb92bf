//! HTTP client for the slug backend.
//!
//! Implements [`slug_registry_core::SlugApi`] over the backend's REST surface:
//!
//! | Operation | Request |
//! |---|---|
//! | list | `GET /slugs?userid=<owner>` |
//! | create | `POST /slugs` with `{slug, redirect, uid}` |
//! | update | `PUT /slugs` with `{id, slug, redirect, uid}` |
//! | delete | `DELETE /slugs?userid=<owner>&id=<id>` |
//! | resolve | `GET /slug?slug=<slug>` |
//!
//! # Example
//!
//! ```no_run
//! use slug_registry_client::HttpSlugApi;
//! use slug_registry_core::{OwnerId, SlugApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpSlugApi::from_env()?;
//! let slugs = api.list(OwnerId::new("alice")).await?;
//! println!("{} slugs", slugs.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod wire;

pub use client::HttpSlugApi;
pub use config::{ClientConfig, ConfigError};
