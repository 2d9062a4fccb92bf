//! Front end configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `SLUG_REDIRECT_ADDR` | `0.0.0.0:3000` |
//!
//! Backend settings come from [`ClientConfig`].

use slug_registry_client::{ClientConfig, ConfigError};
use std::net::SocketAddr;

/// Settings for the `slug-redirect` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// Backend connection
    pub client: ClientConfig,
}

impl ServerConfig {
    /// Default listen address
    pub const DEFAULT_ADDR: &'static str = "0.0.0.0:3000";

    /// Environment variable holding the listen address
    pub const ADDR_VAR: &'static str = "SLUG_REDIRECT_ADDR";

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(Self::ADDR_VAR).unwrap_or_else(|| Self::DEFAULT_ADDR.to_string());
        let addr = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: Self::ADDR_VAR,
            value: raw.clone(),
        })?;

        Ok(Self {
            addr,
            client: ClientConfig::from_lookup(&lookup)?,
        })
    }
}
