//! Client configuration.
//!
//! Loaded from environment variables with sensible defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `SLUG_API_URL` | `http://localhost:8080` |
//! | `SLUG_API_TIMEOUT_SECS` | `10` |

use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is not an absolute http(s) URL
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    /// A variable was set but could not be parsed
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Environment variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Connection settings for [`HttpSlugApi`](crate::HttpSlugApi)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the slug backend, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default backend location
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";

    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Environment variable holding the base URL
    pub const URL_VAR: &'static str = "SLUG_API_URL";

    /// Environment variable holding the timeout in seconds
    pub const TIMEOUT_VAR: &'static str = "SLUG_API_TIMEOUT_SECS";

    /// Create a configuration for `base_url` with the default timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] unless `base_url` starts with
    /// `http://` or `https://`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');

        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(base_url));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

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
        let base_url = lookup(Self::URL_VAR).unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url)?;

        if let Some(raw) = lookup(Self::TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: Self::TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    var: Self::TIMEOUT_VAR,
                    value: raw,
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}
