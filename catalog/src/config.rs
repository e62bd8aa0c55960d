//! Client configuration.
//!
//! Values come from [`ClientConfig::default`] and may be overridden with the
//! `with_*` builders or from the environment via [`ClientConfig::from_env`].

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const ENV_API_URL: &str = "CATALOG_API_URL";
/// Environment variable overriding [`ClientConfig::token_key`].
pub const ENV_TOKEN_KEY: &str = "CATALOG_TOKEN_KEY";
/// Environment variable overriding [`ClientConfig::token_path`].
pub const ENV_TOKEN_FILE: &str = "CATALOG_TOKEN_FILE";
/// Environment variable overriding [`ClientConfig::request_timeout`] (seconds).
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CATALOG_REQUEST_TIMEOUT_SECS";

/// Connection and persistence settings for the catalog client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:4000/api`.
    ///
    /// Default: `http://localhost:4000/api`
    pub base_url: String,

    /// Slot key of the durable bearer token.
    ///
    /// Default: `token`
    pub token_key: String,

    /// File holding durable tokens.
    ///
    /// Default: `.catalog-token.json`
    pub token_path: PathBuf,

    /// Per-request timeout.
    ///
    /// Default: 30 seconds
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api".to_string(),
            token_key: "token".to_string(),
            token_path: PathBuf::from(".catalog-token.json"),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Set the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the token slot key.
    #[must_use]
    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Set the token file.
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Defaults overridden by whichever `CATALOG_*` variables are set.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(key) = lookup(ENV_TOKEN_KEY) {
            config.token_key = key;
        }
        if let Some(path) = lookup(ENV_TOKEN_FILE) {
            config.token_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let parsed = secs
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT_SECS,
                    value: secs.clone(),
                })?;
            config.request_timeout = Duration::from_secs(parsed);
        }

        config.api_root()?;
        Ok(config)
    }

    /// The parsed API root.
    ///
    /// # Errors
    ///
    /// Returns an error unless `base_url` is an absolute `http(s)` URL that
    /// can carry path segments.
    pub fn api_root(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason,
        };

        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }
        Ok(url)
    }
}
