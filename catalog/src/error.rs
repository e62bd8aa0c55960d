//! Error types for the catalog client.
//!
//! Local validation failures live in [`crate::validation`]; they never reach
//! the network and so are not part of this taxonomy.

use crate::operation::Operation;
use thiserror::Error;

/// Failure of a remote call issued through a [`crate::gateway::Gateway`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The server could not be reached or the connection broke.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with an error status.
    #[error("request rejected with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Most specific message the server supplied, if any
        detail: Option<String>,
    },

    /// The server answered successfully but the body did not match the
    /// expected shape.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Message shown to the user for a failed `operation`.
    ///
    /// Uses the server's own detail when it sent one, otherwise the
    /// operation's generic fallback.
    #[must_use]
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            Self::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => operation.fallback_message().to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Durable token storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("token storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a valid token map.
    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A lock guarding in-memory storage was poisoned.
    #[error("token storage lock poisoned")]
    Poisoned,
}

/// Invalid client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The API base URL is not an absolute URL.
    #[error("invalid base URL {value:?}: {reason}")]
    InvalidBaseUrl {
        /// Offending value
        value: String,
        /// Parser message
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    HttpClient(String),

    /// An environment variable holds a value of the wrong type.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}
