//! Error types for conferencing provider operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// Adapters map their native failures (HTTP status codes, malformed payloads)
/// onto these variants so the session controller can decide what is fatal
/// without knowing which provider it is talking to.
#[derive(Debug)]
pub enum Error {
    /// The bearer token was rejected, expired, or lacks a required scope.
    /// Callers should request a fresh token before retrying.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection timeouts.
    Network(String),

    /// Invalid parameters or malformed configuration (bad base URL, etc.).
    Configuration(String),

    /// Provider-side business failure (space already ended, quota, etc.).
    Provider(String),

    /// Requested resource (space, conference record, transcript) does not exist.
    NotFound(String),

    /// Provider rate limit exceeded. Clients must wait before retrying.
    RateLimited { retry_after_seconds: u64 },

    /// The provider answered with a payload that does not match the expected shape.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl Error {
    /// Maps an unsuccessful HTTP status and body onto an error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Error::Authentication(body),
            404 => Error::NotFound(body),
            429 => Error::RateLimited {
                retry_after_seconds: 60,
            },
            400 | 422 => Error::Configuration(body),
            _ => Error::Provider(body),
        }
    }
}
