//! Error types for franchise-logo-dl
//!
//! This module provides the error taxonomy for both jobs:
//! - Run-fatal errors (configuration, connection, count query)
//! - Per-row errors (URL resolution, fetch, persist) that the batch runner records and skips
//! - Archive errors for the compression utility
//!
//! Every variant carries enough context (row identifier, URL, or path) to support
//! remediation from the failed-identifier list emitted at the end of a run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for franchise-logo-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for franchise-logo-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// Row store or tunnel failure
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Image fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Row has no usable image path, so no URL could be built
    #[error("row {id}: image path is empty, no URL to fetch")]
    Resolution {
        /// Identifier of the offending row
        id: String,
    },

    /// Writing a downloaded image to disk failed
    #[error("failed to write {path}: {source}")]
    Persist {
        /// Target path of the write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Archive creation failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error outside of a single image fetch
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a key.
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Row store errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to the row store
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// SSH tunnel could not be established
    #[error("ssh tunnel failed: {0}")]
    TunnelFailed(String),
}

/// Single image fetch errors
#[derive(Clone, Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Request could not be completed (DNS, connect, TLS, body read)
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Requested URL
        url: String,
        /// Error description from the HTTP client
        reason: String,
        /// Whether the failure happened while connecting
        connect: bool,
    },

    /// Request exceeded the configured timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// Server answered 2xx with no bytes
    #[error("{url} returned an empty body")]
    EmptyBody {
        /// Requested URL
        url: String,
    },
}

impl FetchError {
    /// Build a fetch error from a reqwest error, keeping the URL for context.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FetchError::Timeout {
                url: url.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }
        FetchError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
            connect: err.is_connect(),
        }
    }

    /// URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Transport { url, .. }
            | FetchError::Timeout { url }
            | FetchError::EmptyBody { url } => url,
        }
    }
}

/// Archive creation errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Source directory does not exist
    #[error("source directory not found: {0}")]
    SourceMissing(PathBuf),

    /// Unknown archive format requested
    #[error("unsupported archive format '{0}' (supported: zip, tar.gz)")]
    UnsupportedFormat(String),

    /// Compression level outside 0-9
    #[error("compression level {0} is out of range 0-9")]
    InvalidLevel(u32),

    /// Writing the archive failed
    #[error("failed to write archive {archive}: {reason}")]
    WriteFailed {
        /// Archive being written
        archive: PathBuf,
        /// The reason the write failed
        reason: String,
    },
}
