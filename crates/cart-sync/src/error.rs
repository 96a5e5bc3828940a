//! Error types for the cart client.
//!
//! None of these reach the shopper directly: transport failures are folded
//! into a failed [`CartPayload`](shopfront_core::CartPayload) and storage
//! failures are logged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the cart ID store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("cart storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("cart storage at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors talking to the `/api/cart` endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or protocol failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The `lines` field could not be encoded.
    #[error("failed to encode cart lines: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body was not a cart payload.
    #[error("invalid cart response (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}
