//! Error types for waba-node
//!
//! This module defines all error types used by the node, the transport and the
//! configuration layer. Uses `thiserror` for ergonomic error handling with
//! automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// The primary error type for waba-node operations.
#[derive(Error, Debug)]
pub enum WabaError {
    /// Configuration-related errors (invalid config, missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Node parameter errors (missing required field, unsupported operation, etc.)
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// The gateway answered with a non-2xx status.
    #[error("WABA API error {status}: {message}")]
    Api {
        /// HTTP status code returned by the gateway
        status: u16,
        /// Error detail extracted from the response body
        message: String,
    },

    /// HTTP request errors (connection failures, timeouts, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A batch item failed while the node was not in continue-on-fail mode.
    #[error("Item {index} failed: {source}")]
    Item {
        /// Position of the failing record in the input batch
        index: usize,
        /// The error raised while building or sending the request
        #[source]
        source: Box<WabaError>,
    },
}

impl WabaError {
    /// Wrap an error with the index of the batch item that raised it.
    pub fn at_item(self, index: usize) -> Self {
        WabaError::Item {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the failing item index for errors raised by a strict batch run.
    pub fn item_index(&self) -> Option<usize> {
        match self {
            WabaError::Item { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// A specialized `Result` type for waba-node operations.
pub type Result<T> = std::result::Result<T, WabaError>;
