//! Error types for benchtrack-core (WASM-compatible)

use thiserror::Error;

/// Result type alias for benchtrack-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that work in both native and WASM environments
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unrecognized unit '{0}': expected a ns, us, ms or s based label")]
    UnknownUnit(String),

    #[error("Invalid group key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Suite '{0}' not found")]
    UnknownSuite(String),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid history document: {0}")]
    InvalidDocument(String),
}
