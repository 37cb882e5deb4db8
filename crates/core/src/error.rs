//! Error types for the tokenmill libraries.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the tokenizer libraries.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Token string is not in the vocabulary
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Token ID is not in the vocabulary
    #[error("Unknown token ID: {0}")]
    UnknownTokenId(u32),

    /// Persisted artifact is structurally invalid
    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;
