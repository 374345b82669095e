//! Error types for the crate.

use thiserror::Error;

/// Errors surfaced by mail search, file and directory operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid regular expression passed to a search.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid glob pattern.
    #[error("Invalid glob: {0}")]
    Glob(#[from] glob::PatternError),

    /// Archive read/write failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory walk failed.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A mail folder or message could not be read.
    #[error("Traversal failed at '{path}': {reason}")]
    Traversal { path: String, reason: String },

    /// Message parsing failed.
    #[error("Mail error: {0}")]
    Mail(String),

    /// Path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected entry name.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A blocking task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn traversal(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Traversal {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
