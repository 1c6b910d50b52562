//! Error types for docsearch.

use thiserror::Error;

use crate::types::IndexKind;

/// Result type alias using SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while searching.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A passage index failed to answer a query.
    #[error("{index} index error: {message}")]
    Index { index: IndexKind, message: String },

    /// Token counting failed.
    #[error("Tokenizer error: {message}")]
    Tokenizer { message: String },

    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SearchError {
    /// Create an index error.
    pub fn index(index: IndexKind, message: impl Into<String>) -> Self {
        Self::Index {
            index,
            message: message.into(),
        }
    }

    /// Create a tokenizer error.
    pub fn tokenizer(message: impl Into<String>) -> Self {
        Self::Tokenizer {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a stable error code for callers that report errors upstream.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Index { .. } => "INDEX_ERROR",
            Self::Tokenizer { .. } => "TOKENIZER_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
        }
    }
}
