//! Error types for the booksearch plugin.
//!
//! [`BookSearchError`] covers every failure the plugin can observe, from the
//! catalog fetch boundary to parameter persistence. The [`Result`] alias is
//! used throughout the crate.

use thiserror::Error;

/// The main error type for booksearch operations.
///
/// # Examples
///
/// ```
/// use booksearch::BookSearchError;
///
/// let err = BookSearchError::Transport { status: 503, message: "unavailable".into() };
/// assert_eq!(err.to_string(), "Catalog request failed with status 503: unavailable");
/// ```
#[derive(Debug, Error)]
pub enum BookSearchError {
    /// The catalog request failed at the network level or returned a
    /// non-success HTTP status.
    #[error("Catalog request failed with status {status}: {message}")]
    Transport {
        /// HTTP status reported by the host (0 if none was received).
        status: u16,
        /// Truncated response body or host error text.
        message: String,
    },

    /// The catalog response body did not have the expected shape.
    #[error("Malformed catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading or writing persisted query parameters failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Communication with the background worker failed.
    #[error("Worker communication error: {0}")]
    Worker(String),
}

impl BookSearchError {
    /// Whether the error happened while fetching or decoding catalog results.
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Parse(_))
    }
}

/// A specialized `Result` type for booksearch operations.
pub type Result<T> = std::result::Result<T, BookSearchError>;
