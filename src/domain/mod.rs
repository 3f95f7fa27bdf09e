//! Domain layer for the booksearch plugin.
//!
//! Core types independent of Zellij APIs and of the catalog wire format.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`search`]: Search snapshots, results and documents
//!
//! # Examples
//!
//! ```
//! use booksearch::domain::{CurrentSearch, DEFAULT_PAGE_SIZE};
//! use std::num::NonZeroU32;
//!
//! let search = CurrentSearch::new("dune", DEFAULT_PAGE_SIZE, NonZeroU32::MIN);
//! assert!(!search.is_empty());
//! ```

pub mod error;
pub mod search;

pub use error::{BookSearchError, Result};
pub use search::{CurrentSearch, Document, SearchResult, DEFAULT_PAGE_SIZE};
