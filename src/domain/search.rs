//! Search snapshot and result types.
//!
//! [`CurrentSearch`] is the canonical query the store publishes on submit.
//! [`SearchResult`] and [`Document`] are the catalog's answer, already mapped
//! out of the wire format (see [`crate::catalog::response`]).

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Page size used when neither configuration nor restored parameters set one.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

const WORKS_BASE_URL: &str = "https://openlibrary.org";

/// Immutable snapshot of text, page and page size submitted together.
///
/// `page` is 1-based. The store converts from its 0-based page index at
/// submit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSearch {
    pub search_text: String,
    pub page_size: NonZeroU32,
    pub page: NonZeroU32,
}

impl CurrentSearch {
    #[must_use]
    pub fn new(search_text: impl Into<String>, page_size: NonZeroU32, page: NonZeroU32) -> Self {
        Self {
            search_text: search_text.into(),
            page_size,
            page,
        }
    }

    /// The "no query" snapshot: empty text on page 1.
    #[must_use]
    pub const fn empty(page_size: NonZeroU32) -> Self {
        Self {
            search_text: String::new(),
            page_size,
            page: NonZeroU32::MIN,
        }
    }

    /// True when the text holds no searchable characters.
    ///
    /// Whitespace-only input counts as empty: it would normalize to an empty
    /// catalog query.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_text.trim().is_empty()
    }

    /// 0-based page index matching this snapshot.
    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page.get() - 1
    }
}

impl Default for CurrentSearch {
    fn default() -> Self {
        Self::empty(DEFAULT_PAGE_SIZE)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matches across all pages.
    pub total_found: u64,
    /// Documents on the requested page, in catalog order.
    pub documents: Vec<Document>,
}

impl SearchResult {
    /// Number of pages needed to show `total_found` items at `page_size`.
    ///
    /// ```
    /// use booksearch::SearchResult;
    /// use std::num::NonZeroU32;
    ///
    /// let result = SearchResult { total_found: 21, documents: vec![] };
    /// assert_eq!(result.page_count(NonZeroU32::new(10).unwrap()), 3);
    /// ```
    #[must_use]
    pub fn page_count(&self, page_size: NonZeroU32) -> u64 {
        self.total_found.div_ceil(u64::from(page_size.get()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// A single catalog entry.
///
/// Author names, the cover edition key and edition keys are frequently
/// missing from catalog records; they come through as empty/`None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    #[serde(default)]
    pub author_names: Vec<String>,
    #[serde(default)]
    pub cover_edition_key: Option<String>,
    /// Work key, e.g. `/works/OL45804W`.
    pub key: String,
    #[serde(default)]
    pub edition_keys: Vec<String>,
}

impl Document {
    /// Comma-separated author list, or `"Unknown author"`.
    #[must_use]
    pub fn authors_label(&self) -> String {
        if self.author_names.is_empty() {
            "Unknown author".to_string()
        } else {
            self.author_names.join(", ")
        }
    }

    /// Link to the work page on openlibrary.org.
    ///
    /// ```
    /// use booksearch::domain::Document;
    ///
    /// let doc = Document {
    ///     title: "Dune".into(),
    ///     author_names: vec!["Frank Herbert".into()],
    ///     cover_edition_key: Some("OL26242482M".into()),
    ///     key: "/works/OL893415W".into(),
    ///     edition_keys: vec![],
    /// };
    /// assert_eq!(doc.work_url(), "https://openlibrary.org/works/OL893415W");
    /// ```
    #[must_use]
    pub fn work_url(&self) -> String {
        format!("{WORKS_BASE_URL}{}", self.key)
    }
}
