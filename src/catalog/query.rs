//! Catalog request construction.
//!
//! Turns a [`CurrentSearch`] into the Open Library search URL and tags it
//! with the coordinator generation that issued it. The generation travels
//! through the host's web request context and comes back with the response,
//! which is how late responses for superseded searches are recognized.

use crate::domain::CurrentSearch;
use std::collections::BTreeMap;

/// Open Library search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org/search.json";

/// Context key carrying the generation through `web_request`.
pub const GENERATION_CONTEXT_KEY: &str = "booksearch_generation";

/// Lower-cases `text` and joins its whitespace-separated words with `+`.
///
/// Each word is percent-encoded so reserved characters cannot break out of
/// the `q` parameter.
///
/// ```
/// use booksearch::catalog::normalize_query;
///
/// assert_eq!(normalize_query("The  Lord of\tthe Rings"), "the+lord+of+the+rings");
/// assert_eq!(normalize_query("R&D"), "r%26d");
/// ```
#[must_use]
pub fn normalize_query(text: &str) -> String {
    text.split_whitespace()
        .map(|word| urlencoding::encode(&word.to_lowercase()).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}

/// A catalog fetch ready to be dispatched by the plugin runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Coordinator generation that issued this request.
    pub generation: u64,
    /// Fully built request URL.
    pub url: String,
    /// Normalized `q` parameter.
    pub query: String,
    /// 1-based page number.
    pub page: u32,
    /// Page size sent as `limit`.
    pub limit: u32,
}

impl FetchRequest {
    /// Context map handed to the host alongside the request.
    #[must_use]
    pub fn context(&self) -> BTreeMap<String, String> {
        let mut context = BTreeMap::new();
        context.insert(GENERATION_CONTEXT_KEY.to_string(), self.generation.to_string());
        context
    }

    /// Recovers the generation from a response context.
    ///
    /// Returns `None` for responses to requests this plugin did not tag.
    #[must_use]
    pub fn generation_from_context(context: &BTreeMap<String, String>) -> Option<u64> {
        context
            .get(GENERATION_CONTEXT_KEY)
            .and_then(|value| value.parse().ok())
    }
}

/// Builds catalog requests against a configurable endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogClient {
    base_url: String,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CatalogClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request for `search`, tagged with `generation`.
    ///
    /// ```
    /// use booksearch::catalog::CatalogClient;
    /// use booksearch::domain::{CurrentSearch, DEFAULT_PAGE_SIZE};
    /// use std::num::NonZeroU32;
    ///
    /// let search = CurrentSearch::new("Dune", DEFAULT_PAGE_SIZE, NonZeroU32::MIN);
    /// let request = CatalogClient::default().request(&search, 1);
    /// assert_eq!(request.url, "https://openlibrary.org/search.json?q=dune&page=1&limit=10");
    /// ```
    #[must_use]
    pub fn request(&self, search: &CurrentSearch, generation: u64) -> FetchRequest {
        let query = normalize_query(&search.search_text);
        let page = search.page.get();
        let limit = search.page_size.get();
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{separator}q={query}&page={page}&limit={limit}",
            self.base_url
        );

        FetchRequest {
            generation,
            url,
            query,
            page,
            limit,
        }
    }
}
