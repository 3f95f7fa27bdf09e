//! URL-style query parameters used to restore and mirror searches.
//!
//! [`QueryParams`] is the external parameter source the query store can be
//! initialized from, and the place submitted searches are mirrored back to.
//! It behaves like a URL query string: unrelated keys are preserved, and the
//! three search keys are merged in or cleared as a group.
//!
//! # Example
//!
//! ```rust
//! use booksearch::params::QueryParams;
//!
//! let params = QueryParams::from_query_string("searchText=the+hobbit&page=2&pageSize=20");
//! assert_eq!(params.search_text(), Some("the hobbit"));
//! assert_eq!(params.page().map(|p| p.get()), Some(2));
//! assert_eq!(params.page_size().map(|p| p.get()), Some(20));
//! ```

use crate::domain::CurrentSearch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

pub const SEARCH_TEXT_KEY: &str = "searchText";
pub const PAGE_SIZE_KEY: &str = "pageSize";
pub const PAGE_KEY: &str = "page";

/// Ordered key/value parameters with query-string encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=b&c=d`. A leading `?` is ignored, `+` decodes to a space and
    /// pairs that fail percent-decoding are skipped.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = BTreeMap::new();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            match (decode_component(raw_key), decode_component(raw_value)) {
                (Some(key), Some(value)) if !key.is_empty() => {
                    params.insert(key, value);
                }
                _ => tracing::debug!(pair = %pair, "skipping undecodable query parameter"),
            }
        }

        Self(params)
    }

    /// Formats the parameters as a query string (without a leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.get(SEARCH_TEXT_KEY)
    }

    /// 1-based page, if present and a positive integer.
    #[must_use]
    pub fn page(&self) -> Option<NonZeroU32> {
        self.get(PAGE_KEY).and_then(|v| v.trim().parse().ok())
    }

    /// Page size, if present and a positive integer.
    #[must_use]
    pub fn page_size(&self) -> Option<NonZeroU32> {
        self.get(PAGE_SIZE_KEY).and_then(|v| v.trim().parse().ok())
    }

    /// Mirrors `search` into the parameters.
    ///
    /// A search with text sets all three search keys; an empty search removes
    /// them. Other keys are left alone.
    pub fn merge_search(&mut self, search: &CurrentSearch) {
        if search.is_empty() {
            self.remove(SEARCH_TEXT_KEY);
            self.remove(PAGE_SIZE_KEY);
            self.remove(PAGE_KEY);
            return;
        }

        self.insert(SEARCH_TEXT_KEY, search.search_text.clone());
        self.insert(PAGE_SIZE_KEY, search.page_size.to_string());
        self.insert(PAGE_KEY, search.page.to_string());
    }
}

impl From<BTreeMap<String, String>> for QueryParams {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|value| value.into_owned())
}

fn encode_component(raw: &str) -> String {
    raw.split(' ')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
