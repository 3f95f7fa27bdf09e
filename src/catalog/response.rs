//! Catalog response decoding.
//!
//! The search endpoint answers with
//! `{ num_found, docs: [{ title, author_name?, cover_edition_key?, key, edition_key? }] }`.
//! Wire records are decoded here and mapped into domain [`SearchResult`]s.

use crate::domain::{BookSearchError, Document, Result, SearchResult};
use serde::Deserialize;

/// Longest body excerpt kept in a transport error.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(alias = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<CatalogDoc>,
}

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    cover_edition_key: Option<String>,
    key: String,
    #[serde(default)]
    edition_key: Vec<String>,
}

impl From<CatalogDoc> for Document {
    fn from(doc: CatalogDoc) -> Self {
        Self {
            title: doc.title,
            author_names: doc.author_name,
            cover_edition_key: doc.cover_edition_key,
            key: doc.key,
            edition_keys: doc.edition_key,
        }
    }
}

impl From<CatalogResponse> for SearchResult {
    fn from(response: CatalogResponse) -> Self {
        Self {
            total_found: response.num_found,
            documents: response.docs.into_iter().map(Document::from).collect(),
        }
    }
}

/// Decodes a catalog response delivered with HTTP `status`.
///
/// # Errors
///
/// - [`BookSearchError::Transport`] for non-2xx statuses
/// - [`BookSearchError::Parse`] when the body is not a catalog response
pub fn parse_response(status: u16, body: &[u8]) -> Result<SearchResult> {
    if !(200..300).contains(&status) {
        let text = String::from_utf8_lossy(body);
        let message: String = text.chars().take(ERROR_BODY_LIMIT).collect();
        return Err(BookSearchError::Transport { status, message });
    }

    let response: CatalogResponse = serde_json::from_slice(body)?;
    tracing::trace!(
        num_found = response.num_found,
        docs = response.docs.len(),
        "catalog response decoded"
    );
    Ok(response.into())
}
