//! Display-ready view of the application state.
//!
//! [`SearchView`] is computed from [`AppState`] and holds no logic beyond
//! formatting. The plugin shim prints [`SearchView::lines`] as plain text.
//!
//! # Example
//!
//! ```rust
//! use booksearch::app::SearchView;
//! use booksearch::{initialize, Config};
//!
//! let state = initialize(&Config::default());
//! let view = SearchView::from_state(&state);
//! assert_eq!(view.search_line, "Search: _");
//! assert!(view.items.is_empty());
//! ```

use super::AppState;

/// Hint shown before anything has been searched.
pub const START_HINT: &str = "Type a title or author and press Enter.";

/// Shown when a search completed with no documents.
pub const NO_RESULTS: &str = "No books found.";

/// Everything the plain-text renderer prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    /// Editable search field with a cursor marker.
    pub search_line: String,

    /// "Searching..." or the last failure, if any.
    pub status: Option<String>,

    /// Query persisted by the worker, when it differs from the field.
    pub saved_search: Option<String>,

    /// One entry per document on the current page.
    pub items: Vec<DisplayItem>,

    /// Message replacing the list when there is nothing to show.
    pub empty_state: Option<&'static str>,

    /// Page position and totals, once results exist.
    pub footer: Option<String>,
}

/// A single document line and its link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Title followed by the authors in parentheses.
    pub label: String,

    /// Work page on openlibrary.org.
    pub url: String,
}

impl SearchView {
    /// Builds the view from the current state.
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let search = state.store.current_search();

        let status = if state.coordinator.is_pending() {
            Some("Searching...".to_string())
        } else {
            state
                .coordinator
                .last_error()
                .map(|error| format!("Search failed: {error}"))
        };

        let saved_search = state
            .stored_params
            .search_text()
            .filter(|text| !text.trim().is_empty() && *text != state.store.search_text())
            .map(str::to_string);

        let mut view = Self {
            search_line: format!("Search: {}_", state.store.search_text()),
            status,
            saved_search,
            items: vec![],
            empty_state: None,
            footer: None,
        };

        let Some(results) = state.coordinator.results() else {
            view.empty_state = Some(START_HINT);
            return view;
        };

        if results.is_empty() {
            view.empty_state = Some(NO_RESULTS);
            return view;
        }

        view.items = results
            .documents
            .iter()
            .map(|document| DisplayItem {
                label: format!("{} ({})", document.title, document.authors_label()),
                url: document.work_url(),
            })
            .collect();

        view.footer = Some(format!(
            "Page {}/{}  {} found  {} per page",
            search.page,
            state.page_count().unwrap_or(0),
            results.total_found,
            search.page_size,
        ));

        view
    }

    /// Plain-text lines, each cut to `cols` characters.
    #[must_use]
    pub fn lines(&self, cols: usize) -> Vec<String> {
        let mut lines = vec![truncate(&self.search_line, cols)];
        if let Some(saved) = &self.saved_search {
            lines.push(truncate(&format!("Saved: {saved}  (Ctrl+x to forget)"), cols));
        }
        if let Some(status) = &self.status {
            lines.push(truncate(status, cols));
        }
        lines.push(String::new());

        if let Some(message) = self.empty_state {
            lines.push(truncate(message, cols));
            return lines;
        }

        let indent = cols.saturating_sub(2);
        for item in &self.items {
            lines.push(format!("  {}", truncate(&item.label, indent)));
            lines.push(format!("    {}", truncate(&item.url, cols.saturating_sub(4))));
        }

        if let Some(footer) = &self.footer {
            lines.push(String::new());
            lines.push(truncate(footer, cols));
        }
        lines
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
