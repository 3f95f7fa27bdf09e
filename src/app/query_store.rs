//! Query state store.
//!
//! Holds the latest search text, page index and page size as independently
//! settable fields. Nothing happens when a field changes; only
//! [`QueryStore::submit`] snapshots the three into a [`CurrentSearch`] and
//! publishes it.
//!
//! The page index is 0-based (what a paginator reports); the published
//! snapshot carries a 1-based page (what the catalog expects). The +1 offset
//! is applied in exactly one place, at submit time.
//!
//! # Example
//!
//! ```rust
//! use booksearch::app::QueryStore;
//! use booksearch::domain::DEFAULT_PAGE_SIZE;
//!
//! let mut store = QueryStore::new(DEFAULT_PAGE_SIZE);
//! store.set_search_text("Dune");
//! store.set_page(2);
//! let search = store.submit();
//! assert_eq!(search.page.get(), 3);
//! ```

use crate::domain::CurrentSearch;
use crate::params::QueryParams;
use crate::published::{Published, SubscriptionId};
use std::num::NonZeroU32;

/// Highest 1-based page accepted from restored parameters.
///
/// The catalog stops paging long before this; larger values are clamped so
/// later page-size remapping stays in range.
pub const MAX_RESTORED_PAGE: NonZeroU32 = match NonZeroU32::new(10_000) {
    Some(page) => page,
    None => unreachable!(),
};

/// Field-level search state plus the published current search.
#[derive(Debug)]
pub struct QueryStore {
    search_text: String,
    page_index: u32,
    page_size: NonZeroU32,
    current: Published<CurrentSearch>,
}

impl QueryStore {
    /// Creates a store with empty text, page index 0 and `page_size`.
    ///
    /// The published value starts as the matching empty search, so late
    /// observers always receive something.
    #[must_use]
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            search_text: String::new(),
            page_index: 0,
            page_size,
            current: Published::new(CurrentSearch::empty(page_size)),
        }
    }

    /// Replaces the search text without submitting.
    ///
    /// # Parameters
    ///
    /// * `text` - New text; whitespace is kept as typed and only trimmed
    ///   when the query is built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use booksearch::app::QueryStore;
    /// use booksearch::domain::DEFAULT_PAGE_SIZE;
    ///
    /// let mut store = QueryStore::new(DEFAULT_PAGE_SIZE);
    /// store.set_search_text("Dune ");
    /// assert_eq!(store.search_text(), "Dune ");
    /// assert_eq!(store.published().version(), 0);
    /// ```
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        tracing::trace!(search_text = %self.search_text, "search text set");
    }

    /// Sets the 0-based page index without submitting.
    pub fn set_page(&mut self, page_index: u32) {
        self.page_index = page_index;
    }

    /// Sets the page size without submitting.
    pub fn set_page_size(&mut self, page_size: NonZeroU32) {
        self.page_size = page_size;
    }

    /// Text currently in the field, submitted or not.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// 0-based page index of the field, as a paginator reports it.
    ///
    /// # Returns
    ///
    /// The index that the next submit publishes as page `index + 1`.
    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page_index
    }

    #[must_use]
    pub const fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    /// Mutable access to the text field, for keystroke editing.
    pub fn search_text_mut(&mut self) -> &mut String {
        &mut self.search_text
    }

    /// Snapshots the fields and publishes the result as the current search.
    pub fn submit(&mut self) -> &CurrentSearch {
        let search = CurrentSearch {
            search_text: self.search_text.clone(),
            page_size: self.page_size,
            page: NonZeroU32::MIN.saturating_add(self.page_index),
        };

        tracing::debug!(
            search_text = %search.search_text,
            page = search.page.get(),
            page_size = search.page_size.get(),
            "submitting search"
        );

        self.current.publish(search);
        self.current.get()
    }

    /// Pagination handler: applies both values and submits only if either
    /// differs from the store's current fields.
    ///
    /// Returns whether a submit happened.
    pub fn change_page(&mut self, page_index: u32, page_size: NonZeroU32) -> bool {
        if page_index == self.page_index && page_size == self.page_size {
            tracing::debug!(page_index, page_size = page_size.get(), "page unchanged, skipping submit");
            return false;
        }

        self.set_page(page_index);
        self.set_page_size(page_size);
        self.submit();
        true
    }

    /// Initializes fields from an external parameter source.
    ///
    /// Missing or malformed values leave the corresponding field untouched.
    /// `page` in the parameters is 1-based and clamped to
    /// [`MAX_RESTORED_PAGE`].
    ///
    /// # Returns
    ///
    /// `true` when the restored text is a real query, i.e. the caller should
    /// auto-submit.
    pub fn restore(&mut self, params: &QueryParams) -> bool {
        if let Some(text) = params.search_text() {
            self.search_text = text.to_string();
        }
        if let Some(page) = params.page() {
            self.page_index = page.min(MAX_RESTORED_PAGE).get() - 1;
        }
        if let Some(page_size) = params.page_size() {
            self.page_size = page_size;
        }

        tracing::debug!(
            search_text = %self.search_text,
            page_index = self.page_index,
            page_size = self.page_size.get(),
            "query store restored from parameters"
        );

        !self.search_text.trim().is_empty()
    }

    /// Latest submitted search (or the initial empty one).
    #[must_use]
    pub const fn current_search(&self) -> &CurrentSearch {
        self.current.get()
    }

    /// The published current-search value, for version-based observation.
    #[must_use]
    pub const fn published(&self) -> &Published<CurrentSearch> {
        &self.current
    }

    /// Observes submitted searches; the latest one is replayed immediately.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&CurrentSearch) + 'static,
    {
        self.current.subscribe(observer)
    }

    /// Detaches an observer. Returns `false` if `id` was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.current.unsubscribe(id)
    }
}
