//! Application state container.
//!
//! [`AppState`] owns the query store and the search coordinator and wires
//! one to the other: every time the store publishes a new search, the
//! coordinator observes it and may produce a fetch. The coordinator never
//! writes back into the store.

use super::coordinator::SearchCoordinator;
use super::query_store::QueryStore;
use super::Action;
use crate::params::QueryParams;
use crate::worker::WorkerMessage;
use std::num::NonZeroU32;

/// Central application state.
#[derive(Debug)]
pub struct AppState {
    /// Field-level query state and the published current search.
    pub store: QueryStore,

    /// Fetch lifecycle, results and pending flag.
    pub coordinator: SearchCoordinator,

    /// Page sizes offered when cycling, ascending.
    pub page_size_options: Vec<NonZeroU32>,

    /// Whether submitted searches are mirrored to persistent parameters.
    pub mirror_params: bool,

    /// Last parameters reported by the worker.
    pub stored_params: QueryParams,
}

impl AppState {
    /// Creates the state and lets the coordinator observe the store's
    /// initial (empty) search.
    #[must_use]
    pub fn new(
        store: QueryStore,
        coordinator: SearchCoordinator,
        page_size_options: Vec<NonZeroU32>,
        mirror_params: bool,
    ) -> Self {
        let mut state = Self {
            store,
            coordinator,
            page_size_options,
            mirror_params,
            stored_params: QueryParams::default(),
        };
        let initial = state.coordinator.observe(state.store.published());
        debug_assert!(initial.is_none(), "initial search must be empty");
        state
    }

    /// Whether anything has been submitted since startup.
    #[must_use]
    pub const fn has_submitted(&self) -> bool {
        self.store.published().version() > 0
    }

    /// Submits the store's fields and forwards the new search.
    pub fn submit(&mut self) -> Vec<Action> {
        self.store.submit();
        self.dispatch()
    }

    /// Whether the text field differs from the last submitted search.
    #[must_use]
    pub fn text_edited(&self) -> bool {
        self.store.search_text() != self.store.current_search().search_text
    }

    /// Applies a page change; submits and forwards only if it changed.
    ///
    /// If the text was edited since the last submit, the page index belongs
    /// to the old query, so the new text is submitted on its first page.
    pub fn paginate(&mut self, page_index: u32, page_size: NonZeroU32) -> Vec<Action> {
        if self.text_edited() {
            tracing::debug!(page_size = page_size.get(), "search text edited, starting from the first page");
            self.store.set_page(0);
            self.store.set_page_size(page_size);
            return self.submit();
        }

        if self.store.change_page(page_index, page_size) {
            self.dispatch()
        } else {
            vec![]
        }
    }

    /// Lets the coordinator observe the store and collects the resulting
    /// fetch and mirroring actions.
    fn dispatch(&mut self) -> Vec<Action> {
        let mut actions = vec![];

        if let Some(request) = self.coordinator.observe(self.store.published()) {
            actions.push(Action::Fetch(request));
        }

        if self.mirror_params {
            let search = self.store.current_search().clone();
            actions.push(Action::PostToWorker(WorkerMessage::mirror_search(search)));
        }

        actions
    }

    /// Number of result pages for the current search, once results exist.
    #[must_use]
    pub fn page_count(&self) -> Option<u64> {
        let page_size = self.store.current_search().page_size;
        self.coordinator
            .results()
            .map(|results| results.page_count(page_size))
    }

    /// The page size after `current` when cycling through the options.
    #[must_use]
    pub fn next_page_size(&self, current: NonZeroU32) -> NonZeroU32 {
        self.page_size_options
            .iter()
            .copied()
            .find(|&size| size > current)
            .or_else(|| self.page_size_options.first().copied())
            .unwrap_or(current)
    }

    /// Page index that keeps the first visible item on screen after a page
    /// size change.
    #[must_use]
    pub fn remap_page_index(page_index: u32, old_size: NonZeroU32, new_size: NonZeroU32) -> u32 {
        let first_item = u64::from(page_index) * u64::from(old_size.get());
        u32::try_from(first_item / u64::from(new_size.get())).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn state(options: &[u32]) -> AppState {
        AppState::new(
            QueryStore::new(size(10)),
            SearchCoordinator::default(),
            options.iter().map(|&n| size(n)).collect(),
            true,
        )
    }

    #[test]
    fn page_sizes_cycle_and_wrap() {
        let state = state(&[5, 10, 25]);
        assert_eq!(state.next_page_size(size(5)), size(10));
        assert_eq!(state.next_page_size(size(10)), size(25));
        assert_eq!(state.next_page_size(size(25)), size(5));
        assert_eq!(state.next_page_size(size(7)), size(10));
    }

    #[test]
    fn empty_options_keep_current_size() {
        let state = state(&[]);
        assert_eq!(state.next_page_size(size(10)), size(10));
    }

    #[test]
    fn remap_keeps_first_item_visible() {
        assert_eq!(AppState::remap_page_index(3, size(10), size(25)), 1);
        assert_eq!(AppState::remap_page_index(1, size(25), size(10)), 2);
        assert_eq!(AppState::remap_page_index(0, size(10), size(5)), 0);
    }

    #[test]
    fn submit_with_text_fetches_and_mirrors() {
        let mut state = state(&[10]);
        state.store.set_search_text("dune");

        let actions = state.submit();
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], Action::Fetch(request) if request.query == "dune"));
        assert!(matches!(&actions[1], Action::PostToWorker(WorkerMessage::MirrorSearch { .. })));
        assert!(state.has_submitted());
    }

    #[test]
    fn empty_submit_only_mirrors() {
        let mut state = state(&[10]);
        let actions = state.submit();
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::PostToWorker(_)));
    }

    #[test]
    fn mirroring_can_be_disabled() {
        let mut state = state(&[10]);
        state.mirror_params = false;
        state.store.set_search_text("dune");
        let actions = state.submit();
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::Fetch(_)));
    }
}
