//! Event handling and state transitions.
//!
//! [`handle_event`] is the single entry point from the plugin runtime. It
//! mutates [`AppState`] and returns whether a re-render is needed along with
//! the side effects to perform.
//!
//! Text input only edits the store's fields. Nothing reaches the coordinator
//! until a submit: an explicit [`Event::Submit`], a page change, or restored
//! parameters carrying a real query. A page change made after the text was
//! edited submits the new text on its first page.
//!
//! # Example
//!
//! ```rust
//! use booksearch::{handle_event, initialize, Action, Config, Event};
//!
//! let mut state = initialize(&Config::default());
//! for c in "dune".chars() {
//!     handle_event(&mut state, &Event::Char(c))?;
//! }
//! let (_, actions) = handle_event(&mut state, &Event::Submit)?;
//! assert!(matches!(actions.first(), Some(Action::Fetch(_))));
//! # Ok::<(), booksearch::BookSearchError>(())
//! ```

use crate::app::coordinator::Settlement;
use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::params::QueryParams;
use crate::worker::{WorkerMessage, WorkerResponse};
use std::num::NonZeroU32;

/// Events from user input, the host's web request results, or the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Appends a character to the search text.
    Char(char),
    /// Removes the last character of the search text.
    Backspace,
    /// Empties the search text without submitting.
    ClearInput,
    /// Submits the search text starting from the first page.
    Submit,

    /// Moves to the next result page, if there is one.
    NextPage,
    /// Moves to the previous result page, if there is one.
    PreviousPage,
    /// Jumps back to the first result page.
    FirstPage,
    /// Switches to the next configured page size.
    CyclePageSize,
    /// Switches to an explicit page size.
    SetPageSize(NonZeroU32),

    /// Parameters from an external source (plugin configuration or the
    /// persisted file) to initialize the store with.
    ParamsRestored(QueryParams),

    /// A catalog web request finished.
    FetchCompleted {
        /// Generation recovered from the request context.
        generation: u64,
        /// HTTP status code reported by the host.
        status: u16,
        /// Raw response body.
        body: Vec<u8>,
    },

    /// Wraps a response from the parameter worker.
    WorkerResponse(WorkerResponse),

    /// Forgets the persisted search parameters.
    ClearStored,

    /// Closes the plugin pane.
    CloseFocus,
}

/// Processes an event, mutates state, and returns `(render, actions)`.
///
/// # Errors
///
/// Currently infallible; fetch and worker failures are absorbed into state
/// and logged rather than propagated.
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event_name(event)).entered();

    match event {
        Event::Char(c) => {
            state.store.search_text_mut().push(*c);
            tracing::trace!(search_text = %state.store.search_text(), "search text updated");
            Ok((true, vec![]))
        }
        Event::Backspace => {
            let removed = state.store.search_text_mut().pop().is_some();
            Ok((removed, vec![]))
        }
        Event::ClearInput => {
            let had_text = !state.store.search_text().is_empty();
            state.store.set_search_text(String::new());
            Ok((had_text, vec![]))
        }
        Event::Submit => {
            state.store.set_page(0);
            Ok((true, state.submit()))
        }
        Event::NextPage => {
            let page_index = state.store.page_index();
            let page_count = state.page_count().unwrap_or(0);

            if !state.text_edited() && u64::from(page_index) + 1 >= page_count {
                tracing::debug!(page_index, page_count, "already on last page");
                return Ok((false, vec![]));
            }

            let actions = state.paginate(page_index.saturating_add(1), state.store.page_size());
            Ok((!actions.is_empty(), actions))
        }
        Event::PreviousPage => {
            let previous = state.store.page_index().checked_sub(1);
            let Some(page_index) = previous.or_else(|| state.text_edited().then_some(0)) else {
                tracing::debug!("already on first page");
                return Ok((false, vec![]));
            };

            let actions = state.paginate(page_index, state.store.page_size());
            Ok((!actions.is_empty(), actions))
        }
        Event::FirstPage => {
            let actions = state.paginate(0, state.store.page_size());
            Ok((!actions.is_empty(), actions))
        }
        Event::CyclePageSize => {
            let next = state.next_page_size(state.store.page_size());
            Ok(change_page_size(state, next))
        }
        Event::SetPageSize(page_size) => Ok(change_page_size(state, *page_size)),
        Event::ParamsRestored(params) => Ok(restore(state, params)),
        Event::FetchCompleted {
            generation,
            status,
            body,
        } => {
            let settlement = state.coordinator.complete(*generation, *status, body);
            Ok((settlement != Settlement::Stale, vec![]))
        }
        Event::WorkerResponse(response) => Ok(handle_worker_response(state, response)),
        Event::ClearStored => {
            tracing::debug!("clearing stored parameters");
            Ok((false, vec![Action::PostToWorker(WorkerMessage::clear_params())]))
        }
        Event::CloseFocus => Ok((false, vec![Action::CloseFocus])),
    }
}

fn change_page_size(state: &mut AppState, page_size: NonZeroU32) -> (bool, Vec<Action>) {
    let old_size = state.store.page_size();
    let page_index = AppState::remap_page_index(state.store.page_index(), old_size, page_size);

    tracing::debug!(
        old_size = old_size.get(),
        new_size = page_size.get(),
        page_index,
        "changing page size"
    );

    let actions = state.paginate(page_index, page_size);
    (!actions.is_empty(), actions)
}

fn restore(state: &mut AppState, params: &QueryParams) -> (bool, Vec<Action>) {
    if state.store.restore(params) {
        (true, state.submit())
    } else {
        (true, vec![])
    }
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> (bool, Vec<Action>) {
    match response {
        WorkerResponse::ParamsLoaded { params } => {
            tracing::debug!(param_count = params.len(), "stored parameters loaded");
            state.stored_params = params.clone();

            if state.has_submitted() || !state.store.search_text().is_empty() {
                tracing::debug!("user input present, not restoring stored parameters");
                return (true, vec![]);
            }
            restore(state, params)
        }
        WorkerResponse::SearchMirrored { params } => {
            tracing::trace!(param_count = params.len(), "search mirrored");
            state.stored_params = params.clone();
            (false, vec![])
        }
        WorkerResponse::ParamsCleared => {
            state.stored_params = QueryParams::default();
            (true, vec![])
        }
        WorkerResponse::Error { message } => {
            tracing::warn!(error = %message, "worker operation failed");
            (false, vec![])
        }
    }
}

/// Short label for span fields; avoids dumping response bodies.
const fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Char(_) => "char",
        Event::Backspace => "backspace",
        Event::ClearInput => "clear_input",
        Event::Submit => "submit",
        Event::NextPage => "next_page",
        Event::PreviousPage => "previous_page",
        Event::FirstPage => "first_page",
        Event::CyclePageSize => "cycle_page_size",
        Event::SetPageSize(_) => "set_page_size",
        Event::ParamsRestored(_) => "params_restored",
        Event::FetchCompleted { .. } => "fetch_completed",
        Event::WorkerResponse(_) => "worker_response",
        Event::ClearStored => "clear_stored",
        Event::CloseFocus => "close_focus",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{QueryStore, SearchCoordinator};
    use crate::catalog::FetchRequest;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            QueryStore::new(size(10)),
            SearchCoordinator::default(),
            vec![size(5), size(10), size(25)],
            false,
        )
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_event(state, &Event::Char(c)).unwrap();
        }
    }

    fn fetch_of(actions: &[Action]) -> &FetchRequest {
        actions
            .iter()
            .find_map(|action| match action {
                Action::Fetch(request) => Some(request),
                _ => None,
            })
            .expect("expected a fetch action")
    }

    fn body(total: u64, titles: &[&str]) -> Vec<u8> {
        let docs: Vec<_> = titles
            .iter()
            .map(|title| serde_json::json!({ "title": title, "key": format!("/works/{title}") }))
            .collect();
        serde_json::to_vec(&serde_json::json!({ "numFound": total, "docs": docs })).unwrap()
    }

    fn complete(state: &mut AppState, request: &FetchRequest, total: u64, titles: &[&str]) -> bool {
        let event = Event::FetchCompleted {
            generation: request.generation,
            status: 200,
            body: body(total, titles),
        };
        handle_event(state, &event).unwrap().0
    }

    #[test]
    fn typing_does_not_fetch() {
        let mut state = state();
        type_text(&mut state, "dune");
        assert_eq!(state.store.search_text(), "dune");
        assert_eq!(state.coordinator.generation(), 1);
        assert!(!state.coordinator.is_pending());
    }

    #[test]
    fn submit_fetches_first_page() {
        let mut state = state();
        type_text(&mut state, "Lord of the Rings");
        let (render, actions) = handle_event(&mut state, &Event::Submit).unwrap();

        assert!(render);
        let request = fetch_of(&actions);
        assert_eq!(request.query, "lord+of+the+rings");
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 10);
        assert!(state.coordinator.is_pending());
    }

    #[test]
    fn new_submit_resets_page() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        complete(&mut state, fetch_of(&actions), 40, &["a"]);
        handle_event(&mut state, &Event::NextPage).unwrap();
        assert_eq!(state.store.page_index(), 1);

        handle_event(&mut state, &Event::ClearInput).unwrap();
        type_text(&mut state, "emma");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        assert_eq!(fetch_of(&actions).page, 1);
    }

    #[test]
    fn next_page_is_bounded_by_page_count() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        complete(&mut state, fetch_of(&actions), 15, &["a"]);

        let (_, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
        let request = fetch_of(&actions).clone();
        assert_eq!(request.page, 2);
        complete(&mut state, &request, 15, &["b"]);

        let (render, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn next_page_without_results_is_ignored() {
        let mut state = state();
        let (render, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn previous_page_stops_at_first() {
        let mut state = state();
        let (render, actions) = handle_event(&mut state, &Event::PreviousPage).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn first_page_on_first_page_does_not_resubmit() {
        let mut state = state();
        type_text(&mut state, "dune");
        handle_event(&mut state, &Event::Submit).unwrap();
        let generation = state.coordinator.generation();

        let (_, actions) = handle_event(&mut state, &Event::FirstPage).unwrap();
        assert!(actions.is_empty());
        assert_eq!(state.coordinator.generation(), generation);
    }

    #[test]
    fn cycling_page_size_refetches_with_new_limit() {
        let mut state = state();
        type_text(&mut state, "dune");
        handle_event(&mut state, &Event::Submit).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::CyclePageSize).unwrap();
        let request = fetch_of(&actions);
        assert_eq!(request.limit, 25);
        assert_eq!(request.page, 1);
    }

    #[test]
    fn paging_after_editing_the_text_starts_the_new_query_on_page_one() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        complete(&mut state, fetch_of(&actions), 40, &["a"]);

        type_text(&mut state, " messiah");
        let (render, actions) = handle_event(&mut state, &Event::NextPage).unwrap();

        assert!(render);
        let request = fetch_of(&actions);
        assert_eq!(request.query, "dune+messiah");
        assert_eq!(request.page, 1);
        assert_eq!(state.store.page_index(), 0);
    }

    #[test]
    fn previous_page_on_first_page_submits_edited_text() {
        let mut state = state();
        type_text(&mut state, "dune");
        handle_event(&mut state, &Event::Submit).unwrap();
        type_text(&mut state, "s");

        let (_, actions) = handle_event(&mut state, &Event::PreviousPage).unwrap();
        let request = fetch_of(&actions);
        assert_eq!(request.query, "dunes");
        assert_eq!(request.page, 1);
    }

    #[test]
    fn page_size_change_after_editing_the_text_starts_on_page_one() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        complete(&mut state, fetch_of(&actions), 100, &["a"]);
        let (_, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
        let request = fetch_of(&actions).clone();
        complete(&mut state, &request, 100, &["a"]);

        handle_event(&mut state, &Event::ClearInput).unwrap();
        type_text(&mut state, "emma");
        let (_, actions) = handle_event(&mut state, &Event::SetPageSize(size(5))).unwrap();

        let request = fetch_of(&actions);
        assert_eq!(request.query, "emma");
        assert_eq!((request.page, request.limit), (1, 5));
    }

    #[test]
    fn set_page_size_keeps_first_item_visible() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        complete(&mut state, fetch_of(&actions), 100, &["a"]);
        for _ in 0..3 {
            let (_, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
            let request = fetch_of(&actions).clone();
            complete(&mut state, &request, 100, &["a"]);
        }
        assert_eq!(state.store.page_index(), 3);

        let (_, actions) = handle_event(&mut state, &Event::SetPageSize(size(5))).unwrap();
        let request = fetch_of(&actions);
        assert_eq!(request.page, 7);
        assert_eq!(request.limit, 5);
    }

    #[test]
    fn stale_completion_does_not_render() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, first) = handle_event(&mut state, &Event::Submit).unwrap();
        let first = fetch_of(&first).clone();

        type_text(&mut state, " messiah");
        let (_, second) = handle_event(&mut state, &Event::Submit).unwrap();
        let second = fetch_of(&second).clone();

        assert!(!complete(&mut state, &first, 1, &["old"]));
        assert!(state.coordinator.results().is_none());
        assert!(state.coordinator.is_pending());

        assert!(complete(&mut state, &second, 1, &["new"]));
        let results = state.coordinator.results().unwrap();
        assert_eq!(results.documents[0].title, "new");
        assert!(!state.coordinator.is_pending());
    }

    #[test]
    fn failed_fetch_keeps_previous_results() {
        let mut state = state();
        type_text(&mut state, "dune");
        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        complete(&mut state, fetch_of(&actions), 1, &["kept"]);

        let (_, actions) = handle_event(&mut state, &Event::Submit).unwrap();
        let failed = Event::FetchCompleted {
            generation: fetch_of(&actions).generation,
            status: 503,
            body: b"unavailable".to_vec(),
        };
        let (render, _) = handle_event(&mut state, &failed).unwrap();

        assert!(render);
        assert!(!state.coordinator.is_pending());
        assert_eq!(state.coordinator.results().unwrap().documents[0].title, "kept");
        assert!(state.coordinator.last_error().is_some());
    }

    #[test]
    fn restored_query_auto_submits_on_its_page() {
        let mut state = state();
        let params = QueryParams::from_query_string("searchText=dune&page=3&pageSize=25");
        let (_, actions) = handle_event(&mut state, &Event::ParamsRestored(params)).unwrap();

        let request = fetch_of(&actions);
        assert_eq!(request.page, 3);
        assert_eq!(request.limit, 25);
    }

    #[test]
    fn restored_params_without_query_do_not_submit() {
        let mut state = state();
        let params = QueryParams::from_query_string("pageSize=25");
        let (_, actions) = handle_event(&mut state, &Event::ParamsRestored(params)).unwrap();

        assert!(actions.is_empty());
        assert_eq!(state.store.page_size(), size(25));
    }

    #[test]
    fn loaded_params_are_ignored_after_a_submit() {
        let mut state = state();
        type_text(&mut state, "emma");
        handle_event(&mut state, &Event::Submit).unwrap();

        let loaded = WorkerResponse::ParamsLoaded {
            params: QueryParams::from_query_string("searchText=dune"),
        };
        let (_, actions) = handle_event(&mut state, &Event::WorkerResponse(loaded)).unwrap();

        assert!(actions.is_empty());
        assert_eq!(state.store.current_search().search_text, "emma");
        assert_eq!(state.stored_params.search_text(), Some("dune"));
    }

    #[test]
    fn loaded_params_do_not_replace_unsubmitted_typing() {
        let mut state = state();
        type_text(&mut state, "emma");

        let loaded = WorkerResponse::ParamsLoaded {
            params: QueryParams::from_query_string("searchText=dune&page=4"),
        };
        let (_, actions) = handle_event(&mut state, &Event::WorkerResponse(loaded)).unwrap();

        assert!(actions.is_empty());
        assert_eq!(state.store.search_text(), "emma");
        assert_eq!(state.store.page_index(), 0);
        assert!(!state.has_submitted());
        assert_eq!(state.stored_params.search_text(), Some("dune"));
    }

    #[test]
    fn loaded_params_restore_before_any_submit() {
        let mut state = state();
        state.mirror_params = true;
        let loaded = WorkerResponse::ParamsLoaded {
            params: QueryParams::from_query_string("searchText=dune"),
        };
        let (_, actions) = handle_event(&mut state, &Event::WorkerResponse(loaded)).unwrap();

        assert_eq!(fetch_of(&actions).query, "dune");
        assert!(actions
            .iter()
            .any(|action| matches!(action, Action::PostToWorker(WorkerMessage::MirrorSearch { .. }))));
    }

    #[test]
    fn clear_stored_asks_the_worker_to_forget_params() {
        let mut state = state();
        state.stored_params = QueryParams::from_query_string("searchText=dune");

        let (_, actions) = handle_event(&mut state, &Event::ClearStored).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::ClearParams { .. })]
        ));

        let (render, _) =
            handle_event(&mut state, &Event::WorkerResponse(WorkerResponse::ParamsCleared)).unwrap();
        assert!(render);
        assert!(state.stored_params.is_empty());
    }

    #[test]
    fn close_focus_emits_action() {
        let mut state = state();
        let (render, actions) = handle_event(&mut state, &Event::CloseFocus).unwrap();
        assert!(!render);
        assert_eq!(actions, vec![Action::CloseFocus]);
    }
}
