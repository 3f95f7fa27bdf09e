//! End-to-end search flow through the public API: typing, submitting,
//! paginating, settling host responses and restoring mirrored parameters
//! through the worker.

use booksearch::catalog::FetchRequest;
use booksearch::storage::JsonParamStore;
use booksearch::worker::{BookSearchWorker, WorkerMessage};
use booksearch::{handle_event, initialize, Action, AppState, Config, Event};
use std::num::NonZeroU32;

fn type_and_submit(state: &mut AppState, text: &str) -> Vec<Action> {
    handle_event(state, &Event::ClearInput).unwrap();
    for c in text.chars() {
        handle_event(state, &Event::Char(c)).unwrap();
    }
    handle_event(state, &Event::Submit).unwrap().1
}

fn fetch(actions: &[Action]) -> FetchRequest {
    actions
        .iter()
        .find_map(|action| match action {
            Action::Fetch(request) => Some(request.clone()),
            _ => None,
        })
        .expect("expected a fetch action")
}

fn worker_messages(actions: &[Action]) -> Vec<WorkerMessage> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::PostToWorker(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Delivers a response the way the host does: through the request context.
fn respond(state: &mut AppState, request: &FetchRequest, num_found: u64, titles: &[&str]) -> bool {
    let docs: Vec<_> = titles
        .iter()
        .map(|title| serde_json::json!({ "title": title, "key": format!("/works/{title}") }))
        .collect();
    let body = serde_json::to_vec(&serde_json::json!({ "num_found": num_found, "docs": docs })).unwrap();

    let generation = FetchRequest::generation_from_context(&request.context()).unwrap();
    handle_event(
        state,
        &Event::FetchCompleted {
            generation,
            status: 200,
            body,
        },
    )
    .unwrap()
    .0
}

#[test]
fn last_submitted_search_wins() {
    let mut state = initialize(&Config::default());

    let first = fetch(&type_and_submit(&mut state, "Dune"));
    assert_eq!(first.query, "dune");
    assert_eq!((first.page, first.limit), (1, 10));
    assert!(state.coordinator.is_pending());

    let second = fetch(&type_and_submit(&mut state, "The Lord of the Rings"));
    assert_eq!(second.query, "the+lord+of+the+rings");

    assert!(respond(&mut state, &second, 2, &["The Fellowship", "The Two Towers"]));
    assert!(!respond(&mut state, &first, 1, &["Dune"]));

    let results = state.coordinator.results().unwrap();
    assert_eq!(results.documents.len(), 2);
    assert_eq!(results.documents[0].title, "The Fellowship");
    assert!(!state.coordinator.is_pending());
}

#[test]
fn clearing_the_query_drops_results() {
    let mut state = initialize(&Config::default());
    let request = fetch(&type_and_submit(&mut state, "dune"));
    respond(&mut state, &request, 1, &["Dune"]);
    assert!(state.coordinator.results().is_some());

    let actions = type_and_submit(&mut state, "   ");
    assert!(actions.iter().all(|action| !matches!(action, Action::Fetch(_))));
    assert!(state.coordinator.results().is_none());
    assert!(!state.coordinator.is_pending());
}

#[test]
fn paging_through_results() {
    let mut state = initialize(&Config::default());
    let request = fetch(&type_and_submit(&mut state, "dune"));
    respond(&mut state, &request, 25, &["a"]);
    assert_eq!(state.page_count(), Some(3));

    let (_, actions) = handle_event(&mut state, &Event::NextPage).unwrap();
    let page_two = fetch(&actions);
    assert_eq!(page_two.page, 2);
    respond(&mut state, &page_two, 25, &["b"]);

    let (_, actions) = handle_event(&mut state, &Event::PreviousPage).unwrap();
    assert_eq!(fetch(&actions).page, 1);
    assert_eq!(state.store.current_search().page.get(), state.store.page_index() + 1);
}

#[test]
fn mirrored_search_is_restored_in_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search-params.json");

    let mut state = initialize(&Config::default());
    handle_event(&mut state, &Event::SetPageSize(NonZeroU32::new(25).unwrap())).unwrap();
    let actions = type_and_submit(&mut state, "dune messiah");

    {
        let mut worker = BookSearchWorker::with_store(Box::new(JsonParamStore::new(path.clone()).unwrap()));
        for message in worker_messages(&actions) {
            worker.handle_message(message);
        }
    }

    let mut worker = BookSearchWorker::with_store(Box::new(JsonParamStore::new(path.clone()).unwrap()));
    let loaded = worker.handle_message(WorkerMessage::load_params());

    let mut next_session = initialize(&Config::default());
    let (_, actions) = handle_event(&mut next_session, &Event::WorkerResponse(loaded)).unwrap();

    let request = fetch(&actions);
    assert_eq!(request.query, "dune+messiah");
    assert_eq!((request.page, request.limit), (1, 25));
}

#[test]
fn configured_query_starts_the_search() {
    let config = Config::from_zellij(
        &[("query".to_string(), "searchText=Emma&page=2&pageSize=5".to_string())]
            .into_iter()
            .collect(),
    );
    let mut state = initialize(&config);

    let params = config.initial_query.clone().unwrap();
    let (_, actions) = handle_event(&mut state, &Event::ParamsRestored(params)).unwrap();

    let request = fetch(&actions);
    assert_eq!(request.query, "emma");
    assert_eq!((request.page, request.limit), (2, 5));
}

#[test]
fn forgetting_the_saved_search_empties_the_params_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("search-params.json");
    let mut worker = BookSearchWorker::with_store(Box::new(JsonParamStore::new(path.clone()).unwrap()));

    let config = Config {
        mirror_params: true,
        ..Config::default()
    };
    let mut state = initialize(&config);
    for message in worker_messages(&type_and_submit(&mut state, "emma")) {
        let response = worker.handle_message(message);
        handle_event(&mut state, &Event::WorkerResponse(response)).unwrap();
    }
    assert_eq!(state.stored_params.search_text(), Some("emma"));

    let (_, actions) = handle_event(&mut state, &Event::ClearStored).unwrap();
    for message in worker_messages(&actions) {
        let response = worker.handle_message(message);
        handle_event(&mut state, &Event::WorkerResponse(response)).unwrap();
    }
    assert!(state.stored_params.is_empty());

    let loaded = worker.handle_message(WorkerMessage::load_params());
    let mut next_session = initialize(&Config::default());
    let (_, actions) = handle_event(&mut next_session, &Event::WorkerResponse(loaded)).unwrap();
    assert!(actions.iter().all(|action| !matches!(action, Action::Fetch(_))));
}
