//! Zellij plugin entry point.
//!
//! Thin layer between Zellij and the booksearch library: it maps host
//! events onto [`Event`]s, executes the returned [`Action`]s (web requests,
//! worker messages, hiding the pane) and prints a plain text view.
//!
//! ```text
//! ┌─────────────────────────────┐
//! │   Zellij plugin thread      │
//! │   State ── web_request ───────► catalog API
//! │     ▲  ◄── WebRequestResult ──┘
//! │     │ JSON                  │
//! │     ▼                       │
//! │   BookSearchWorker          │  ← search-params.json
//! └─────────────────────────────┘
//! ```
//!
//! # Keybindings
//!
//! - characters: edit the search text
//! - `Enter`: submit
//! - `Backspace` / `Ctrl+u`: delete a character / clear the text
//! - `Right`, `PageDown` / `Left`, `PageUp`: next / previous page
//! - `Home`: first page
//! - `Tab`: cycle page size
//! - `Ctrl+x`: forget the saved search
//! - `Esc`: hide the plugin

#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use zellij_tile::prelude::*;
use zellij_tile::shim::post_message_to;

use booksearch::catalog::FetchRequest;
use booksearch::worker::{BookSearchWorker, WorkerMessage, WorkerResponse};
use booksearch::app::SearchView;
use booksearch::{handle_event, Action, AppState, Config, Event};

register_plugin!(State);
register_worker!(BookSearchWorker, booksearch_worker, BOOKSEARCH_WORKER);

const WORKER_NAME: &str = "booksearch";

struct State {
    app: AppState,
    config: Config,
}

impl Default for State {
    fn default() -> Self {
        let config = Config::default();
        Self {
            app: booksearch::initialize(&config),
            config,
        }
    }
}

impl ZellijPlugin for State {
    fn load(&mut self, configuration: BTreeMap<String, String>) {
        let config = Config::from_zellij(&configuration);
        booksearch::observability::init_tracing(&config);

        let _span = tracing::debug_span!("plugin_load").entered();
        self.app = booksearch::initialize(&config);
        self.config = config;

        request_permission(&[PermissionType::WebAccess, PermissionType::FullHdAccess]);
        subscribe(&[
            EventType::Key,
            EventType::WebRequestResult,
            EventType::CustomMessage,
            EventType::PermissionRequestResult,
        ]);

        tracing::debug!("plugin loaded, waiting for permissions");
    }

    fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
        let _span = tracing::debug_span!("plugin_update").entered();

        let our_event = match event {
            zellij_tile::prelude::Event::Key(ref key) => match map_key_event(key) {
                Some(event) => event,
                None => return false,
            },
            zellij_tile::prelude::Event::WebRequestResult(status, _headers, body, context) => {
                let Some(generation) = FetchRequest::generation_from_context(&context) else {
                    tracing::debug!(status, "ignoring untagged web request result");
                    return false;
                };
                Event::FetchCompleted {
                    generation,
                    status,
                    body,
                }
            }
            zellij_tile::prelude::Event::CustomMessage(message, payload) => {
                match map_custom_message(&message, &payload) {
                    Some(event) => event,
                    None => return false,
                }
            }
            zellij_tile::prelude::Event::PermissionRequestResult(status) => {
                match self.handle_permission_result(status) {
                    Some(event) => event,
                    None => return false,
                }
            }
            _ => return false,
        };

        self.dispatch(&our_event)
    }

    fn render(&mut self, _rows: usize, cols: usize) {
        render_text(&self.app, cols);
    }
}

impl State {
    fn dispatch(&mut self, event: &Event) -> bool {
        match handle_event(&mut self.app, event) {
            Ok((should_render, actions)) => {
                tracing::debug!(action_count = actions.len(), should_render, "event handled");
                for action in &actions {
                    execute_action(action);
                }
                should_render
            }
            Err(e) => {
                tracing::warn!(error = %e, "error handling event");
                false
            }
        }
    }

    /// Restores the configured query if there is one, otherwise asks the
    /// worker for the persisted parameters.
    fn handle_permission_result(&self, status: PermissionStatus) -> Option<Event> {
        match status {
            PermissionStatus::Granted => {
                tracing::debug!("permissions granted");
                if let Some(params) = &self.config.initial_query {
                    return Some(Event::ParamsRestored(params.clone()));
                }
                post_worker_message(&WorkerMessage::load_params());
                None
            }
            PermissionStatus::Denied => {
                tracing::warn!("permissions denied, catalog search unavailable");
                None
            }
        }
    }
}

fn map_key_event(key: &KeyWithModifier) -> Option<Event> {
    if key.has_modifiers(&[KeyModifier::Ctrl]) {
        return match key.bare_key {
            BareKey::Char('u') => Some(Event::ClearInput),
            BareKey::Char('x') => Some(Event::ClearStored),
            _ => None,
        };
    }

    Some(match key.bare_key {
        BareKey::Enter => Event::Submit,
        BareKey::Backspace => Event::Backspace,
        BareKey::Right | BareKey::PageDown => Event::NextPage,
        BareKey::Left | BareKey::PageUp => Event::PreviousPage,
        BareKey::Home => Event::FirstPage,
        BareKey::Tab => Event::CyclePageSize,
        BareKey::Esc => Event::CloseFocus,
        BareKey::Char(c) => Event::Char(c),
        _ => return None,
    })
}

fn map_custom_message(message: &str, payload: &str) -> Option<Event> {
    if message != WORKER_NAME {
        tracing::debug!(message_name = %message, "ignoring custom message with unknown name");
        return None;
    }

    match serde_json::from_str::<WorkerResponse>(payload) {
        Ok(response) => Some(Event::WorkerResponse(response)),
        Err(e) => {
            tracing::debug!(error = %e, "failed to deserialize worker response");
            None
        }
    }
}

fn post_worker_message(message: &WorkerMessage) {
    match serde_json::to_string(message) {
        Ok(payload) => post_message_to(PluginMessage {
            worker_name: Some(WORKER_NAME.to_string()),
            name: WORKER_NAME.to_string(),
            payload,
        }),
        Err(e) => tracing::debug!(error = %e, "failed to serialize worker message"),
    }
}

#[tracing::instrument(level = "debug")]
fn execute_action(action: &Action) {
    match action {
        Action::CloseFocus => hide_self(),
        Action::Fetch(request) => {
            tracing::debug!(generation = request.generation, url = %request.url, "issuing catalog request");
            web_request(
                request.url.as_str(),
                HttpVerb::Get,
                BTreeMap::new(),
                vec![],
                request.context(),
            );
        }
        Action::PostToWorker(message) => post_worker_message(message),
    }
}

fn render_text(app: &AppState, cols: usize) {
    for line in SearchView::from_state(app).lines(cols) {
        println!("{line}");
    }
}
