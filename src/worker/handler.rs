//! Parameter worker.
//!
//! Runs on a Zellij worker thread and owns the [`ParamStore`], keeping file
//! I/O off the plugin's event thread. The store is opened lazily on the
//! first message.

use crate::domain::error::{BookSearchError, Result};
use crate::infrastructure::paths;
use crate::storage::{JsonParamStore, ParamStore};
use crate::worker::{WorkerMessage, WorkerResponse};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use zellij_tile::prelude::{PluginMessage, ZellijWorker};
use zellij_tile::shim::post_message_to_plugin;

/// File name of the mirrored parameters inside the data directory.
pub const PARAMS_FILE_NAME: &str = "search-params.json";

static WORKER_TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Worker state. Zellij requires the worker to be (de)serializable; the
/// store itself is never serialized.
#[derive(Serialize, Deserialize, Default)]
pub struct BookSearchWorker {
    #[serde(skip)]
    store: Option<Box<dyn ParamStore>>,
}

impl BookSearchWorker {
    /// Creates a worker backed by the given store.
    #[must_use]
    pub fn with_store(store: Box<dyn ParamStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Opens the default JSON store in the plugin data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn open_default() -> Result<Self> {
        let path = paths::get_data_dir().join(PARAMS_FILE_NAME);
        Ok(Self::with_store(Box::new(JsonParamStore::new(path)?)))
    }

    fn store(&mut self) -> Result<&mut Box<dyn ParamStore>> {
        self.store
            .as_mut()
            .ok_or_else(|| BookSearchError::Worker("parameter store not initialized".to_string()))
    }

    fn respond<T, F>(operation: &str, result: Result<T>, on_success: F) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation, "storage operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "storage operation failed");
                WorkerResponse::Error {
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    /// Re-attaches the plugin's trace context so worker spans link to it.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;
        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        Some(
            opentelemetry::Context::current()
                .with_remote_span_context(span_context)
                .attach(),
        )
    }

    /// Processes one request and produces its response.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);
        let _span = tracing::debug_span!("worker_handle_message", message_type = ?message).entered();

        match message {
            WorkerMessage::LoadParams { .. } => Self::respond(
                "load params",
                self.store().and_then(|store| store.load_params()),
                |params| WorkerResponse::ParamsLoaded { params },
            ),
            WorkerMessage::MirrorSearch { search, .. } => Self::respond(
                "mirror search",
                self.store().and_then(|store| store.mirror_search(&search)),
                |params| WorkerResponse::SearchMirrored { params },
            ),
            WorkerMessage::ClearParams { .. } => Self::respond(
                "clear params",
                self.store().and_then(|store| store.clear()),
                |()| WorkerResponse::ParamsCleared,
            ),
        }
    }
}

fn post_response(name: String, response: &WorkerResponse) {
    match serde_json::to_string(response) {
        Ok(payload) => post_message_to_plugin(PluginMessage {
            name,
            payload,
            worker_name: None,
        }),
        Err(e) => tracing::debug!(error = %e, "failed to serialize worker response"),
    }
}

impl ZellijWorker<'_> for BookSearchWorker {
    fn on_message(&mut self, message: String, payload: String) {
        if !WORKER_TRACING_INITIALIZED.swap(true, Ordering::Relaxed) {
            crate::observability::init_tracing(&crate::Config::default());
        }

        if self.store.is_none() {
            match Self::open_default() {
                Ok(worker) => self.store = worker.store,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open parameter store");
                    post_response(
                        message,
                        &WorkerResponse::Error {
                            message: format!("failed to open parameter store: {e}"),
                        },
                    );
                    return;
                }
            }
        }

        let request: WorkerMessage = match serde_json::from_str(&payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "failed to deserialize worker message");
                return;
            }
        };

        let response = self.handle_message(request);
        post_response(message, &response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurrentSearch;
    use std::num::NonZeroU32;

    fn worker_in(dir: &tempfile::TempDir) -> BookSearchWorker {
        let store = JsonParamStore::new(dir.path().join(PARAMS_FILE_NAME)).unwrap();
        BookSearchWorker::with_store(Box::new(store))
    }

    #[test]
    fn mirror_then_load_returns_search_params() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker_in(&dir);
        let search = CurrentSearch::new("dune", NonZeroU32::new(20).unwrap(), NonZeroU32::new(2).unwrap());

        let mirrored = worker.handle_message(WorkerMessage::mirror_search(search));
        let WorkerResponse::SearchMirrored { params } = mirrored else {
            panic!("unexpected response: {mirrored:?}");
        };
        assert_eq!(params.to_query_string(), "page=2&pageSize=20&searchText=dune");

        let loaded = worker.handle_message(WorkerMessage::load_params());
        assert_eq!(loaded, WorkerResponse::ParamsLoaded { params });
    }

    #[test]
    fn clear_reports_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = worker_in(&dir);
        assert_eq!(
            worker.handle_message(WorkerMessage::clear_params()),
            WorkerResponse::ParamsCleared
        );
    }

    #[test]
    fn missing_store_yields_error_response() {
        let mut worker = BookSearchWorker::default();
        let response = worker.handle_message(WorkerMessage::load_params());
        assert!(matches!(response, WorkerResponse::Error { message } if message.contains("not initialized")));
    }
}
