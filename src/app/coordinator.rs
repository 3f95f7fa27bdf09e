//! Search coordinator.
//!
//! Watches the query store's published [`CurrentSearch`], turns each new
//! value into a catalog [`FetchRequest`], tracks whether a request is
//! pending, and republishes the latest result.
//!
//! # Switch semantics
//!
//! The host cannot cancel a web request once issued, so the coordinator
//! keeps a monotonically increasing generation. Every observed search bumps
//! it, and only a completion carrying the in-flight generation may touch
//! `results` or the pending flag. Late answers for superseded searches are
//! dropped as [`Settlement::Stale`].
//!
//! ```text
//! search(A) gen=1 ─► pending=true ─┐
//! search(B) gen=2 ─► pending=true  │   (A superseded)
//! complete(gen=1) ─► Stale ◄───────┘   results untouched
//! complete(gen=2) ─► Applied           results=B, pending=false
//! ```

use crate::catalog::{parse_response, CatalogClient, FetchRequest};
use crate::domain::{CurrentSearch, Result, SearchResult};
use crate::published::{Published, SubscriptionId};

/// Outcome of feeding a fetch completion to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The latest request succeeded and its result was published.
    Applied,
    /// The latest request failed; previous results stay in place.
    Failed,
    /// The completion belongs to a superseded request and was ignored.
    Stale,
}

/// Maps published searches to catalog fetches and tracks their lifecycle.
#[derive(Debug)]
pub struct SearchCoordinator {
    catalog: CatalogClient,
    generation: u64,
    in_flight: Option<u64>,
    seen_version: Option<u64>,
    results: Published<Option<SearchResult>>,
    pending: Published<bool>,
    last_error: Option<String>,
}

impl SearchCoordinator {
    /// Creates an idle coordinator: no results, not pending, generation 0.
    ///
    /// # Parameters
    ///
    /// * `catalog` - Builds the fetch request for each search
    #[must_use]
    pub fn new(catalog: CatalogClient) -> Self {
        Self {
            catalog,
            generation: 0,
            in_flight: None,
            seen_version: None,
            results: Published::new(None),
            pending: Published::new(false),
            last_error: None,
        }
    }

    /// Reacts to a new value of the store's published search.
    ///
    /// Each published version is handled once; calling again without a new
    /// submit returns `None`. The store's initial value (version 0) is
    /// handled like any other and, being empty, publishes `None`.
    pub fn observe(&mut self, current: &Published<CurrentSearch>) -> Option<FetchRequest> {
        if self.seen_version == Some(current.version()) {
            return None;
        }
        self.seen_version = Some(current.version());
        self.search(current.get())
    }

    /// Starts a search, superseding any request still in flight.
    ///
    /// Empty text publishes `None` (no active query) and returns no request.
    pub fn search(&mut self, search: &CurrentSearch) -> Option<FetchRequest> {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        if let Some(superseded) = self.in_flight.take() {
            tracing::debug!(superseded, generation, "superseding in-flight search");
        }

        if search.is_empty() {
            tracing::debug!(generation, "empty search, clearing results");
            self.pending.publish_if_changed(false);
            self.results.publish(None);
            return None;
        }

        let request = self.catalog.request(search, generation);
        tracing::debug!(
            generation,
            query = %request.query,
            page = request.page,
            limit = request.limit,
            "dispatching catalog search"
        );

        self.in_flight = Some(generation);
        self.pending.publish_if_changed(true);
        Some(request)
    }

    /// Settles the request tagged `generation` with `outcome`.
    ///
    /// # Parameters
    ///
    /// * `generation` - Tag of the request being answered
    /// * `outcome` - Decoded result, or the transport/parse failure
    ///
    /// # Returns
    ///
    /// [`Settlement::Stale`] when `generation` is not the request in flight;
    /// nothing is published in that case.
    pub fn settle(&mut self, generation: u64, outcome: Result<SearchResult>) -> Settlement {
        if self.in_flight != Some(generation) {
            tracing::debug!(
                generation,
                in_flight = ?self.in_flight,
                succeeded = outcome.is_ok(),
                "dropping stale search completion"
            );
            return Settlement::Stale;
        }

        self.in_flight = None;
        self.pending.publish_if_changed(false);

        match outcome {
            Ok(result) => {
                tracing::debug!(
                    generation,
                    total_found = result.total_found,
                    documents = result.documents.len(),
                    "search completed"
                );
                self.last_error = None;
                self.results.publish(Some(result));
                Settlement::Applied
            }
            Err(e) => {
                tracing::error!(generation, error = %e, "search failed");
                self.last_error = Some(e.to_string());
                Settlement::Failed
            }
        }
    }

    /// Decodes a raw host response and settles it.
    pub fn complete(&mut self, generation: u64, status: u16, body: &[u8]) -> Settlement {
        self.settle(generation, parse_response(status, body))
    }

    /// Latest results; `None` means no active query.
    #[must_use]
    pub const fn results(&self) -> Option<&SearchResult> {
        self.results.get().as_ref()
    }

    /// Observes published results; the latest value is replayed immediately.
    pub fn subscribe_results<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Option<SearchResult>) + 'static,
    {
        self.results.subscribe(observer)
    }

    /// Whether the latest search still awaits its response.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        *self.pending.get()
    }

    /// Observes the pending flag; the latest value is replayed immediately.
    pub fn subscribe_pending<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&bool) + 'static,
    {
        self.pending.subscribe(observer)
    }

    /// Generation of the request currently awaited, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Generation of the most recent search, including empty ones.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Message of the most recent failure, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new(CatalogClient::default())
    }
}
