//! Booksearch: a Zellij plugin for searching the Open Library catalog.
//!
//! The core is two small state holders wired together:
//!
//! - a **query store** that keeps the search text, page index and page size
//!   as independent fields and publishes a [`CurrentSearch`] snapshot only on
//!   submit;
//! - a **search coordinator** that observes those snapshots, issues catalog
//!   fetches, tracks whether one is pending and republishes the latest
//!   result, discarding answers for searches that have been superseded.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Zellij plugin shim (main.rs)                        │
//! │  keys / WebRequestResult / worker messages → Event   │
//! └──────────────────────────────────────────────────────┘
//!                           │
//! ┌──────────────────────────────────────────────────────┐
//! │  app/                                                │
//! │  handle_event → QueryStore ─publish→ SearchCoordinator│
//! │             → Action::{Fetch, PostToWorker, ...}     │
//! └──────────────────────────────────────────────────────┘
//!        │                    │                    │
//! ┌─────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ catalog/    │   │ params, storage/ │   │ worker/      │
//! │ URLs, JSON  │   │ query params,    │   │ file I/O off │
//! │ decoding    │   │ JSON file        │   │ the UI thread│
//! └─────────────┘   └──────────────────┘   └──────────────┘
//!        │                    │                    │
//! ┌──────────────────────────────────────────────────────┐
//! │  domain/, published, infrastructure/, observability/ │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/booksearch.wasm" {
//!         default_page_size "10"
//!         page_size_options "5,10,25,50"
//!         api_url "https://openlibrary.org/search.json"
//!         mirror_params "true"
//!         query "searchText=dune&page=1"
//!         config_file "~/.config/booksearch.toml"
//!         trace_level "info"
//!     }
//! }
//! ```
//!
//! `config_file` points at a TOML file with the same page size, API and
//! mirroring keys. Values given directly in the plugin block win.
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
//! let Some(Action::Fetch(request)) = actions.first() else { unreachable!() };
//! assert_eq!(request.page, 1);
//! # Ok::<(), booksearch::BookSearchError>(())
//! ```

pub mod app;
pub mod catalog;
pub mod domain;
pub mod infrastructure;
pub mod params;
pub mod published;
pub mod storage;
pub mod worker;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, QueryStore, SearchCoordinator, Settlement};
pub use domain::{BookSearchError, CurrentSearch, Document, Result, SearchResult};
pub use params::QueryParams;
pub use published::Published;

use catalog::{CatalogClient, DEFAULT_BASE_URL};
use domain::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroU32;

const DEFAULT_PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 25, 50];

/// Plugin configuration.
///
/// Built from Zellij's plugin configuration map, optionally layered on top
/// of a TOML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Page size used until the user picks another. Default: 10
    pub default_page_size: NonZeroU32,

    /// Page sizes offered when cycling, ascending and always containing
    /// `default_page_size`. Default: `5, 10, 25, 50`
    pub page_size_options: Vec<NonZeroU32>,

    /// Catalog search endpoint.
    pub api_url: String,

    /// Whether submitted searches are persisted for the next session.
    /// Default: `true`
    pub mirror_params: bool,

    /// Parameters to start from instead of the persisted ones.
    pub initial_query: Option<QueryParams>,

    /// TOML file merged underneath the plugin configuration.
    pub config_file: Option<String>,

    /// `EnvFilter` directive for tracing. Default: `"info"`
    pub trace_level: Option<String>,

    /// Problems found while building the configuration. Logged by
    /// [`initialize`], since tracing is not yet installed while parsing.
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS
                .iter()
                .filter_map(|&n| NonZeroU32::new(n))
                .collect(),
            api_url: DEFAULT_BASE_URL.to_string(),
            mirror_params: true,
            initial_query: None,
            config_file: None,
            trace_level: None,
            warnings: Vec::new(),
        }
    }
}

/// TOML configuration file contents. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    default_page_size: Option<u32>,
    page_size_options: Option<Vec<u32>>,
    api_url: Option<String>,
    mirror_params: Option<bool>,
}

impl Config {
    /// Parses Zellij's configuration map.
    ///
    /// Never fails: malformed values fall back to defaults and are recorded
    /// in [`Config::warnings`].
    ///
    /// ```rust
    /// use booksearch::Config;
    /// use std::collections::BTreeMap;
    ///
    /// let map = BTreeMap::from([
    ///     ("default_page_size".to_string(), "25".to_string()),
    ///     ("mirror_params".to_string(), "false".to_string()),
    /// ]);
    /// let config = Config::from_zellij(&map);
    /// assert_eq!(config.default_page_size.get(), 25);
    /// assert!(!config.mirror_params);
    /// ```
    #[must_use]
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Self {
        let mut parsed = Self::default();

        if let Some(path) = config.get("config_file").filter(|p| !p.trim().is_empty()) {
            parsed.config_file = Some(path.clone());
            if let Err(e) = parsed.merge_file(path) {
                parsed.warnings.push(format!("config file {path}: {e}"));
            }
        }

        if let Some(raw) = config.get("default_page_size") {
            match parse_page_size(raw) {
                Some(size) => parsed.default_page_size = size,
                None => parsed.warnings.push(format!("invalid default_page_size {raw:?}")),
            }
        }

        if let Some(raw) = config.get("page_size_options") {
            let options: Option<Vec<NonZeroU32>> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_page_size)
                .collect();
            match options {
                Some(options) if !options.is_empty() => parsed.page_size_options = options,
                _ => parsed.warnings.push(format!("invalid page_size_options {raw:?}")),
            }
        }

        if let Some(url) = config.get("api_url").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            parsed.api_url = url.to_string();
        }

        if let Some(raw) = config.get("mirror_params") {
            match raw.trim().parse::<bool>() {
                Ok(mirror) => parsed.mirror_params = mirror,
                Err(_) => parsed.warnings.push(format!("invalid mirror_params {raw:?}")),
            }
        }

        parsed.initial_query = config
            .get("query")
            .map(|query| QueryParams::from_query_string(query));
        parsed.trace_level = config.get("trace_level").cloned();

        parsed.normalize_page_sizes();
        parsed
    }

    /// Applies the values present in a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BookSearchError::Config`] for invalid TOML, unknown keys or
    /// zero page sizes. Nothing is applied in that case.
    pub fn merge_toml(&mut self, text: &str) -> Result<()> {
        let file: FileConfig =
            toml::from_str(text).map_err(|e| BookSearchError::Config(e.to_string()))?;

        let default_page_size = file
            .default_page_size
            .map(|n| NonZeroU32::new(n).ok_or_else(|| zero_page_size("default_page_size")))
            .transpose()?;
        let page_size_options = file
            .page_size_options
            .map(|options| {
                options
                    .into_iter()
                    .map(|n| NonZeroU32::new(n).ok_or_else(|| zero_page_size("page_size_options")))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        if let Some(size) = default_page_size {
            self.default_page_size = size;
        }
        if let Some(options) = page_size_options.filter(|o| !o.is_empty()) {
            self.page_size_options = options;
        }
        if let Some(url) = file.api_url {
            self.api_url = url;
        }
        if let Some(mirror) = file.mirror_params {
            self.mirror_params = mirror;
        }

        self.normalize_page_sizes();
        Ok(())
    }

    /// Reads a TOML file (with `~` expanded) and merges it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or any error from
    /// [`Config::merge_toml`].
    pub fn merge_file(&mut self, path: &str) -> Result<()> {
        let text = std::fs::read_to_string(infrastructure::expand_tilde(path))?;
        self.merge_toml(&text)
    }

    fn normalize_page_sizes(&mut self) {
        self.page_size_options.push(self.default_page_size);
        self.page_size_options.sort_unstable();
        self.page_size_options.dedup();
    }
}

fn parse_page_size(raw: &str) -> Option<NonZeroU32> {
    raw.trim().parse().ok()
}

fn zero_page_size(key: &str) -> BookSearchError {
    BookSearchError::Config(format!("{key} must be positive"))
}

/// Builds the application state for `config`.
///
/// The store starts empty with the configured page size, and the
/// coordinator has already observed that initial empty search. Restoring
/// parameters is left to the caller (see [`Event::ParamsRestored`]).
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(
        default_page_size = config.default_page_size.get(),
        api_url = %config.api_url,
        mirror_params = config.mirror_params,
        "initializing booksearch plugin"
    );
    for warning in &config.warnings {
        tracing::warn!(warning = %warning, "configuration problem, using defaults");
    }

    let store = QueryStore::new(config.default_page_size);
    let mut coordinator = SearchCoordinator::new(CatalogClient::new(config.api_url.clone()));

    let _ = coordinator.subscribe_pending(|pending| tracing::debug!(pending, "search pending changed"));
    let _ = coordinator.subscribe_results(|results| match results {
        Some(results) => tracing::debug!(
            total_found = results.total_found,
            documents = results.documents.len(),
            "search results published"
        ),
        None => tracing::debug!("search results cleared"),
    });

    AppState::new(
        store,
        coordinator,
        config.page_size_options.clone(),
        config.mirror_params,
    )
}
