//! Application layer coordinating state, events, and actions.
//!
//! Sits between the plugin runtime (`main.rs`) and the catalog, storage and
//! worker layers:
//!
//! ```text
//! Key / Web result / Worker message → Event → handle_event
//!     → QueryStore setters → submit() → Published<CurrentSearch>
//!     → SearchCoordinator::observe → Action::Fetch
//!     → FetchCompleted → SearchCoordinator::complete → results / pending
//! ```
//!
//! # Modules
//!
//! - [`query_store`]: field-level query state and the published current search
//! - [`coordinator`]: fetch lifecycle with last-submitted-wins semantics
//! - [`actions`]: side effects for the plugin runtime
//! - [`handler`]: event processing
//! - [`state`]: wiring between store and coordinator
//! - [`view`]: display-ready view for the plain-text renderer

pub mod actions;
pub mod coordinator;
pub mod handler;
pub mod query_store;
pub mod state;
pub mod view;

pub use actions::Action;
pub use coordinator::{SearchCoordinator, Settlement};
pub use handler::{handle_event, Event};
pub use query_store::QueryStore;
pub use state::AppState;
pub use view::SearchView;
