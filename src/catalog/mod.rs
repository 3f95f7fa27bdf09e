//! Open Library catalog API boundary.
//!
//! The plugin never performs HTTP itself: the coordinator produces
//! [`FetchRequest`]s, the plugin shim hands them to the host, and the raw
//! status/body pair comes back through [`parse_response`].
//!
//! - [`query`]: query normalization and request URLs
//! - [`response`]: response decoding into domain types

pub mod query;
pub mod response;

pub use query::{normalize_query, CatalogClient, FetchRequest, DEFAULT_BASE_URL};
pub use response::parse_response;
