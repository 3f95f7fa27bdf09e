//! Storage record models for the persistence layer.
//!
//! Kept separate from [`QueryParams`] so the on-disk format can carry its own
//! version and bookkeeping fields.

use crate::params::QueryParams;
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
pub const PARAMS_FORMAT_VERSION: u32 = 1;

/// Persisted query parameters.
///
/// ```json
/// {
///   "version": 1,
///   "params": { "searchText": "dune", "page": "2", "pageSize": "10" },
///   "updated_at": 1718000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsRecord {
    /// Format version for future migrations.
    pub version: u32,

    #[serde(default)]
    pub params: QueryParams,

    /// Unix timestamp of the last write, `None` if never written.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Default for ParamsRecord {
    fn default() -> Self {
        Self {
            version: PARAMS_FORMAT_VERSION,
            params: QueryParams::default(),
            updated_at: None,
        }
    }
}

impl ParamsRecord {
    /// Stamps the record with the current time.
    pub fn touch(&mut self) {
        self.updated_at = Some(chrono::Utc::now().timestamp());
    }
}
