//! Parameter storage abstraction.
//!
//! [`ParamStore`] is the persistence seam for mirrored searches. The worker
//! owns one boxed implementation; tests can swap in their own.

use crate::domain::{CurrentSearch, Result};
use crate::params::QueryParams;

/// Persistent home of the mirrored query parameters.
///
/// # Implementations
///
/// - [`JsonParamStore`](crate::storage::JsonParamStore): JSON file with atomic writes
///
/// # Examples
///
/// ```no_run
/// use booksearch::storage::{JsonParamStore, ParamStore};
/// use std::path::PathBuf;
///
/// let store = JsonParamStore::new(PathBuf::from("/tmp/search-params.json"))?;
/// let params = store.load_params()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ParamStore: Send {
    /// Returns all stored parameters, including unrelated keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the read operation fails.
    fn load_params(&self) -> Result<QueryParams>;

    /// Merges `search` into the stored parameters and persists them.
    ///
    /// Follows [`QueryParams::merge_search`]: an empty search clears the
    /// search keys. Returns the parameters after the merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn mirror_search(&mut self, search: &CurrentSearch) -> Result<QueryParams>;

    /// Removes every stored parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn clear(&mut self) -> Result<()>;
}
