//! JSON file-based parameter storage.
//!
//! Keeps the record in memory and rewrites the whole file on change, using a
//! temporary file plus rename so a crash never leaves a half-written record.

use crate::domain::error::{BookSearchError, Result};
use crate::domain::CurrentSearch;
use crate::params::QueryParams;
use crate::storage::backend::ParamStore;
use crate::storage::models::{ParamsRecord, PARAMS_FORMAT_VERSION};
use std::path::{Path, PathBuf};

/// JSON file storage backend.
///
/// `Send` but not `Sync`: it lives on the single worker thread.
pub struct JsonParamStore {
    file_path: PathBuf,
    record: ParamsRecord,
    dirty: bool,
}

impl JsonParamStore {
    /// Opens the store at `file_path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but contains invalid JSON
    /// - The file was written by a newer format version
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON parameter storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let record = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("no stored parameters yet");
            ParamsRecord::default()
        };

        tracing::debug!(param_count = record.params.len(), "parameter storage initialized");

        Ok(Self {
            file_path,
            record,
            dirty: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<ParamsRecord> {
        let contents = std::fs::read_to_string(path)?;
        let record: ParamsRecord = serde_json::from_str(&contents)
            .map_err(|e| BookSearchError::Storage(format!("failed to parse JSON: {e}")))?;

        if record.version > PARAMS_FORMAT_VERSION {
            return Err(BookSearchError::Storage(format!(
                "unsupported parameter format version {}",
                record.version
            )));
        }

        tracing::debug!(
            version = record.version,
            params = record.params.len(),
            updated_at = ?record.updated_at,
            "loaded stored parameters"
        );
        Ok(record)
    }

    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.record)
            .map_err(|e| BookSearchError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "parameters saved");
        Ok(())
    }
}

impl ParamStore for JsonParamStore {
    fn load_params(&self) -> Result<QueryParams> {
        Ok(self.record.params.clone())
    }

    fn mirror_search(&mut self, search: &CurrentSearch) -> Result<QueryParams> {
        let _span = tracing::debug_span!(
            "json_mirror_search",
            search_text = %search.search_text,
            page = search.page.get()
        )
        .entered();

        let before = self.record.params.clone();
        self.record.params.merge_search(search);

        if self.record.params != before {
            self.record.touch();
            self.dirty = true;
            self.save_to_file()?;
        }

        Ok(self.record.params.clone())
    }

    fn clear(&mut self) -> Result<()> {
        if self.record.params.is_empty() {
            return Ok(());
        }
        self.record.params = QueryParams::default();
        self.record.touch();
        self.dirty = true;
        self.save_to_file()
    }
}

impl Drop for JsonParamStore {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save parameters on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    fn search(text: &str, page: u32) -> CurrentSearch {
        CurrentSearch::new(text, NonZeroU32::new(10).unwrap(), NonZeroU32::new(page).unwrap())
    }

    #[test]
    fn new_store_in_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonParamStore::new(dir.path().join("nested/search-params.json")).unwrap();
        assert!(store.load_params().unwrap().is_empty());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn mirrored_search_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search-params.json");

        {
            let mut store = JsonParamStore::new(path.clone()).unwrap();
            store.mirror_search(&search("dune", 2)).unwrap();
        }

        let store = JsonParamStore::new(path).unwrap();
        let params = store.load_params().unwrap();
        assert_eq!(params.search_text(), Some("dune"));
        assert_eq!(params.page().map(NonZeroU32::get), Some(2));
    }

    #[test]
    fn empty_search_clears_keys_but_keeps_unrelated_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search-params.json");
        std::fs::write(
            &path,
            r#"{"version":1,"params":{"searchText":"dune","page":"1","pageSize":"10","lang":"en"}}"#,
        )
        .unwrap();

        let mut store = JsonParamStore::new(path.clone()).unwrap();
        let params = store.mirror_search(&search("", 1)).unwrap();

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("lang"), Some("en"));

        let on_disk: ParamsRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.params, params);
        assert!(on_disk.updated_at.is_some());
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search-params.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonParamStore::new(path).err().unwrap();
        assert!(matches!(err, BookSearchError::Storage(_)));
    }

    #[test]
    fn newer_format_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search-params.json");
        std::fs::write(&path, r#"{"version":99,"params":{}}"#).unwrap();

        assert!(JsonParamStore::new(path).is_err());
    }

    #[test]
    fn clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonParamStore::new(dir.path().join("p.json")).unwrap();
        store.mirror_search(&search("dune", 1)).unwrap();
        store.clear().unwrap();
        assert!(store.load_params().unwrap().is_empty());
    }
}
