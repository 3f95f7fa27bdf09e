//! Storage layer for mirrored search parameters.
//!
//! Submitted searches are mirrored into a small JSON record so that reopening
//! the plugin resumes the last query, the way a bookmarked URL would.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction
//! - `json`: JSON file-based implementation
//! - `models`: On-disk record types

pub mod backend;
pub mod json;
pub mod models;

pub use backend::ParamStore;
pub use json::JsonParamStore;
pub use models::ParamsRecord;
