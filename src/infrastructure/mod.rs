//! Infrastructure layer for the Zellij plugin sandbox.
//!
//! Inside the sandbox the host filesystem is mounted under `/host`, which is
//! where trace files and mirrored parameters are kept.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir};
