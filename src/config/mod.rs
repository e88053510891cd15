//! Configuration module
//!
//! Loads cache, identifier, store, logging and guard settings from TOML files
//! and `COURTIQ_ACCESS__*` environment variables.

pub mod loader;
pub mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::*;
