//! arbwatch core: shared types, catalog, errors, and history storage.
//!
//! This crate has no internal arbwatch dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`catalog`]: Static device catalog and source identifier mappings
//! - [`error`]: Error types and Result alias
//! - [`history`]: Per-variant firmware history documents and store
//! - [`ids`]: Device/region keys, file stems, and marker ids
//! - [`paths`]: Project and config directory discovery

pub mod catalog;
pub mod error;
pub mod history;
pub mod ids;
pub mod paths;

// Re-export key types at crate root for convenience
pub use catalog::{DeviceMeta, Region};
pub use error::{Error, Result};
pub use history::{
    EntryStatus, HistoryEntry, HistoryStore, Measurement, RecordOutcome, VariantHistory,
};
pub use ids::DeviceKey;
pub use paths::PathResolver;
