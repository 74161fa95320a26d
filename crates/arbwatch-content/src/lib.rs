//! Document-level utilities for the arbwatch status README.
//!
//! # Modules
//!
//! - [`placeholders`]: Comment-delimited field markers (scan, read, apply, validate)
//! - [`readme`]: Full README rendering and in-place marker updates
//! - [`site`]: Current-build data for the status website
//! - [`firmware_index`]: Springer firmware history INI parsing
//! - [`error`]: Error types and Result alias
//!
//! # Example
//!
//! ```rust
//! use arbwatch_content::readme::{catalog_ids, render, HistoryMap, RenderOptions};
//! use arbwatch_content::placeholders::validate;
//! use arbwatch_core::catalog;
//!
//! let template = render(
//!     catalog::devices(),
//!     &HistoryMap::new(),
//!     RenderOptions { all_variants: true },
//! );
//! let report = validate(&template, &catalog_ids(catalog::devices()));
//! assert!(report.is_ok());
//! ```

pub mod error;
pub mod firmware_index;
pub mod placeholders;
pub mod readme;
pub mod site;

// Re-export commonly used types
pub use error::{Error, Result};
pub use firmware_index::{IndexEntry, parse_section, section_name};
pub use placeholders::{Field, Placeholder, Report, Values, Violation, ViolationKind};
pub use readme::{HistoryMap, RenderOptions};
pub use site::SiteData;
