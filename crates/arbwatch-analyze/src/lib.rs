//! Anti-rollback analysis of OTA packages via external tools.
//!
//! # Modules
//!
//! - [`analyzer`]: Extraction pipeline and ARB output parsing
//! - [`runner`]: Shell-free external command execution
//! - [`error`]: Error types and Result alias

pub mod analyzer;
pub mod error;
pub mod runner;

pub use analyzer::{Analyzer, ArbReport, ToolConfig, parse_arb_output};
pub use error::{Error, Result};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
