//! Command implementations.
//!
//! Each command exposes a `run` entry point used by the binary plus the
//! pure helpers it is built from, so output formatting can be tested
//! without touching the network or the terminal.

pub mod analyze;
pub mod fetch;
pub mod index;
pub mod matrix;
pub mod readme;
pub mod record;
pub mod site;
pub mod verify;

use std::path::PathBuf;

use arbwatch_client::{Resolver, SpringerSource, default_resolver};
use arbwatch_core::HistoryStore;

use crate::config::ArbwatchConfig;
use crate::error::Result;

/// Resolved settings shared by all commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Effective configuration
    pub config: ArbwatchConfig,
    history_dir: PathBuf,
}

impl AppContext {
    /// Build a context; `history_dir` takes precedence over the config.
    pub fn new(config: ArbwatchConfig, history_dir: Option<PathBuf>) -> Self {
        let history_dir = history_dir.unwrap_or_else(|| config.history_dir());
        log::debug!("History directory: {}", history_dir.display());
        Self {
            config,
            history_dir,
        }
    }

    /// History store rooted at the resolved directory.
    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::new(&self.history_dir)
    }

    /// Shared HTTP client built from `[http]`.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(self.config.http_config().build_client()?)
    }

    /// OOS API then Springer mirror.
    pub fn resolver(&self) -> Result<Resolver> {
        Ok(default_resolver(
            self.http_client()?,
            &self.config.http.oos_api_url,
            &self.config.http.springer_url,
        ))
    }

    /// Springer mirror alone, for version listings.
    pub fn springer(&self) -> Result<SpringerSource> {
        Ok(SpringerSource::new(
            self.config.http.springer_url.clone(),
            self.http_client()?,
        ))
    }
}
