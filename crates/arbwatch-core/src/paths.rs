//! Project and config directory discovery.
//!
//! `PathResolver` locates the tracker checkout (the directory holding
//! `data/history` or the status README) and the user config directory.
//!
//! # Example
//!
//! ```no_run
//! use arbwatch_core::paths::PathResolver;
//!
//! let resolver = PathResolver::new("arbwatch")
//!     .with_project_markers(&["data/history", "README.md"]);
//!
//! // Checks ARBWATCH_ROOT, then walks up from the working directory
//! if let Some(root) = resolver.project_root() {
//!     println!("Project: {}", root.display());
//! }
//! ```

use std::env;
use std::path::{Path, PathBuf};

/// Markers identifying a tracker checkout, most specific first.
pub const DEFAULT_PROJECT_MARKERS: &[&str] = &["data/history", "README.md"];

/// Configurable path resolver.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Project name (e.g., "arbwatch")
    project_name: String,
    /// Environment variable prefix (e.g., "ARBWATCH")
    env_prefix: String,
    /// Marker paths identifying the project root
    project_markers: Vec<String>,
    /// Directory the upward search starts from; defaults to the working directory
    start_dir: Option<PathBuf>,
    /// Fallback project root
    project_fallback: Option<PathBuf>,
}

impl PathResolver {
    /// Create a resolver. `"arb-watch"` maps to the `ARB_WATCH` env prefix.
    pub fn new(project_name: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            env_prefix: project_name.to_uppercase().replace(['-', ' '], "_"),
            project_markers: vec![],
            start_dir: None,
            project_fallback: None,
        }
    }

    /// Resolver preconfigured with [`DEFAULT_PROJECT_MARKERS`].
    pub fn arbwatch() -> Self {
        Self::new("arbwatch").with_project_markers(DEFAULT_PROJECT_MARKERS)
    }

    /// Set marker paths that identify the project root.
    pub fn with_project_markers(mut self, markers: &[&str]) -> Self {
        self.project_markers = markers.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Start the upward marker search from `dir`.
    pub fn with_start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    /// Set a fallback project root (supports `~`).
    pub fn with_project_fallback(mut self, path: &str) -> Self {
        self.project_fallback = Some(expand_tilde(path));
        self
    }

    /// Environment variable name for a suffix, e.g. `ARBWATCH_ROOT`.
    pub fn env_var(&self, suffix: &str) -> String {
        format!("{}_{}", self.env_prefix, suffix)
    }

    /// Get the project name.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Resolve the project root from the process environment.
    ///
    /// Checks in order:
    /// 1. `{PREFIX}_ROOT`
    /// 2. Walk up from the start directory looking for a marker
    /// 3. Fallback path (if configured and present)
    pub fn project_root(&self) -> Option<PathBuf> {
        self.project_root_with(|k| env::var(k).ok())
    }

    /// [`project_root`](Self::project_root) with an explicit env lookup.
    pub fn project_root_with<F>(&self, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(&self.env_var("ROOT")).map(|p| expand_tilde(&p))
            && path.is_dir()
        {
            return Some(path);
        }

        let start = self
            .start_dir
            .clone()
            .or_else(|| env::current_dir().ok());
        if let Some(start) = start {
            for marker in &self.project_markers {
                if let Some(root) = find_dir_with_marker(&start, marker) {
                    return Some(root);
                }
            }
        }

        self.project_fallback.clone().filter(|p| p.is_dir())
    }

    /// Resolve the config directory from the process environment.
    ///
    /// Checks `{PREFIX}_CONFIG_DIR`, then the platform config directory
    /// joined with the project name.
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_with(|k| env::var(k).ok())
    }

    /// [`config_dir`](Self::config_dir) with an explicit env lookup.
    pub fn config_dir_with<F>(&self, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(&self.env_var("CONFIG_DIR")) {
            return Some(expand_tilde(&path));
        }
        dirs::config_dir().map(|d| d.join(&self.project_name))
    }
}

/// Walk up from `start` until a directory containing `marker` is found.
pub fn find_dir_with_marker(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf)
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
