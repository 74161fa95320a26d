//! arbwatch configuration file.
//!
//! The file is TOML and every section is optional:
//!
//! ```toml
//! [paths]
//! history_dir = "data/history"
//! readme = "README.md"
//!
//! [http]
//! timeout_secs = 30
//!
//! [tools]
//! dir = "tools"
//! extractor = "otaripper"
//! arb_tool = "arbextract"
//!
//! [matrix]
//! backfill_depth = 3
//! ```
//!
//! The file is looked up from `--config`, then `$ARBWATCH_CONFIG`, then
//! `<platform config dir>/arbwatch/config.toml`. `ARBWATCH_HISTORY_DIR`
//! and `ARBWATCH_HTTP_TIMEOUT_SECS` override values from the file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arbwatch_analyze::ToolConfig;
use arbwatch_client::HttpConfig;
use arbwatch_core::PathResolver;
use arbwatch_core::catalog::{BASE_URL, HISTORY_DIR, OOS_API_URL, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Variants left out of the check matrix because their sources are known
/// to fail, as history file stems.
pub const DEFAULT_MATRIX_EXCLUDE: &[&str] = &[
    "Find X8 Pro_IN",
    "Find X8 Pro_EU",
    "Find X8 Pro_CN",
    "Find X8_CN",
    "Find X8_IN",
    "Find N3_IN",
    "9R_IN",
    "10R_IN",
    "Ace 5 Ultimate_CN",
];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbwatchConfig {
    /// File locations
    pub paths: PathsConfig,
    /// HTTP client settings
    pub http: HttpSection,
    /// External tool settings
    pub tools: ToolsSection,
    /// CI matrix settings
    pub matrix: MatrixSection,
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// History directory; discovered from the project root when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_dir: Option<PathBuf>,
    /// Status README
    pub readme: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            history_dir: None,
            readme: PathBuf::from("README.md"),
        }
    }
}

/// `[http]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header
    pub user_agent: String,
    /// OOS downloader API base URL
    pub oos_api_url: String,
    /// Springer mirror page URL
    pub springer_url: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: USER_AGENT.to_string(),
            oos_api_url: OOS_API_URL.to_string(),
            springer_url: BASE_URL.to_string(),
        }
    }
}

/// `[tools]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// Directory holding tool binaries
    pub dir: PathBuf,
    /// Payload extractor binary
    pub extractor: String,
    /// Extractor argument template (`{input}`, `{output}`)
    pub extractor_args: Vec<String>,
    /// ARB reader binary
    pub arb_tool: String,
    /// ARB reader argument template (`{image}`)
    pub arb_args: Vec<String>,
    /// Extraction directory
    pub output_dir: PathBuf,
    /// Per-tool timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        let tools = ToolConfig::default();
        Self {
            dir: tools.tools_dir,
            extractor: tools.extractor,
            extractor_args: tools.extractor_args,
            arb_tool: tools.arb_tool,
            arb_args: tools.arb_args,
            output_dir: PathBuf::from("extracted"),
            timeout_secs: tools.timeout.as_secs(),
        }
    }
}

/// `[matrix]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixSection {
    /// Versions per variant in backfill mode
    pub backfill_depth: usize,
    /// Variants to skip, as history file stems (`Find X8_CN`)
    pub exclude: Vec<String>,
}

impl Default for MatrixSection {
    fn default() -> Self {
        Self {
            backfill_depth: 3,
            exclude: DEFAULT_MATRIX_EXCLUDE
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl ArbwatchConfig {
    /// Project name used for env vars and directories.
    pub fn project_name() -> &'static str {
        "arbwatch"
    }

    /// Resolve the config file path from the process environment.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        Self::resolve_config_path_with(explicit, |k| env::var(k).ok())
    }

    /// [`resolve_config_path`](Self::resolve_config_path) with an explicit
    /// env lookup.
    pub fn resolve_config_path_with<F>(explicit: Option<&str>, lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        let resolver = PathResolver::arbwatch();
        if let Some(path) = lookup(&resolver.env_var("CONFIG")) {
            return Some(PathBuf::from(path));
        }
        resolver
            .config_dir_with(lookup)
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Default location used by `config init`.
    pub fn default_config_path() -> Option<PathBuf> {
        PathResolver::arbwatch()
            .config_dir()
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load from the process environment.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        Self::load_with(explicit, |k| env::var(k).ok())
    }

    /// Load the config file (defaults when absent) and apply env overrides.
    pub fn load_with<F>(explicit: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::resolve_config_path_with(explicit, &lookup) {
            Some(path) if path.exists() => {
                log::debug!("Loading config from {}", path.display());
                let text =
                    std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
                toml::from_str(&text).map_err(|e| {
                    Error::config(format!("Failed to parse {}: {e}", path.display()))
                })?
            }
            Some(path) if explicit.is_some() => {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Apply `ARBWATCH_*` overrides.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolver = PathResolver::arbwatch();
        if let Some(dir) = lookup(&resolver.env_var("HISTORY_DIR")) {
            self.paths.history_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = lookup(&resolver.env_var("HTTP_TIMEOUT_SECS")) {
            self.http.timeout_secs = secs.trim().parse().map_err(|_| {
                Error::config(format!("ARBWATCH_HTTP_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        Ok(())
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// History directory: the configured one, else `data/history` under
    /// the discovered project root, else relative to the working directory.
    pub fn history_dir(&self) -> PathBuf {
        if let Some(dir) = &self.paths.history_dir {
            return dir.clone();
        }
        PathResolver::arbwatch()
            .project_root()
            .map(|root| root.join(HISTORY_DIR))
            .unwrap_or_else(|| PathBuf::from(HISTORY_DIR))
    }

    /// HTTP client settings.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            user_agent: self.http.user_agent.clone(),
        }
    }

    /// External tool settings.
    pub fn tool_config(&self) -> ToolConfig {
        ToolConfig {
            tools_dir: self.tools.dir.clone(),
            extractor: self.tools.extractor.clone(),
            extractor_args: self.tools.extractor_args.clone(),
            arb_tool: self.tools.arb_tool.clone(),
            arb_args: self.tools.arb_args.clone(),
            timeout: Duration::from_secs(self.tools.timeout_secs),
        }
    }
}
