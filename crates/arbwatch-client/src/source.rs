//! Firmware source abstraction and the fallback resolver.

use std::time::Duration;

use arbwatch_core::DeviceKey;
use arbwatch_core::catalog::USER_AGENT;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A resolved firmware download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareLink {
    /// Direct (possibly signed) download URL
    pub url: String,
    /// Firmware version string
    pub version: String,
}

/// A service that can turn a variant into a download link.
///
/// `Ok(None)` means the source has nothing for the variant. Errors are
/// reserved for failures the caller may want to report.
#[async_trait]
pub trait FirmwareSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether the source can look up a specific older version.
    fn supports_target(&self) -> bool {
        true
    }

    /// Resolve the latest build, or `target` when given.
    async fn resolve(&self, key: &DeviceKey, target: Option<&str>)
    -> Result<Option<FirmwareLink>>;
}

/// HTTP settings shared by all sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    /// Build a client with a cookie store, timeout, and user agent.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .cookie_store(true)
            .build()?)
    }
}

/// Tries sources in order until one yields a link.
pub struct Resolver {
    sources: Vec<Box<dyn FirmwareSource>>,
}

impl Resolver {
    /// Create a resolver over `sources`, tried in the given order.
    pub fn new(sources: Vec<Box<dyn FirmwareSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured sources.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve a link, falling through on `None` and on source errors.
    ///
    /// With a target version only target-capable sources are consulted.
    pub async fn resolve(&self, key: &DeviceKey, target: Option<&str>) -> Result<FirmwareLink> {
        for source in &self.sources {
            if target.is_some() && !source.supports_target() {
                log::debug!("Skipping {} for targeted lookup", source.name());
                continue;
            }
            match source.resolve(key, target).await {
                Ok(Some(link)) => {
                    log::info!("{key}: {} resolved {}", source.name(), link.version);
                    return Ok(link);
                }
                Ok(None) => log::info!("{key}: {} has no firmware", source.name()),
                Err(e) => log::warn!("{key}: {} failed: {e}", source.name()),
            }
        }
        Err(Error::NotFound {
            device: key.device.clone(),
            region: key.region.code().to_string(),
        })
    }
}
