//! OOS downloader API source.
//!
//! The API exposes two plain-text endpoints per variant:
//!
//! - `GET {base}/{brand}/{oos_id}/{region}/url` returns the download URL
//! - `GET {base}/{brand}/{oos_id}/{region}/version` returns the version string
//!
//! It only knows the latest build, so targeted lookups are left to other
//! sources.

use arbwatch_core::catalog::{self, OOS_API_URL};
use arbwatch_core::DeviceKey;
use async_trait::async_trait;

use crate::error::Result;
use crate::source::{FirmwareLink, FirmwareSource};

/// Latest-build lookup through the OOS downloader API.
#[derive(Debug, Clone)]
pub struct OosApiSource {
    base_url: String,
    http: reqwest::Client,
}

impl OosApiSource {
    /// Create a source against `base_url` (usually [`OOS_API_URL`]).
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Source against the public API.
    pub fn public(http: reqwest::Client) -> Self {
        Self::new(OOS_API_URL, http)
    }

    /// Endpoint URL for one of the variant's leaves (`url`, `version`).
    pub fn endpoint(&self, key: &DeviceKey, leaf: &str) -> String {
        format!(
            "{}/{}/{}/{}/{leaf}",
            self.base_url,
            catalog::brand(&key.device),
            catalog::oos_id(&key.device),
            key.region.code()
        )
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body.trim().to_string())
    }

    /// Fetch the latest link, propagating transport errors.
    pub async fn fetch(&self, key: &DeviceKey) -> Result<Option<FirmwareLink>> {
        let url = self.get_text(&self.endpoint(key, "url")).await?;
        if !url.starts_with("http") {
            log::warn!("{key}: OOS API returned no usable URL ({url:?})");
            return Ok(None);
        }
        let version = self.get_text(&self.endpoint(key, "version")).await?;
        Ok(Some(FirmwareLink { url, version }))
    }
}

#[async_trait]
impl FirmwareSource for OosApiSource {
    fn name(&self) -> &str {
        "oos-api"
    }

    fn supports_target(&self) -> bool {
        false
    }

    async fn resolve(
        &self,
        key: &DeviceKey,
        target: Option<&str>,
    ) -> Result<Option<FirmwareLink>> {
        if target.is_some() {
            return Ok(None);
        }
        match self.fetch(key).await {
            Ok(link) => Ok(link),
            Err(e) => {
                log::warn!("{key}: OOS API request failed: {e}");
                Ok(None)
            }
        }
    }
}
