//! Springer OTA mirror source.
//!
//! The mirror page embeds its whole catalog in a `data-devices` attribute:
//!
//! ```text
//! <select id="device" data-devices='{"OP 15": {"GLO": ["V3", "V2"]}}'>
//! ```
//!
//! Posting `device`, `region`, and `version` back to the same page renders
//! a `resultBox` element whose `data-url` carries a signed download link.
//! Unlike the OOS API it can serve older versions, which backfill relies on.

use std::collections::HashMap;

use arbwatch_core::DeviceKey;
use arbwatch_core::catalog::{self, BASE_URL};
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::{Error, Result};
use crate::source::{FirmwareLink, FirmwareSource};

/// Mirror catalog: device label → region → versions, newest first.
pub type MirrorCatalog = HashMap<String, HashMap<String, Vec<String>>>;

/// Lookup through the Springer mirror page.
#[derive(Debug, Clone)]
pub struct SpringerSource {
    page_url: String,
    http: reqwest::Client,
}

impl SpringerSource {
    /// Create a source against `page_url` (usually [`BASE_URL`]).
    pub fn new(page_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            page_url: page_url.into(),
            http,
        }
    }

    /// Source against the public mirror.
    pub fn public(http: reqwest::Client) -> Self {
        Self::new(BASE_URL, http)
    }

    /// Download and decode the mirror catalog.
    pub async fn fetch_catalog(&self) -> Result<MirrorCatalog> {
        let page = self
            .http
            .get(&self.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_catalog(&page)
    }

    /// Every listed version for a variant, newest first.
    ///
    /// Unknown devices or regions yield an empty list.
    pub async fn list_versions(&self, key: &DeviceKey) -> Result<Vec<String>> {
        let mirror = self.fetch_catalog().await?;
        Ok(versions_for(&mirror, key).map(<[String]>::to_vec).unwrap_or_default())
    }

    /// Request a signed link for an exact mirror version.
    pub async fn request_link(&self, key: &DeviceKey, version: &str) -> Result<Option<String>> {
        let device = catalog::springer_name(&key.device);
        let form = [
            ("device", device.as_str()),
            ("region", key.region.code()),
            ("version", version),
        ];
        let body = self
            .http
            .post(&self.page_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_result_url(&body))
    }

    async fn lookup(&self, key: &DeviceKey, target: Option<&str>) -> Result<Option<FirmwareLink>> {
        let mirror = self.fetch_catalog().await?;
        let Some(versions) = versions_for(&mirror, key) else {
            log::info!(
                "{key}: mirror has no '{}' {} listing",
                catalog::springer_name(&key.device),
                key.region
            );
            return Ok(None);
        };
        let Some(version) = choose_version(versions, target) else {
            log::info!("{key}: mirror does not list version {target:?}");
            return Ok(None);
        };
        let version = version.to_string();

        match self.request_link(key, &version).await? {
            Some(url) => Ok(Some(FirmwareLink { url, version })),
            None => {
                log::warn!("{key}: mirror response had no result box");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl FirmwareSource for SpringerSource {
    fn name(&self) -> &str {
        "springer"
    }

    async fn resolve(
        &self,
        key: &DeviceKey,
        target: Option<&str>,
    ) -> Result<Option<FirmwareLink>> {
        match self.lookup(key, target).await {
            Ok(link) => Ok(link),
            Err(e) => {
                log::warn!("{key}: mirror lookup failed: {e}");
                Ok(None)
            }
        }
    }
}

/// Versions the mirror lists for a variant, newest first.
pub fn versions_for<'a>(mirror: &'a MirrorCatalog, key: &DeviceKey) -> Option<&'a [String]> {
    mirror
        .get(&catalog::springer_name(&key.device))?
        .get(key.region.code())
        .map(Vec::as_slice)
}

/// Pick the exact target, else the first version containing it.
/// Without a target the first (newest) version is used.
pub fn choose_version<'a>(versions: &'a [String], target: Option<&str>) -> Option<&'a str> {
    match target {
        None => versions.first().map(String::as_str),
        Some(t) => versions
            .iter()
            .find(|v| v.as_str() == t)
            .or_else(|| versions.iter().find(|v| v.contains(t)))
            .map(String::as_str),
    }
}

/// Decode the `data-devices` attribute of a mirror page.
pub fn parse_catalog(page: &str) -> Result<MirrorCatalog> {
    let raw = first_attr(page, "[data-devices]", "data-devices")
        .ok_or_else(|| Error::response("springer", "missing data-devices attribute"))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::response("springer", format!("invalid data-devices JSON: {e}")))
}

/// Extract the signed URL from a form response.
pub fn parse_result_url(page: &str) -> Option<String> {
    first_attr(page, "#resultBox", "data-url").filter(|u| !u.is_empty())
}

fn first_attr(page: &str, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(page);
    document
        .select(&selector)
        .find_map(|el| el.value().attr(attr).map(str::to_string))
}
