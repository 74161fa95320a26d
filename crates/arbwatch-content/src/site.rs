//! Data model for the status website.
//!
//! [`build`] reduces the history documents to the current build of every
//! variant, grouped by device in catalog order. The result is serialised as
//! JSON for the page template to consume.

use std::collections::BTreeSet;

use arbwatch_core::catalog::{DeviceMeta, Region};
use arbwatch_core::{DeviceKey, HistoryEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::readme::HistoryMap;

/// Format of [`SiteData::generated_at`].
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Everything the status page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteData {
    /// Build time, `YYYY-MM-DD HH:MM UTC`
    pub generated_at: String,
    /// Devices with at least one recorded variant
    pub devices: Vec<SiteDevice>,
}

/// One device card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteDevice {
    /// Display name
    pub name: String,
    /// Recorded variants, preferred regions first
    pub variants: Vec<SiteVariant>,
}

/// Current firmware of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteVariant {
    /// Region code
    pub region: Region,
    /// Human-readable region
    pub region_name: String,
    /// Model number
    pub model: String,
    /// Current firmware version
    pub version: String,
    /// Anti-rollback index
    pub arb: u32,
    /// OEM major version
    pub major: u32,
    /// OEM minor version
    pub minor: u32,
    /// Last check date, `YYYY-MM-DD`
    pub last_checked: String,
    /// ARB is 0
    pub is_safe: bool,
}

impl SiteVariant {
    fn new(region: Region, model: String, entry: &HistoryEntry) -> Self {
        Self {
            region,
            region_name: region.display_name().to_string(),
            model,
            version: entry.version.clone(),
            arb: entry.arb,
            major: entry.major,
            minor: entry.minor,
            last_checked: entry.last_checked.format("%Y-%m-%d").to_string(),
            is_safe: entry.is_safe(),
        }
    }
}

/// Build the page data from history documents.
///
/// Regions come from the catalog plus any history file for the device, so
/// variants recorded outside the catalog still show up. Devices without a
/// recorded variant are left out.
pub fn build(devices: &[DeviceMeta], histories: &HistoryMap, now: DateTime<Utc>) -> SiteData {
    let devices = devices
        .iter()
        .filter_map(|device| {
            let variants: Vec<SiteVariant> = regions_for(device, histories)
                .into_iter()
                .filter_map(|region| {
                    let key = DeviceKey::new(device.id, region);
                    let history = histories.get(&key.file_stem())?;
                    let entry = history.current()?;
                    let model = history
                        .model
                        .clone()
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Unknown".to_string());
                    Some(SiteVariant::new(region, model, entry))
                })
                .collect();
            (!variants.is_empty()).then(|| SiteDevice {
                name: device.name.to_string(),
                variants,
            })
        })
        .collect();

    SiteData {
        generated_at: now.format(GENERATED_AT_FORMAT).to_string(),
        devices,
    }
}

fn regions_for(device: &DeviceMeta, histories: &HistoryMap) -> Vec<Region> {
    let mut regions: BTreeSet<Region> = device.regions().into_iter().collect();
    regions.extend(
        histories
            .keys()
            .filter_map(|stem| stem.parse::<DeviceKey>().ok())
            .filter(|key| key.device == device.id)
            .map(|key| key.region),
    );
    let mut regions: Vec<Region> = regions.into_iter().collect();
    regions.sort_by_key(|r| r.rank());
    regions
}
