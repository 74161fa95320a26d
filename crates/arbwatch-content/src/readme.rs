//! Status README rendering.
//!
//! [`render`] builds the full document from history files. [`update`]
//! rewrites the marker values of an existing document in place, leaving
//! hand-edited text around the tables alone.

use std::collections::BTreeMap;

use arbwatch_core::catalog::{self, DeviceMeta, Region};
use arbwatch_core::{DeviceKey, VariantHistory};

use crate::error::{Error, Result};
use crate::placeholders::{self, Field, Values, wrap};

/// Project website linked from the header.
pub const WEBSITE_URL: &str = "https://bartixxx32.github.io/OnePlus-antirollchecker/";

/// CI workflow whose badge closes the document.
pub const WORKFLOW_FILE: &str = "check_arb.yml";

const WORKFLOW_BASE: &str = "https://github.com/Bartixxx32/Oneplus-antirollchecker/actions/workflows";

const TABLE_HEADER: &str =
    "| Region | Model | Firmware Version | ARB Index | OEM Version | Last Checked | Safe |";
const TABLE_RULE: &str =
    "|--------|-------|------------------|-----------|-------------|--------------|------|";

/// History documents keyed by file stem (`15_GLO`).
pub type HistoryMap = BTreeMap<String, VariantHistory>;

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a row for every catalog region, with sentinels where no
    /// history exists. Used to produce the blank template.
    pub all_variants: bool,
}

/// Render the full status README.
pub fn render(devices: &[DeviceMeta], histories: &HistoryMap, options: RenderOptions) -> String {
    let mut lines: Vec<String> = [
        "# OnePlus Anti-Rollback (ARB) Checker",
        "",
        "Automated ARB (Anti-Rollback) index tracker for OnePlus devices. This repository monitors firmware updates and tracks ARB changes over time.",
        "",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();
    lines.push(format!("**Website:** [{WEBSITE_URL}]({WEBSITE_URL})"));
    lines.push(String::new());
    lines.push("## 📊 Current Status".to_string());
    lines.push(String::new());

    let sections: Vec<Vec<String>> = devices
        .iter()
        .filter_map(|d| device_section(d, histories, options))
        .collect();
    log::debug!("Rendering {} device sections", sections.len());

    for (i, section) in sections.into_iter().enumerate() {
        if i > 0 {
            lines.push("---".to_string());
            lines.push(String::new());
        }
        lines.extend(section);
    }

    lines.extend(footer());
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn device_section(
    device: &DeviceMeta,
    histories: &HistoryMap,
    options: RenderOptions,
) -> Option<Vec<String>> {
    let regions: Vec<Region> = Region::ALL
        .into_iter()
        .filter(|r| {
            let key = DeviceKey::new(device.id, *r);
            if options.all_variants {
                device.model(*r).is_some()
            } else {
                histories.contains_key(&key.file_stem())
            }
        })
        .collect();
    if regions.is_empty() {
        return None;
    }

    let mut lines = vec![
        format!("### {}", device.name),
        String::new(),
        TABLE_HEADER.to_string(),
        TABLE_RULE.to_string(),
    ];
    for region in regions {
        let key = DeviceKey::new(device.id, region);
        let history = histories.get(&key.file_stem());
        lines.push(table_row(&key, history));
    }
    lines.push(String::new());
    Some(lines)
}

/// One marker-wrapped table row.
pub fn table_row(key: &DeviceKey, history: Option<&VariantHistory>) -> String {
    let id = key.marker_id();
    let values = Values::from_history(history);
    let model = history
        .and_then(|h| h.model.as_deref())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| catalog::model_number(&key.device, key.region));
    let cell = |field| wrap(field, &id, values.get(field));

    format!(
        "| {} | {} | {} | **{}** | Major: **{}**, Minor: **{}** | {} | {} |",
        key.region.display_name(),
        model,
        cell(Field::Version),
        cell(Field::Arb),
        cell(Field::Major),
        cell(Field::Minor),
        cell(Field::Date),
        cell(Field::Status),
    )
}

fn footer() -> Vec<String> {
    let badge = format!(
        "[![Check ARB]({WORKFLOW_BASE}/{WORKFLOW_FILE}/badge.svg)]({WORKFLOW_BASE}/{WORKFLOW_FILE})"
    );
    [
        "",
        "> [!IMPORTANT]",
        "> This status is updated automatically by GitHub Actions. Some device/region combinations may not be available and will show as \"Waiting for scan...\".",
        "",
        "## 📈 Legend",
        "",
        "- ✅ **Safe**: ARB = 0 (downgrade possible)",
        "- ❌ **Protected**: ARB > 0 (anti-rollback active)",
        "",
        "## 🛠️ Credits",
        "- **Payload Extraction**: [otaripper](https://github.com/syedinsaf/otaripper) by [syedinsaf](https://github.com/syedinsaf) - for fast and reliable OTA extraction.",
        "",
        "## 🤖 Workflow Status",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .chain(std::iter::once(badge))
    .collect()
}

/// Marker ids for every catalog variant.
pub fn catalog_ids(devices: &[DeviceMeta]) -> Vec<String> {
    devices
        .iter()
        .flat_map(|d| d.regions().into_iter().map(|r| DeviceKey::new(d.id, r)))
        .map(|k| k.marker_id())
        .collect()
}

/// Rewrite every marker pair in `document` from history.
///
/// Ids without history get sentinels. Fields whose markers are absent for
/// an id are skipped with a warning; duplicated pairs are an error.
/// Returns the new document and the number of ids touched.
pub fn update(document: &str, histories: &HistoryMap) -> Result<(String, usize)> {
    let mut doc = document.to_string();
    let mut updated = 0;

    for id in placeholders::ids(document) {
        let history = match id.parse::<DeviceKey>() {
            Ok(key) => histories.get(&key.file_stem()),
            Err(e) => {
                log::warn!("Cannot map marker id '{id}' to a variant: {e}");
                None
            }
        };
        let values = Values::from_history(history);

        for field in Field::ALL {
            match placeholders::apply(&doc, field, &id, values.get(field)) {
                Ok(next) => doc = next,
                Err(Error::MissingMarker { .. }) => {
                    log::warn!("{id}: no {field} marker pair, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        updated += 1;
    }

    Ok((doc, updated))
}
