//! `arbwatch matrix`: GitHub Actions job matrix.
//!
//! The regular matrix has one entry per catalog variant that is not
//! excluded. The backfill matrix has one entry per variant and listed
//! mirror version, newest first, up to the configured depth.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use arbwatch_client::springer::{MirrorCatalog, versions_for};
use arbwatch_core::{DeviceKey, DeviceMeta, Region, catalog};
use serde::Serialize;

use super::AppContext;
use crate::error::{Error, Result};

/// Environment variable naming the Actions step output file.
pub const GITHUB_OUTPUT_VAR: &str = "GITHUB_OUTPUT";

/// One matrix job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    /// Device id
    pub device: String,
    /// Region code
    pub variant: String,
    /// Device id, as used in history file names
    pub device_short: String,
    /// Display name
    pub device_name: String,
    /// Firmware version to check (backfill only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl MatrixEntry {
    fn new(device: &DeviceMeta, region: Region, version: Option<String>) -> Self {
        Self {
            device: device.id.to_string(),
            variant: region.code().to_string(),
            device_short: device.id.to_string(),
            device_name: device.name.to_string(),
            version,
        }
    }
}

#[derive(Serialize)]
struct Matrix<'a> {
    include: &'a [MatrixEntry],
}

/// Latest-build matrix, skipping `exclude` (history file stems).
pub fn build_matrix(exclude: &[String]) -> Vec<MatrixEntry> {
    let excluded: HashSet<&str> = exclude.iter().map(String::as_str).collect();
    catalog::variants()
        .filter(|(device, region)| {
            let stem = DeviceKey::new(device.id, *region).file_stem();
            !excluded.contains(stem.as_str())
        })
        .map(|(device, region)| MatrixEntry::new(device, region, None))
        .collect()
}

/// Backfill matrix from a mirror catalog.
pub fn build_backfill_matrix(mirror: &MirrorCatalog, depth: usize) -> Vec<MatrixEntry> {
    let mut out = Vec::new();
    for (device, region) in catalog::variants() {
        let key = DeviceKey::new(device.id, region);
        let Some(versions) = versions_for(mirror, &key) else {
            log::debug!("{key}: not listed on the mirror");
            continue;
        };
        out.extend(
            versions
                .iter()
                .take(depth)
                .map(|v| MatrixEntry::new(device, region, Some(v.clone()))),
        );
    }
    out
}

/// `{"include": [...]}` in compact form.
pub fn to_json(entries: &[MatrixEntry]) -> Result<String> {
    Ok(serde_json::to_string(&Matrix { include: entries })?)
}

/// Append `matrix=<json>` to the Actions output file.
pub fn append_output(path: &Path, json: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io_with_path(e, path))?;
    writeln!(file, "matrix={json}").map_err(|e| Error::io_with_path(e, path))
}

/// Entry point for `arbwatch matrix`.
pub async fn run(ctx: &AppContext, backfill: bool, depth: Option<usize>) -> Result<()> {
    let entries = if backfill {
        let depth = depth.unwrap_or(ctx.config.matrix.backfill_depth);
        let mirror = ctx.springer()?.fetch_catalog().await?;
        build_backfill_matrix(&mirror, depth)
    } else {
        build_matrix(&ctx.config.matrix.exclude)
    };
    log::info!("Matrix has {} jobs", entries.len());

    let json = to_json(&entries)?;
    match std::env::var_os(GITHUB_OUTPUT_VAR) {
        Some(path) => append_output(Path::new(&path), &json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::MatrixSection;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn has(entries: &[MatrixEntry], device: &str, region: &str) -> bool {
        entries
            .iter()
            .any(|e| e.device == device && e.variant == region)
    }

    // ------------------------------------------------------------------------
    // Regular matrix
    // ------------------------------------------------------------------------

    #[test]
    fn test_matrix_covers_catalog_minus_exclusions() {
        let exclude = MatrixSection::default().exclude;
        let entries = build_matrix(&exclude);

        assert_eq!(
            entries.len(),
            catalog::variants().count() - exclude.len()
        );
        assert!(has(&entries, "15", "GLO"));
        assert!(!has(&entries, "Find X8 Pro", "IN"));
        assert!(!has(&entries, "Find X8", "CN"));
        assert!(!has(&entries, "9R", "IN"));
        assert!(!has(&entries, "Ace 5 Ultimate", "CN"));
    }

    #[test]
    fn test_matrix_entry_fields() {
        let entries = build_matrix(&[]);
        let first = &entries[0];
        assert_eq!(first.device, "15");
        assert_eq!(first.device_short, "15");
        assert_eq!(first.device_name, "OnePlus 15");
        assert!(first.version.is_none());

        let json: serde_json::Value = serde_json::from_str(&to_json(&entries).unwrap()).unwrap();
        assert!(json["include"][0].get("version").is_none());
        assert_eq!(json["include"][0]["variant"], "GLO");
    }

    // ------------------------------------------------------------------------
    // Backfill matrix
    // ------------------------------------------------------------------------

    #[test]
    fn test_backfill_takes_newest_versions() {
        let mut mirror: MirrorCatalog = HashMap::new();
        mirror.insert(
            "OP 15".to_string(),
            HashMap::from([(
                "GLO".to_string(),
                vec!["V4".to_string(), "V3".to_string(), "V2".to_string(), "V1".to_string()],
            )]),
        );
        mirror.insert(
            "OP ACE 3".to_string(),
            HashMap::from([("IN".to_string(), vec!["A1".to_string()])]),
        );

        let entries = build_backfill_matrix(&mirror, 3);
        let versions: Vec<&str> = entries
            .iter()
            .filter(|e| e.device == "15")
            .filter_map(|e| e.version.as_deref())
            .collect();
        assert_eq!(versions, vec!["V4", "V3", "V2"]);
        assert!(entries.iter().any(|e| e.device == "12R" && e.variant == "IN"));
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn test_backfill_empty_mirror() {
        assert!(build_backfill_matrix(&HashMap::new(), 3).is_empty());
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    #[test]
    fn test_append_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "other=1\n").unwrap();
        append_output(&path, "{\"include\":[]}").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "other=1\nmatrix={\"include\":[]}\n"
        );
    }
}
