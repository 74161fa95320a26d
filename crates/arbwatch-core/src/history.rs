//! Per-variant firmware history.
//!
//! Each tracked variant has one JSON file under the history directory,
//! named `<device>_<REGION>.json`. The newest observed firmware sits at the
//! front with status `current`; everything older is `archived`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Region};
use crate::ids::DeviceKey;
use crate::{Error, Result};

// ============================================================================
// Entries
// ============================================================================

/// Whether an entry is the variant's live firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Latest firmware for the variant.
    Current,
    /// Superseded or backfilled firmware.
    Archived,
}

/// One observed firmware build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Firmware version string as published.
    pub version: String,
    /// Anti-rollback index.
    pub arb: u32,
    /// OEM major version.
    pub major: u32,
    /// OEM minor version.
    pub minor: u32,
    /// Date the version was first recorded.
    pub first_seen: NaiveDate,
    /// Date the version was last confirmed.
    pub last_checked: NaiveDate,
    /// Current or archived.
    pub status: EntryStatus,
}

impl HistoryEntry {
    /// Whether the build can be flashed over without a rollback fuse trip.
    pub fn is_safe(&self) -> bool {
        self.arb == 0
    }
}

/// Firmware measurements passed to [`VariantHistory::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Anti-rollback index.
    pub arb: u32,
    /// OEM major version.
    pub major: u32,
    /// OEM minor version.
    pub minor: u32,
}

/// What [`VariantHistory::record`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new version became current.
    Added,
    /// A known archived version became current again.
    Promoted,
    /// A known version had its check date refreshed.
    Refreshed,
    /// A historical version was appended as archived.
    Backfilled,
}

impl RecordOutcome {
    /// Whether the variant's current firmware changed.
    pub fn is_new(self) -> bool {
        matches!(self, RecordOutcome::Added | RecordOutcome::Promoted)
    }
}

// ============================================================================
// VariantHistory
// ============================================================================

/// History document for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantHistory {
    /// Display name of the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Short device id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Region code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Model number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Entries, newest current first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl VariantHistory {
    /// The current entry, or the first entry if none is marked current.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.history
            .iter()
            .find(|e| e.status == EntryStatus::Current)
            .or_else(|| self.history.first())
    }

    /// Fill device metadata from the catalog if the document lacks it.
    pub fn ensure_metadata(&mut self, key: &DeviceKey) {
        if self.device.as_deref().is_some_and(|d| !d.is_empty()) {
            return;
        }
        self.device = Some(catalog::display_name(&key.device));
        self.device_id = Some(key.device.clone());
        self.region = Some(key.region);
        self.model = Some(catalog::model_number(&key.device, key.region).to_string());
    }

    /// Record an observation of `version`.
    ///
    /// Live observations make the version current and archive the rest.
    /// Historical observations never change which entry is current.
    pub fn record(
        &mut self,
        version: &str,
        m: Measurement,
        today: NaiveDate,
        historical: bool,
    ) -> RecordOutcome {
        if let Some(idx) = self.history.iter().position(|e| e.version == version) {
            self.history[idx].last_checked = today;
            if historical || self.history[idx].status != EntryStatus::Archived {
                return RecordOutcome::Refreshed;
            }
            self.archive_all();
            let mut entry = self.history.remove(idx);
            entry.status = EntryStatus::Current;
            self.history.insert(0, entry);
            return RecordOutcome::Promoted;
        }

        let entry = HistoryEntry {
            version: version.to_string(),
            arb: m.arb,
            major: m.major,
            minor: m.minor,
            first_seen: today,
            last_checked: today,
            status: if historical {
                EntryStatus::Archived
            } else {
                EntryStatus::Current
            },
        };

        if historical {
            self.history.push(entry);
            RecordOutcome::Backfilled
        } else {
            self.archive_all();
            self.history.insert(0, entry);
            RecordOutcome::Added
        }
    }

    fn archive_all(&mut self) {
        for e in &mut self.history {
            e.status = EntryStatus::Archived;
        }
    }
}

// ============================================================================
// HistoryStore
// ============================================================================

/// Directory of variant history files.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Open a store rooted at `dir`. The directory need not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the store directory exists.
    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Path of the history file for `key`.
    pub fn path_for(&self, key: &DeviceKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }

    /// Load a variant's history, or an empty one if no file exists.
    pub fn load(&self, key: &DeviceKey) -> Result<VariantHistory> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(VariantHistory::default());
        }
        read_history(&path)
    }

    /// Write a variant's history as pretty JSON, creating the directory.
    pub fn save(&self, key: &DeviceKey, history: &VariantHistory) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io_with_path(e, &self.dir))?;
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(history)?;
        fs::write(&path, json).map_err(|e| Error::io_with_path(e, &path))?;
        log::debug!("Saved history for {key} to {}", path.display());
        Ok(path)
    }

    /// Load, record, and save in one step.
    pub fn record(
        &self,
        key: &DeviceKey,
        version: &str,
        m: Measurement,
        today: NaiveDate,
        historical: bool,
    ) -> Result<RecordOutcome> {
        let mut history = self.load(key)?;
        history.ensure_metadata(key);
        let outcome = history.record(version, m, today, historical);
        self.save(key, &history)?;
        log::info!("{key}: {outcome:?} {version}");
        Ok(outcome)
    }

    /// Load every `*.json` file keyed by file stem.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn load_all(&self) -> Result<BTreeMap<String, VariantHistory>> {
        let mut out = BTreeMap::new();
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io_with_path(e, &self.dir))?;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {e}", self.dir.display());
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match read_history(&path) {
                Ok(history) => {
                    out.insert(stem.to_string(), history);
                }
                Err(e) => log::warn!("Skipping {}: {e}", path.display()),
            }
        }
        Ok(out)
    }
}

fn read_history(path: &Path) -> Result<VariantHistory> {
    let text = fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    Ok(serde_json::from_str(&text)?)
}
