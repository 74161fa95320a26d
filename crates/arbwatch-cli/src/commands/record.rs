//! `arbwatch record`: store a check result in the variant history.
//!
//! Input comes either from positional arguments or from the `result.json`
//! written by the analysis job:
//!
//! ```json
//! {"device_short": "15", "variant": "GLO", "version": "CPH2747_16.0.1", "arb_index": "1", "major": 3, "minor": 0}
//! ```

use std::path::Path;

use arbwatch_core::{DeviceKey, HistoryStore, Measurement, RecordOutcome};
use chrono::NaiveDate;
use serde_json::Value;

use super::AppContext;
use crate::cli::RecordArgs;
use crate::error::{Error, Result};

/// A fully specified record request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInput {
    /// Device id
    pub device: String,
    /// Region code
    pub region: String,
    /// Firmware version
    pub version: String,
    /// Measured values
    pub measurement: Measurement,
}

impl RecordInput {
    /// Build from positional arguments.
    pub fn from_args(args: &RecordArgs) -> Result<Self> {
        let missing = |name: &str| Error::usage(format!("Missing required argument: {name}"));
        Ok(Self {
            device: args.device.clone().ok_or_else(|| missing("device"))?,
            region: args.region.clone().ok_or_else(|| missing("region"))?,
            version: args.firmware.clone().ok_or_else(|| missing("version"))?,
            measurement: Measurement {
                arb: args.arb.ok_or_else(|| missing("arb"))?,
                major: args.major.unwrap_or(0),
                minor: args.minor.unwrap_or(0),
            },
        })
    }

    /// Build from a result document. String fields fall back to the
    /// positional arguments when absent; numbers may be JSON numbers or
    /// numeric strings.
    pub fn from_json(doc: &Value, args: &RecordArgs) -> Result<Self> {
        let text = |key: &str, fallback: &Option<String>, name: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| fallback.clone())
                .ok_or_else(|| Error::usage(format!("Missing required field in JSON file: {name}")))
        };

        let arb = match doc.get("arb_index").filter(|v| !v.is_null()) {
            Some(v) => Some(v),
            None => doc.get("arb").filter(|v| !v.is_null()),
        };
        let arb = match arb {
            Some(v) => lenient_u32(v, "arb")?,
            None => return Err(Error::usage("Missing required field in JSON file: arb")),
        };

        Ok(Self {
            device: text("device_short", &args.device, "device_short")?,
            region: text("variant", &args.region, "variant")?,
            version: text("version", &args.firmware, "version")?,
            measurement: Measurement {
                arb,
                major: optional_u32(doc, "major")?,
                minor: optional_u32(doc, "minor")?,
            },
        })
    }

    /// Read and parse a result document.
    pub fn from_json_file(path: &Path, args: &RecordArgs) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let doc: Value = serde_json::from_str(&text)?;
        Self::from_json(&doc, args)
    }
}

fn optional_u32(doc: &Value, key: &str) -> Result<u32> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => lenient_u32(v, key),
    }
}

/// Accept `3`, `"3"`, and `" 3 "`.
fn lenient_u32(value: &Value, key: &str) -> Result<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::usage(format!("Field '{key}' is not a number: {value}")))
}

/// Message printed after recording.
pub fn outcome_message(outcome: RecordOutcome, version: &str) -> String {
    if outcome.is_new() {
        format!("Added new version: {version}")
    } else {
        format!("Updated existing version: {version}")
    }
}

/// Apply a record request to the store.
pub fn record(
    store: &HistoryStore,
    input: &RecordInput,
    today: NaiveDate,
    historical: bool,
) -> Result<RecordOutcome> {
    let key = DeviceKey::from_parts(&input.device, &input.region)?;
    Ok(store.record(&key, &input.version, input.measurement, today, historical)?)
}

/// Entry point for `arbwatch record`.
pub fn run(ctx: &AppContext, args: &RecordArgs) -> Result<()> {
    let input = match &args.json_file {
        Some(path) => RecordInput::from_json_file(path, args)?,
        None => RecordInput::from_args(args)?,
    };
    let today = chrono::Local::now().date_naive();
    let outcome = record(&ctx.history_store(), &input, today, args.historical)?;
    println!("{}", outcome_message(outcome, &input.version));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arbwatch_core::EntryStatus;
    use serde_json::json;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn input(version: &str, arb: u32) -> RecordInput {
        RecordInput {
            device: "15".to_string(),
            region: "GLO".to_string(),
            version: version.to_string(),
            measurement: Measurement {
                arb,
                major: 3,
                minor: 0,
            },
        }
    }

    // ------------------------------------------------------------------------
    // Input parsing
    // ------------------------------------------------------------------------

    #[test]
    fn test_from_args_defaults() {
        let args = RecordArgs {
            device: Some("15".to_string()),
            region: Some("GLO".to_string()),
            firmware: Some("V1".to_string()),
            arb: Some(1),
            ..RecordArgs::default()
        };
        let input = RecordInput::from_args(&args).unwrap();
        assert_eq!(input.measurement.major, 0);
        assert_eq!(input.measurement.minor, 0);
    }

    #[test]
    fn test_from_args_missing_arb() {
        let args = RecordArgs {
            device: Some("15".to_string()),
            region: Some("GLO".to_string()),
            firmware: Some("V1".to_string()),
            ..RecordArgs::default()
        };
        assert!(RecordInput::from_args(&args).is_err());
    }

    #[test]
    fn test_from_json_string_numbers() {
        let doc = json!({
            "device_short": "15",
            "variant": "GLO",
            "version": "CPH2747_16.0.1",
            "arb_index": "1",
            "major": "3",
            "minor": 0
        });
        let input = RecordInput::from_json(&doc, &RecordArgs::default()).unwrap();
        assert_eq!(input.device, "15");
        assert_eq!(input.region, "GLO");
        assert_eq!(
            input.measurement,
            Measurement {
                arb: 1,
                major: 3,
                minor: 0
            }
        );
    }

    #[test]
    fn test_from_json_arb_alias_and_fallback() {
        let doc = json!({"version": "V2", "arb": 0});
        let args = RecordArgs {
            device: Some("13".to_string()),
            region: Some("EU".to_string()),
            ..RecordArgs::default()
        };
        let input = RecordInput::from_json(&doc, &args).unwrap();
        assert_eq!(input.device, "13");
        assert_eq!(input.region, "EU");
        assert_eq!(input.measurement.arb, 0);
    }

    #[test]
    fn test_from_json_missing_fields() {
        let doc = json!({"device_short": "15", "variant": "GLO", "version": "V"});
        assert!(RecordInput::from_json(&doc, &RecordArgs::default()).is_err());

        let doc = json!({"device_short": "15", "version": "V", "arb": 1});
        assert!(RecordInput::from_json(&doc, &RecordArgs::default()).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_numeric() {
        let doc = json!({"device_short": "15", "variant": "GLO", "version": "V", "arb": "one"});
        let err = RecordInput::from_json(&doc, &RecordArgs::default()).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    // ------------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------------

    #[test]
    fn test_record_new_then_existing() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());

        let outcome = record(&store, &input("V1", 0), day(1), false).unwrap();
        assert_eq!(outcome_message(outcome, "V1"), "Added new version: V1");

        let outcome = record(&store, &input("V1", 0), day(2), false).unwrap();
        assert_eq!(
            outcome_message(outcome, "V1"),
            "Updated existing version: V1"
        );

        let history = store
            .load(&DeviceKey::from_parts("15", "GLO").unwrap())
            .unwrap();
        assert_eq!(history.history.len(), 1);
        assert_eq!(history.history[0].last_checked, day(2));
        assert_eq!(history.device.as_deref(), Some("OnePlus 15"));
    }

    #[test]
    fn test_record_historical_is_not_new() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());
        record(&store, &input("V2", 1), day(1), false).unwrap();
        let outcome = record(&store, &input("V1", 0), day(1), true).unwrap();
        assert!(!outcome.is_new());

        let history = store
            .load(&DeviceKey::from_parts("15", "GLO").unwrap())
            .unwrap();
        assert_eq!(history.history[0].version, "V2");
        assert_eq!(history.history[0].status, EntryStatus::Current);
        assert_eq!(history.history[1].status, EntryStatus::Archived);
    }

    #[test]
    fn test_record_rejects_unknown_region() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path());
        let mut bad = input("V1", 0);
        bad.region = "XX".to_string();
        assert!(record(&store, &bad, day(1), false).is_err());
        assert!(!dir.path().join("15_XX.json").exists());
    }
}
