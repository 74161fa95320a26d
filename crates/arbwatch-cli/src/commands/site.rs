//! `arbwatch site`: status website data.

use std::path::Path;

use arbwatch_content::readme::HistoryMap;
use arbwatch_content::site::{self, SiteData};
use arbwatch_core::{HistoryStore, catalog};
use chrono::{DateTime, Utc};

use super::AppContext;
use crate::error::{Error, Result};

/// Build the page data. A missing history directory gives an empty site.
pub fn collect(store: &HistoryStore, now: DateTime<Utc>) -> Result<SiteData> {
    let histories = if store.exists() {
        store.load_all()?
    } else {
        log::warn!(
            "History directory not found: {}. Generating empty site.",
            store.dir().display()
        );
        HistoryMap::new()
    };
    Ok(site::build(catalog::devices(), &histories, now))
}

/// Entry point for `arbwatch site`.
pub fn run(ctx: &AppContext, output: Option<&Path>) -> Result<()> {
    let data = collect(&ctx.history_store(), Utc::now())?;
    let json = serde_json::to_string_pretty(&data)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
            }
            std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))?;
            log::info!("Site data written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arbwatch_core::{DeviceKey, Measurement, Region};
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_collect_without_history_dir() {
        let dir = TempDir::new().unwrap();
        let data = collect(&HistoryStore::new(dir.path().join("missing")), now()).unwrap();
        assert!(data.devices.is_empty());
        assert_eq!(data.generated_at, "2025-06-01 08:30 UTC");
    }

    #[test]
    fn test_collect_current_builds() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history"));
        let key = DeviceKey::new("15", Region::Glo);
        let day = NaiveDate::from_ymd_opt(2025, 5, 30).unwrap();
        store
            .record(&key, "V1", Measurement::default(), day, false)
            .unwrap();
        store
            .record(
                &key,
                "V2",
                Measurement {
                    arb: 1,
                    major: 3,
                    minor: 0,
                },
                day,
                false,
            )
            .unwrap();

        let data = collect(&store, now()).unwrap();
        assert_eq!(data.devices.len(), 1);
        let variant = &data.devices[0].variants[0];
        assert_eq!(variant.version, "V2");
        assert_eq!(variant.arb, 1);
        assert!(!variant.is_safe);
    }
}
