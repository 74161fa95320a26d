//! Springer firmware history INI parsing.
//!
//! The mirror publishes an INI file with one section per device/region,
//! listing past builds as alternating `url=` / `version=` lines:
//!
//! ```text
//! [OP 15 GLO]
//! url=https://example.com/a.zip
//! version=CPH2747_16.0.1.100
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use arbwatch_core::{DeviceKey, catalog};
use regex::{Regex, RegexBuilder};

/// Default number of builds returned per section.
pub const DEFAULT_MAX_VERSIONS: usize = 4;

static NEXT_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[").expect("Invalid section regex"));

static KEY_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\w+)=(.*)$").expect("Invalid key/value regex"));

/// One historical build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Firmware version string
    pub version: String,
    /// Download URL
    pub url: String,
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.version, self.url)
    }
}

/// INI section name for a variant: `<springer label> <REGION>`.
///
/// ```
/// use arbwatch_core::{DeviceKey, Region};
/// use arbwatch_content::firmware_index::section_name;
///
/// assert_eq!(section_name(&DeviceKey::new("12R", Region::In)), "OP ACE 3 IN");
/// ```
pub fn section_name(key: &DeviceKey) -> String {
    format!("{} {}", catalog::springer_name(&key.device), key.region.code())
}

/// Parse up to `max` builds from the named section.
///
/// Section lookup is case-insensitive and the section ends at the next
/// line starting with `[`. Each `version=` is paired with the preceding
/// `url=`; versions without a URL or empty versions are dropped and the
/// first occurrence of a version wins.
pub fn parse_section(ini: &str, section: &str, max: usize) -> Vec<IndexEntry> {
    if max == 0 {
        return Vec::new();
    }

    let header = RegexBuilder::new(&format!(r"^\[{}\]", regex::escape(section)))
        .case_insensitive(true)
        .multi_line(true)
        .build();
    let Ok(header) = header else {
        log::warn!("Cannot build header pattern for section '{section}'");
        return Vec::new();
    };
    let Some(found) = header.find(ini) else {
        log::debug!("Section [{section}] not found");
        return Vec::new();
    };

    let rest = &ini[found.end()..];
    let block = match NEXT_SECTION_RE.find(rest) {
        Some(next) => &rest[..next.start()],
        None => rest,
    };

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut current_url: Option<String> = None;

    for caps in KEY_VALUE_RE.captures_iter(block) {
        let key = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        match key.to_lowercase().as_str() {
            "url" => current_url = Some(value.to_string()),
            "version" => {
                if value.is_empty() {
                    continue;
                }
                let Some(url) = current_url.take().filter(|u| !u.is_empty()) else {
                    continue;
                };
                if seen.insert(value.to_string()) {
                    out.push(IndexEntry {
                        version: value.to_string(),
                        url,
                    });
                }
                if out.len() >= max {
                    break;
                }
            }
            _ => {}
        }
    }
    out
}
