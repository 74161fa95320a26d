//! Identifiers for tracked device variants.
//!
//! A variant is one `(device, region)` pair. It has two textual forms:
//!
//! - the file stem of its history file, `<device>_<REGION>` (`10 Pro_GLO`)
//! - the placeholder marker id, upper-cased with spaces as `_` (`10_PRO_GLO`)

use std::fmt;
use std::str::FromStr;

use crate::catalog::{self, Region};
use crate::{Error, Result};

/// Vendor prefixes accepted on CLI input and stripped before lookup.
const VENDOR_PREFIXES: &[&str] = &["oneplus_", "oppo_"];

/// One tracked `(device, region)` variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey {
    /// Short device id as listed in the catalog (`15`, `10 Pro`).
    pub device: String,
    /// Distribution region.
    pub region: Region,
}

impl DeviceKey {
    /// Create a key, mapping OOS-style ids (`oppo_find_x8`, `10_pro`) to
    /// the catalog id and stripping any vendor prefix otherwise.
    pub fn new(device: impl AsRef<str>, region: Region) -> Self {
        Self {
            device: canonical_device(device.as_ref()),
            region,
        }
    }

    /// Create a key from raw CLI input, checking the region code.
    pub fn from_parts(device: &str, region: &str) -> Result<Self> {
        let region = region.parse::<Region>().map_err(|_| Error::UnknownRegion {
            device: device.to_string(),
            region: region.to_string(),
        })?;
        Ok(Self::new(device, region))
    }

    /// History file name without extension.
    ///
    /// ```
    /// use arbwatch_core::catalog::Region;
    /// use arbwatch_core::ids::DeviceKey;
    ///
    /// let key = DeviceKey::new("10 Pro", Region::Glo);
    /// assert_eq!(key.file_stem(), "10 Pro_GLO");
    /// ```
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.device, self.region.code())
    }

    /// Placeholder marker id.
    ///
    /// ```
    /// use arbwatch_core::catalog::Region;
    /// use arbwatch_core::ids::DeviceKey;
    ///
    /// assert_eq!(DeviceKey::new("15", Region::Glo).marker_id(), "15_GLO");
    /// assert_eq!(DeviceKey::new("10 Pro", Region::In).marker_id(), "10_PRO_IN");
    /// ```
    pub fn marker_id(&self) -> String {
        format!("{}_{}", marker_device(&self.device), self.region.code())
    }

    /// Whether the catalog lists this variant.
    pub fn in_catalog(&self) -> bool {
        catalog::device(&self.device)
            .and_then(|d| d.model(self.region))
            .is_some()
    }

    /// Every variant in the catalog, in catalog order.
    pub fn all() -> Vec<DeviceKey> {
        catalog::variants()
            .map(|(d, r)| DeviceKey::new(d.id, r))
            .collect()
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.device, self.region)
    }
}

/// Parses either form: `10 Pro_GLO` or `10_PRO_GLO`.
///
/// The region is split off at the last `_`. Marker-form device ids are
/// mapped back to the catalog id when one matches.
impl FromStr for DeviceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (device, region) = s
            .rsplit_once('_')
            .ok_or_else(|| Error::parse(format!("expected <device>_<REGION>, got '{s}'")))?;
        if device.is_empty() {
            return Err(Error::parse(format!("missing device in '{s}'")));
        }
        let device = catalog::devices()
            .iter()
            .find(|d| marker_device(d.id) == device)
            .map(|d| d.id)
            .unwrap_or(device);
        DeviceKey::from_parts(device, region)
    }
}

/// Catalog id for raw device input.
///
/// Input is matched case-insensitively against each device's id and OOS
/// id, the latter with or without the vendor prefix. Unmatched input has
/// its prefix stripped.
///
/// ```
/// use arbwatch_core::ids::canonical_device;
///
/// assert_eq!(canonical_device("oppo_find_x8"), "Find X8");
/// assert_eq!(canonical_device("oneplus_10_pro"), "10 Pro");
/// assert_eq!(canonical_device("10 Pro"), "10 Pro");
/// ```
pub fn canonical_device(input: &str) -> String {
    let stripped = strip_vendor_prefix(input);
    if let Some(d) = catalog::device(stripped) {
        return d.id.to_string();
    }
    catalog::devices()
        .iter()
        .find(|d| {
            if d.id.eq_ignore_ascii_case(stripped) {
                return true;
            }
            let oos = catalog::oos_id(d.id);
            oos.eq_ignore_ascii_case(input)
                || strip_vendor_prefix(&oos).eq_ignore_ascii_case(stripped)
        })
        .map(|d| d.id.to_string())
        .unwrap_or_else(|| stripped.to_string())
}

/// Upper-case a device id and replace spaces with `_`.
pub fn marker_device(device: &str) -> String {
    device.to_uppercase().replace(' ', "_")
}

/// Strip a leading `oneplus_` / `oppo_` prefix.
///
/// ```
/// use arbwatch_core::ids::strip_vendor_prefix;
///
/// assert_eq!(strip_vendor_prefix("oneplus_15"), "15");
/// assert_eq!(strip_vendor_prefix("15"), "15");
/// ```
pub fn strip_vendor_prefix(device: &str) -> &str {
    VENDOR_PREFIXES
        .iter()
        .find_map(|p| device.strip_prefix(p))
        .unwrap_or(device)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // -------------------------------------------------------------------------
    // Formatting
    // -------------------------------------------------------------------------

    #[test]
    fn test_file_stem_keeps_spaces() {
        let key = DeviceKey::new("Find X8 Pro", Region::Eu);
        assert_eq!(key.file_stem(), "Find X8 Pro_EU");
    }

    #[test]
    fn test_marker_id_examples() {
        assert_eq!(DeviceKey::new("15", Region::Glo).marker_id(), "15_GLO");
        assert_eq!(DeviceKey::new("13R", Region::Eu).marker_id(), "13R_EU");
        assert_eq!(DeviceKey::new("10 Pro", Region::In).marker_id(), "10_PRO_IN");
    }

    #[test]
    fn test_marker_ids_unique_across_catalog() {
        let keys = DeviceKey::all();
        let ids: HashSet<String> = keys.iter().map(DeviceKey::marker_id).collect();
        assert_eq!(ids.len(), keys.len());
    }

    // -------------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_file_stem() {
        let key: DeviceKey = "10 Pro_GLO".parse().unwrap();
        assert_eq!(key, DeviceKey::new("10 Pro", Region::Glo));
    }

    #[test]
    fn test_parse_marker_id_maps_to_catalog_id() {
        let key: DeviceKey = "FIND_X8_PRO_CN".parse().unwrap();
        assert_eq!(key.device, "Find X8 Pro");
        assert_eq!(key.region, Region::Cn);
    }

    #[test]
    fn test_parse_unknown_region() {
        let err = "15_XX".parse::<DeviceKey>().unwrap_err();
        assert!(matches!(err, Error::UnknownRegion { ref region, .. } if region == "XX"));
    }

    #[test]
    fn test_parse_without_separator() {
        assert!("15GLO".parse::<DeviceKey>().is_err());
        assert!("_GLO".parse::<DeviceKey>().is_err());
    }

    #[test]
    fn test_strip_vendor_prefix() {
        assert_eq!(strip_vendor_prefix("oneplus_15"), "15");
        assert_eq!(strip_vendor_prefix("oppo_find_x8"), "find_x8");
        assert_eq!(strip_vendor_prefix("Find X8"), "Find X8");
    }

    #[test]
    fn test_new_strips_prefix() {
        let key = DeviceKey::new("oneplus_15", Region::Glo);
        assert_eq!(key.device, "15");
        assert!(key.in_catalog());
    }

    #[test]
    fn test_from_parts_maps_oos_ids_to_catalog() {
        let key = DeviceKey::from_parts("oppo_find_x8", "CN").unwrap();
        assert_eq!(key.device, "Find X8");
        assert!(key.in_catalog());
        assert_eq!(key.file_stem(), "Find X8_CN");
        assert_eq!(catalog::brand(&key.device), "oppo");

        let key = DeviceKey::from_parts("oneplus_10_pro", "GLO").unwrap();
        assert_eq!(key.device, "10 Pro");
        assert!(key.in_catalog());
        assert_eq!(key.file_stem(), "10 Pro_GLO");
    }

    #[test]
    fn test_canonical_device_unknown_input_is_stripped() {
        assert_eq!(canonical_device("oneplus_nord_9"), "nord_9");
        assert_eq!(canonical_device("Nord"), "Nord");
        assert_eq!(canonical_device("10r"), "10R");
    }

    #[test]
    fn test_in_catalog_rejects_missing_region() {
        assert!(!DeviceKey::new("15R", Region::Cn).in_catalog());
        assert!(!DeviceKey::new("Nord", Region::Glo).in_catalog());
    }
}
