//! Static device catalog.
//!
//! The catalog lists every tracked device, the regions it ships in, and the
//! model number per region. It also carries the identifier mappings needed
//! to talk to the two firmware sources:
//!
//! - the OOS downloader API, keyed by snake_case ids (`oneplus_15`)
//! - the Springer OTA mirror, keyed by upper-case labels (`OP 15`)
//!
//! Catalog order is significant: the README lists devices in this order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Springer OTA mirror page.
pub const BASE_URL: &str = "https://roms.danielspringer.at/index.php?view=ota";

/// OOS downloader API root.
pub const OOS_API_URL: &str = "https://oosdownloader-gui.fly.dev/api";

/// Browser user agent sent to both firmware sources.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default location of the per-variant history files, relative to the project root.
pub const HISTORY_DIR: &str = "data/history";

// ============================================================================
// Region
// ============================================================================

/// Firmware distribution region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Global
    Glo,
    /// Europe
    Eu,
    /// India
    In,
    /// North America
    Na,
    /// China
    Cn,
    /// Indonesia
    Id,
    /// Malaysia
    My,
}

impl Region {
    /// All regions in display order.
    pub const ALL: [Region; 7] = [
        Region::Glo,
        Region::Eu,
        Region::In,
        Region::Na,
        Region::Cn,
        Region::Id,
        Region::My,
    ];

    /// Region code as used in file names, marker ids, and mirror sections.
    pub fn code(self) -> &'static str {
        match self {
            Region::Glo => "GLO",
            Region::Eu => "EU",
            Region::In => "IN",
            Region::Na => "NA",
            Region::Cn => "CN",
            Region::Id => "ID",
            Region::My => "MY",
        }
    }

    /// Human-readable name for the README table.
    pub fn display_name(self) -> &'static str {
        match self {
            Region::Glo => "Global",
            Region::Eu => "Europe",
            Region::In => "India",
            Region::Cn => "China",
            Region::Na | Region::Id | Region::My => self.code(),
        }
    }

    /// Sort rank: GLO, EU, IN, NA, CN first, everything else after.
    pub fn rank(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.code() == s)
            .ok_or_else(|| Error::UnknownRegion {
                device: String::new(),
                region: s.to_string(),
            })
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Device metadata
// ============================================================================

/// Catalog entry for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceMeta {
    /// Short device id (`15`, `10 Pro`, `Find X8`).
    pub id: &'static str,
    /// Display name (`OnePlus 15`).
    pub name: &'static str,
    /// Model number per region, in catalog order.
    pub models: &'static [(Region, &'static str)],
}

impl DeviceMeta {
    /// Regions this device ships in, in display order.
    pub fn regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = self.models.iter().map(|(r, _)| *r).collect();
        regions.sort_by_key(|r| r.rank());
        regions
    }

    /// Model number for a region, if the device ships there.
    pub fn model(&self, region: Region) -> Option<&'static str> {
        self.models
            .iter()
            .find(|(r, _)| *r == region)
            .map(|(_, m)| *m)
    }
}

use Region::{Cn, Eu, Glo, Id, In, My, Na};

static DEVICES: &[DeviceMeta] = &[
    DeviceMeta {
        id: "15",
        name: "OnePlus 15",
        models: &[(Glo, "CPH2747"), (Eu, "CPH2747"), (In, "CPH2745"), (Cn, "PLK110")],
    },
    DeviceMeta {
        id: "15R",
        name: "OnePlus 15R",
        models: &[(Glo, "CPH2741"), (Eu, "CPH2741"), (In, "CPH2741")],
    },
    DeviceMeta {
        id: "13",
        name: "OnePlus 13",
        models: &[(Glo, "CPH2649"), (Eu, "CPH2649"), (In, "CPH2649"), (Cn, "PJZ110")],
    },
    DeviceMeta {
        id: "12",
        name: "OnePlus 12",
        models: &[(Glo, "CPH2573"), (Eu, "CPH2573"), (In, "CPH2573"), (Cn, "PJD110")],
    },
    DeviceMeta {
        id: "12R",
        name: "OnePlus 12R",
        models: &[(Glo, "CPH2585"), (Eu, "CPH2609"), (In, "CPH2585")],
    },
    DeviceMeta {
        id: "11",
        name: "OnePlus 11",
        models: &[(Glo, "CPH2449"), (Eu, "CPH2449"), (In, "CPH2447")],
    },
    DeviceMeta {
        id: "11R",
        name: "OnePlus 11R",
        models: &[(In, "CPH2487")],
    },
    DeviceMeta {
        id: "10 Pro",
        name: "OnePlus 10 Pro",
        models: &[(Glo, "NE2215"), (Eu, "NE2213"), (In, "NE2211"), (Cn, "NE2210")],
    },
    DeviceMeta {
        id: "10T",
        name: "OnePlus 10T",
        models: &[(Glo, "CPH2417"), (Eu, "CPH2415"), (In, "CPH2413")],
    },
    DeviceMeta {
        id: "10R",
        name: "OnePlus 10R",
        models: &[(In, "CPH2423")],
    },
    DeviceMeta {
        id: "9 Pro",
        name: "OnePlus 9 Pro",
        models: &[(Na, "LE2125"), (Eu, "LE2123"), (In, "LE2121")],
    },
    DeviceMeta {
        id: "9",
        name: "OnePlus 9",
        models: &[(Na, "LE2115"), (Eu, "LE2113"), (In, "LE2111")],
    },
    DeviceMeta {
        id: "9RT",
        name: "OnePlus 9RT",
        models: &[(In, "MT2111")],
    },
    DeviceMeta {
        id: "9R",
        name: "OnePlus 9R",
        models: &[(In, "LE2101")],
    },
    DeviceMeta {
        id: "Ace 6T",
        name: "OnePlus Ace 6T",
        models: &[(Cn, "PLR110")],
    },
    DeviceMeta {
        id: "Ace 5",
        name: "OnePlus Ace 5",
        models: &[(Cn, "Unknown")],
    },
    DeviceMeta {
        id: "Ace 5 Pro",
        name: "OnePlus Ace 5 Pro",
        models: &[(Cn, "Unknown")],
    },
    DeviceMeta {
        id: "Ace 5 Ultimate",
        name: "OnePlus Ace 5 Ultimate",
        models: &[(Cn, "Unknown")],
    },
    DeviceMeta {
        id: "Pad 2 Pro",
        name: "OnePlus Pad 2 Pro",
        models: &[(Cn, "Unknown")],
    },
    DeviceMeta {
        id: "Pad 3",
        name: "OnePlus Pad 3",
        models: &[(Glo, "Unknown"), (Eu, "Unknown"), (In, "Unknown")],
    },
    DeviceMeta {
        id: "Pad 2",
        name: "OnePlus Pad 2",
        models: &[(Glo, "Unknown"), (Eu, "Unknown"), (In, "Unknown")],
    },
    DeviceMeta {
        id: "Find X8",
        name: "Oppo Find X8",
        models: &[(Cn, "Unknown"), (In, "Unknown")],
    },
    DeviceMeta {
        id: "Find X8 Pro",
        name: "Oppo Find X8 Pro",
        models: &[(Cn, "Unknown"), (Eu, "Unknown"), (In, "Unknown")],
    },
    DeviceMeta {
        id: "Find X8 Ultra",
        name: "Oppo Find X8 Ultra",
        models: &[(Cn, "Unknown")],
    },
    DeviceMeta {
        id: "Find N3",
        name: "Oppo Find N3",
        models: &[(Id, "CPH2499"), (In, "Unknown"), (My, "Unknown")],
    },
];

/// Device id → OOS downloader id.
static OOS_MAPPING: &[(&str, &str)] = &[
    ("15", "oneplus_15"),
    ("15R", "oneplus_15r"),
    ("13", "oneplus_13"),
    ("12", "oneplus_12"),
    ("12R", "oneplus_12r"),
    ("11", "oneplus_11"),
    ("11R", "oneplus_11r"),
    ("10 Pro", "oneplus_10_pro"),
    ("10T", "oneplus_10t"),
    ("10R", "oneplus_10r_80w"),
    ("9 Pro", "oneplus_9_pro"),
    ("9", "oneplus_9"),
    ("9RT", "oneplus_9rt"),
    ("9R", "oneplus_9r"),
    ("Ace 6T", "oneplus_ace_6t"),
    ("Ace 5", "oneplus_ace_5"),
    ("Ace 5 Pro", "oneplus_ace_5_pro"),
    ("Ace 5 Ultimate", "oneplus_ace_5_ultimate"),
    ("Pad 2 Pro", "oneplus_pad2_pro"),
    ("Pad 3", "oneplus_pad_3"),
    ("Pad 2", "oneplus_pad_2"),
    ("Find X8", "oppo_find_x8"),
    ("Find X8 Pro", "oppo_find_x8_pro"),
    ("Find X8 Ultra", "oppo_find_x8_ultra"),
    ("Find N3", "oppo_find_n3"),
];

/// OOS downloader id → Springer mirror label.
static SPRINGER_MAPPING: &[(&str, &str)] = &[
    ("oneplus_15", "OP 15"),
    ("oneplus_15r", "OP 15R"),
    ("oneplus_11", "OP 11"),
    ("oneplus_11r", "OP 11R"),
    ("oneplus_10_pro", "OP 10 PRO"),
    ("oneplus_13", "OP 13"),
    ("oneplus_12", "OP 12"),
    ("oneplus_12r", "OP ACE 3"),
    ("oneplus_ace_6t", "OP ACE 6T"),
    ("oneplus_ace_5", "OP ACE 5"),
    ("oneplus_ace_5_pro", "OP ACE 5 PRO"),
    ("oneplus_ace_5_ultimate", "OP ACE 5 ULTRA"),
    ("oneplus_pad2_pro", "OP PAD2 PRO"),
    ("oneplus_pad_3", "OP PAD3"),
    ("oneplus_pad_2", "OP PAD2"),
    ("oppo_find_x8", "OPPO FIND X8"),
    ("oppo_find_x8_pro", "OPPO FIND X8 PRO"),
    ("oppo_find_x8_ultra", "OPPO FIND X8 ULTRA"),
];

// ============================================================================
// Lookups
// ============================================================================

/// All catalog devices in display order.
pub fn devices() -> &'static [DeviceMeta] {
    DEVICES
}

/// Look up a device by its short id.
pub fn device(id: &str) -> Option<&'static DeviceMeta> {
    DEVICES.iter().find(|d| d.id == id)
}

/// Look up a device, failing with [`Error::UnknownDevice`].
pub fn require_device(id: &str) -> Result<&'static DeviceMeta> {
    device(id).ok_or_else(|| Error::UnknownDevice(id.to_string()))
}

/// Display name for a device id, falling back to `OnePlus <id>`.
pub fn display_name(id: &str) -> String {
    device(id)
        .map(|d| d.name.to_string())
        .unwrap_or_else(|| format!("OnePlus {id}"))
}

/// Model number for a device/region, falling back to `Unknown`.
pub fn model_number(id: &str, region: Region) -> &'static str {
    device(id).and_then(|d| d.model(region)).unwrap_or("Unknown")
}

/// OOS downloader id for a device.
///
/// Unmapped devices fall back to `oneplus_<id>` in snake case.
pub fn oos_id(id: &str) -> String {
    OOS_MAPPING
        .iter()
        .find(|(k, _)| *k == id)
        .map(|(_, v)| (*v).to_string())
        .unwrap_or_else(|| format!("oneplus_{}", id.to_lowercase().replace(' ', "_")))
}

/// Springer mirror label for a device.
///
/// Unmapped devices fall back to `OP <ID>`.
pub fn springer_name(id: &str) -> String {
    let key = oos_id(id);
    SPRINGER_MAPPING
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| (*v).to_string())
        .unwrap_or_else(|| format!("OP {}", id.to_uppercase()))
}

/// Vendor segment used in OOS downloader routes (`oneplus` or `oppo`).
pub fn brand(id: &str) -> &'static str {
    if oos_id(id).starts_with("oppo_") || display_name(id).starts_with("Oppo") {
        "oppo"
    } else {
        "oneplus"
    }
}

/// Iterate all `(device, region)` variants of the catalog.
pub fn variants() -> impl Iterator<Item = (&'static DeviceMeta, Region)> {
    DEVICES
        .iter()
        .flat_map(|d| d.models.iter().map(move |(r, _)| (d, *r)))
}
