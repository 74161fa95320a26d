//! Comment-delimited placeholder fields.
//!
//! Every tracked value in the status README sits between a pair of HTML
//! comments:
//!
//! ```text
//! <!-- ARB_START_15_GLO -->0<!-- ARB_END_15_GLO -->
//! ```
//!
//! The comments are invisible when rendered, so automation can rewrite the
//! value without touching the surrounding table. This module finds, reads,
//! rewrites, and validates those pairs. All edits preserve every byte
//! outside the replaced value.
//!
//! # Example
//!
//! ```rust
//! use arbwatch_content::placeholders::{apply, read, wrap, Field};
//!
//! let doc = format!("| {} |", wrap(Field::Arb, "15_GLO", "-"));
//! let doc = apply(&doc, Field::Arb, "15_GLO", "0").unwrap();
//! assert_eq!(read(&doc, Field::Arb, "15_GLO"), Some("0"));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use arbwatch_core::{HistoryEntry, VariantHistory};
use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Error, Result};

/// Status icon for ARB == 0.
pub const SAFE_ICON: &str = "✅";

/// Status icon for ARB > 0.
pub const PROTECTED_ICON: &str = "❌";

/// Version text for an entry recorded with an empty version string.
pub const UNKNOWN_VERSION: &str = "*Unknown*";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- (VERSION|ARB|MAJOR|MINOR|DATE|STATUS)_(START|END)_([A-Za-z0-9_]+) -->")
        .expect("Invalid marker regex")
});

// ============================================================================
// Field
// ============================================================================

/// A tracked placeholder field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Firmware version string
    Version,
    /// Anti-rollback index
    Arb,
    /// OEM major version
    Major,
    /// OEM minor version
    Minor,
    /// Last-checked date
    Date,
    /// Safety icon
    Status,
}

impl Field {
    /// All fields in canonical order.
    pub const ALL: [Field; 6] = [
        Field::Version,
        Field::Arb,
        Field::Major,
        Field::Minor,
        Field::Date,
        Field::Status,
    ];

    /// Marker name (`VERSION`, `ARB`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Field::Version => "VERSION",
            Field::Arb => "ARB",
            Field::Major => "MAJOR",
            Field::Minor => "MINOR",
            Field::Date => "DATE",
            Field::Status => "STATUS",
        }
    }

    /// Text shown while the field has no data.
    pub fn sentinel(self) -> &'static str {
        match self {
            Field::Version => "Waiting for scan...",
            _ => "-",
        }
    }

    /// Parse a marker name.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `<!-- {FIELD}_START_{ID} -->`
pub fn start_marker(field: Field, id: &str) -> String {
    format!("<!-- {}_START_{id} -->", field.name())
}

/// `<!-- {FIELD}_END_{ID} -->`
pub fn end_marker(field: Field, id: &str) -> String {
    format!("<!-- {}_END_{id} -->", field.name())
}

/// Surround `value` with the field's START and END markers.
pub fn wrap(field: Field, id: &str, value: &str) -> String {
    format!("{}{value}{}", start_marker(field, id), end_marker(field, id))
}

// ============================================================================
// Scanning
// ============================================================================

/// Which half of a pair a marker is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Opening comment
    Start,
    /// Closing comment
    End,
}

/// One marker comment found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Field the marker belongs to
    pub field: Field,
    /// Start or end
    pub kind: MarkerKind,
    /// Device/region id
    pub id: &'a str,
    /// Byte span of the whole comment
    pub span: Range<usize>,
}

/// A START/END pair and the value between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Field the pair belongs to
    pub field: Field,
    /// Device/region id
    pub id: &'a str,
    /// Text between the markers
    pub value: &'a str,
    /// Byte span of the value
    pub value_span: Range<usize>,
    /// Byte span from the start of START to the end of END
    pub span: Range<usize>,
}

/// Every marker comment in document order.
pub fn markers(document: &str) -> Vec<Marker<'_>> {
    MARKER_RE
        .captures_iter(document)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let field = Field::from_name(caps.get(1)?.as_str())?;
            let kind = match caps.get(2)?.as_str() {
                "START" => MarkerKind::Start,
                _ => MarkerKind::End,
            };
            Some(Marker {
                field,
                kind,
                id: caps.get(3)?.as_str(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Every START marker paired with the next matching END, in document order.
pub fn scan(document: &str) -> Vec<Placeholder<'_>> {
    let all = markers(document);
    let mut out = Vec::new();
    for (i, start) in all.iter().enumerate() {
        if start.kind != MarkerKind::Start {
            continue;
        }
        let end = all[i + 1..]
            .iter()
            .find(|m| m.kind == MarkerKind::End && m.field == start.field && m.id == start.id);
        if let Some(end) = end {
            let value_span = start.span.end..end.span.start;
            out.push(Placeholder {
                field: start.field,
                id: start.id,
                value: &document[value_span.clone()],
                value_span,
                span: start.span.start..end.span.end,
            });
        }
    }
    out
}

/// Distinct ids in order of first appearance.
pub fn ids(document: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    markers(document)
        .into_iter()
        .filter(|m| seen.insert(m.id))
        .map(|m| m.id.to_string())
        .collect()
}

fn find_pair<'a>(document: &'a str, field: Field, id: &str) -> Result<Placeholder<'a>> {
    let all = markers(document);
    let count = |kind| {
        all.iter()
            .filter(|m| m.field == field && m.id == id && m.kind == kind)
            .count()
    };
    if count(MarkerKind::Start) > 1 || count(MarkerKind::End) > 1 {
        return Err(Error::DuplicateMarker {
            field,
            id: id.to_string(),
        });
    }
    scan(document)
        .into_iter()
        .find(|p| p.field == field && p.id == id)
        .ok_or_else(|| Error::MissingMarker {
            field,
            id: id.to_string(),
        })
}

/// Value between the field's markers, if exactly one pair exists.
pub fn read<'a>(document: &'a str, field: Field, id: &str) -> Option<&'a str> {
    find_pair(document, field, id).ok().map(|p| p.value)
}

/// Replace the value between the field's markers.
///
/// Fails when the pair is missing or duplicated, or when the value would
/// itself contain a comment delimiter.
pub fn apply(document: &str, field: Field, id: &str, value: &str) -> Result<String> {
    if value.contains("<!--") || value.contains("-->") {
        return Err(Error::invalid_value(
            field,
            id,
            "value contains a comment delimiter",
        ));
    }
    let span = find_pair(document, field, id)?.value_span;
    let mut out = String::with_capacity(document.len() + value.len());
    out.push_str(&document[..span.start]);
    out.push_str(value);
    out.push_str(&document[span.end..]);
    Ok(out)
}

/// Substitute every field of `id`.
pub fn apply_all(document: &str, id: &str, values: &Values) -> Result<String> {
    Field::ALL
        .into_iter()
        .try_fold(document.to_string(), |doc, field| {
            apply(&doc, field, id, values.get(field))
        })
}

// ============================================================================
// Values
// ============================================================================

/// Rendered text for all six fields of one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Values {
    /// VERSION text
    pub version: String,
    /// ARB text
    pub arb: String,
    /// MAJOR text
    pub major: String,
    /// MINOR text
    pub minor: String,
    /// DATE text
    pub date: String,
    /// STATUS text
    pub status: String,
}

impl Values {
    /// Every field set to its sentinel.
    pub fn sentinels() -> Self {
        Self {
            version: Field::Version.sentinel().to_string(),
            arb: Field::Arb.sentinel().to_string(),
            major: Field::Major.sentinel().to_string(),
            minor: Field::Minor.sentinel().to_string(),
            date: Field::Date.sentinel().to_string(),
            status: Field::Status.sentinel().to_string(),
        }
    }

    /// Values for a history entry, or sentinels without one.
    pub fn from_entry(entry: Option<&HistoryEntry>) -> Self {
        let Some(entry) = entry else {
            return Self::sentinels();
        };
        let version = if entry.version.trim().is_empty() {
            UNKNOWN_VERSION.to_string()
        } else {
            entry.version.clone()
        };
        Self {
            version,
            arb: entry.arb.to_string(),
            major: entry.major.to_string(),
            minor: entry.minor.to_string(),
            date: entry.last_checked.format("%Y-%m-%d").to_string(),
            status: if entry.is_safe() { SAFE_ICON } else { PROTECTED_ICON }.to_string(),
        }
    }

    /// Values for a variant's current entry.
    pub fn from_history(history: Option<&VariantHistory>) -> Self {
        Self::from_entry(history.and_then(VariantHistory::current))
    }

    /// Text for one field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Version => &self.version,
            Field::Arb => &self.arb,
            Field::Major => &self.major,
            Field::Minor => &self.minor,
            Field::Date => &self.date,
            Field::Status => &self.status,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// What is wrong with a field of an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Neither START nor END exists
    Missing,
    /// More than one START or END
    Duplicate,
    /// START without END or the reverse
    Unpaired,
    /// END appears before START
    Misordered,
    /// Another marker sits between START and END
    NestedMarker,
    /// Nothing between the markers
    Empty,
    /// Value does not fit the field's format
    Malformed(String),
}

/// One contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Device/region id
    pub id: String,
    /// Offending field
    pub field: Field,
    /// What is wrong
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match &self.kind {
            ViolationKind::Missing => "missing START/END markers".to_string(),
            ViolationKind::Duplicate => "duplicate markers".to_string(),
            ViolationKind::Unpaired => "unpaired marker".to_string(),
            ViolationKind::Misordered => "END precedes START".to_string(),
            ViolationKind::NestedMarker => "value contains another marker".to_string(),
            ViolationKind::Empty => "empty value".to_string(),
            ViolationKind::Malformed(v) => format!("malformed value '{v}'"),
        };
        write!(f, "{} {}: {what}", self.id, self.field)
    }
}

/// Result of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Ids checked, document order first, then expected-only ids
    pub ids: Vec<String>,
    /// Violations found
    pub violations: Vec<Violation>,
}

impl Report {
    /// True when no violations were found.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check the placeholder contract for every id in the document plus
/// `expected_ids`.
pub fn validate(document: &str, expected_ids: &[String]) -> Report {
    let all = markers(document);
    let mut ids = ids(document);
    for id in expected_ids {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }

    let mut violations = Vec::new();
    for id in &ids {
        for field in Field::ALL {
            let of = |kind| {
                all.iter()
                    .filter(|m| m.field == field && m.id == id.as_str() && m.kind == kind)
                    .collect::<Vec<_>>()
            };
            let starts = of(MarkerKind::Start);
            let ends = of(MarkerKind::End);
            let kind = match (starts.as_slice(), ends.as_slice()) {
                ([], []) => Some(ViolationKind::Missing),
                ([start], [end]) => check_pair(document, &all, field, start, end).err(),
                (s, e) if s.len() > 1 || e.len() > 1 => Some(ViolationKind::Duplicate),
                _ => Some(ViolationKind::Unpaired),
            };
            if let Some(kind) = kind {
                violations.push(Violation {
                    id: id.clone(),
                    field,
                    kind,
                });
            }
        }
    }

    Report { ids, violations }
}

fn check_pair(
    document: &str,
    all: &[Marker<'_>],
    field: Field,
    start: &Marker<'_>,
    end: &Marker<'_>,
) -> std::result::Result<(), ViolationKind> {
    if end.span.start < start.span.end {
        return Err(ViolationKind::Misordered);
    }
    if all
        .iter()
        .any(|m| m.span.start >= start.span.end && m.span.end <= end.span.start)
    {
        return Err(ViolationKind::NestedMarker);
    }
    check_value(field, &document[start.span.end..end.span.start])
}

/// Check a populated or sentinel value against the field's format.
pub fn check_value(field: Field, value: &str) -> std::result::Result<(), ViolationKind> {
    if value.trim().is_empty() {
        return Err(ViolationKind::Empty);
    }
    if value == field.sentinel() {
        return Ok(());
    }
    let ok = match field {
        Field::Version => true,
        Field::Arb | Field::Major | Field::Minor => value.bytes().all(|b| b.is_ascii_digit()),
        Field::Date => {
            value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        }
        Field::Status => value == SAFE_ICON || value == PROTECTED_ICON,
    };
    if ok {
        Ok(())
    } else {
        Err(ViolationKind::Malformed(value.to_string()))
    }
}
