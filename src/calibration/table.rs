use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::Deserialize;

use super::conversion::{Conversion, LookupCurve};
use super::error::CalibrationError;

/// Half-open validity range `[from, until)`. `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validity {
    /// First instant covered
    pub from: Option<DateTime<Utc>>,
    /// First instant no longer covered
    pub until: Option<DateTime<Utc>>,
}

impl Validity {
    /// Valid for all time
    pub const ALWAYS: Validity = Validity {
        from: None,
        until: None,
    };

    /// Range `[from, until)`
    pub fn new(from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        Self { from, until }
    }

    /// Range starting at `from` with no end
    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            until: None,
        }
    }

    /// Whether `at` falls inside the range
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| from <= at) && self.until.map_or(true, |until| at < until)
    }

    /// Whether two ranges share any instant
    pub fn overlaps(&self, other: &Validity) -> bool {
        let starts_before_other_ends = match (self.from, other.until) {
            (Some(from), Some(until)) => from < until,
            _ => true,
        };
        let other_starts_before_end = match (other.from, self.until) {
            (Some(from), Some(until)) => from < until,
            _ => true,
        };
        starts_before_other_ends && other_starts_before_end
    }

    fn is_empty(&self) -> bool {
        matches!((self.from, self.until), (Some(from), Some(until)) if from >= until)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from.map_or("-inf".to_string(), |t| t.to_rfc3339());
        let until = self.until.map_or("+inf".to_string(), |t| t.to_rfc3339());
        write!(f, "[{}, {})", from, until)
    }
}

/// Time-scoped conversion of one channel to physical units
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationEntry {
    /// Channel name
    pub channel: String,
    /// When the entry applies
    pub validity: Validity,
    /// Raw-to-physical conversion
    pub conversion: Conversion,
    /// Physical units after conversion
    pub units: String,
}

impl CalibrationEntry {
    /// Linear entry valid for all time
    pub fn linear(channel: impl Into<String>, scale: f64, units: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            validity: Validity::ALWAYS,
            conversion: Conversion::scale(scale),
            units: units.into(),
        }
    }

    /// Restrict the entry to a validity range
    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = validity;
        self
    }

    /// Replace the conversion
    pub fn with_conversion(mut self, conversion: Conversion) -> Self {
        self.conversion = conversion;
        self
    }
}

/// Calibration entries keyed by channel and validity epoch.
///
/// Entries of one channel never overlap, so any lookup has at most one
/// answer. The table is built once and then only read.
#[derive(Debug, Clone, Default)]
pub struct CalibrationTable {
    entries: BTreeMap<String, Vec<CalibrationEntry>>,
}

impl CalibrationTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, rejecting empty ranges and overlaps with existing entries
    pub fn insert(&mut self, entry: CalibrationEntry) -> Result<(), CalibrationError> {
        if entry.validity.is_empty() {
            return Err(CalibrationError::InvalidRange {
                channel: entry.channel,
                detail: format!("{} is empty", entry.validity),
            });
        }
        let slot = self.entries.entry(entry.channel.clone()).or_default();
        if let Some(existing) = slot.iter().find(|e| e.validity.overlaps(&entry.validity)) {
            return Err(CalibrationError::Overlap {
                channel: entry.channel,
                existing: existing.validity.to_string(),
            });
        }
        let pos = slot.partition_point(|e| e.validity.from < entry.validity.from);
        slot.insert(pos, entry);
        Ok(())
    }

    /// Entry of `channel` valid at `at`
    pub fn resolve(
        &self,
        channel: &str,
        at: DateTime<Utc>,
    ) -> Result<&CalibrationEntry, CalibrationError> {
        self.entries
            .get(channel)
            .and_then(|slot| slot.iter().find(|e| e.validity.contains(at)))
            .ok_or_else(|| CalibrationError::NoCalibration {
                channel: channel.to_string(),
                at,
            })
    }

    /// All entries of a channel ordered by start of validity
    pub fn entries(&self, channel: &str) -> &[CalibrationEntry] {
        self.entries.get(channel).map_or(&[], Vec::as_slice)
    }

    /// Calibrated channel names
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a TOML calibration table
    pub fn from_toml_str(s: &str) -> Result<Self, CalibrationError> {
        let raw: RawTable = toml::from_str(s)?;
        let mut table = Self::new();
        for entry in raw.entry {
            table.insert(entry.into_entry()?)?;
        }
        Ok(table)
    }

    /// Load a TOML calibration table from disk
    pub fn from_file(path: &Path) -> Result<Self, CalibrationError> {
        let content = std::fs::read_to_string(path).map_err(|source| CalibrationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&content)?;
        debug!(
            "Loaded {} calibration entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    entry: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    channel: String,
    valid_from: Option<String>,
    valid_until: Option<String>,
    units: String,
    scale: Option<f64>,
    offset: Option<f64>,
    curve: Option<LookupCurve>,
}

impl RawEntry {
    fn into_entry(self) -> Result<CalibrationEntry, CalibrationError> {
        let invalid = |detail: String| CalibrationError::InvalidEntry {
            channel: self.channel.clone(),
            detail,
        };
        let conversion = match (self.scale, self.offset, &self.curve) {
            (Some(scale), offset, None) => Conversion::Linear {
                scale,
                offset: offset.unwrap_or(0.0),
            },
            (None, None, Some(curve)) => Conversion::Curve(curve.clone()),
            (None, Some(_), None) => return Err(invalid("offset without scale".to_string())),
            (None, None, None) => return Err(invalid("needs scale or curve".to_string())),
            _ => return Err(invalid("scale/offset and curve are exclusive".to_string())),
        };
        if let Conversion::Linear { scale, offset } = conversion {
            if !scale.is_finite() || !offset.is_finite() {
                return Err(invalid("scale and offset must be finite".to_string()));
            }
        }
        let from = self.valid_from.as_deref().map(parse_instant).transpose();
        let until = self.valid_until.as_deref().map(parse_instant).transpose();
        let (from, until) = match (from, until) {
            (Ok(from), Ok(until)) => (from, until),
            (Err(detail), _) | (_, Err(detail)) => return Err(invalid(detail)),
        };

        Ok(CalibrationEntry {
            channel: self.channel,
            validity: Validity::new(from, until),
            conversion,
            units: self.units,
        })
    }
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` date (midnight UTC)
fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{}'", s))
}
