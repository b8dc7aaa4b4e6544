//! Per-shot `DAS.conf` digitizer configuration.
//!
//! The file opens with a fixed-size preamble followed by one seven-line block
//! per digitizer channel:
//!
//! ```text
//! [PDX01]
//! Digitizer = DTACQ1
//! Input = 3
//! Units = T/s
//! Scale = 0.0125
//! Offset = 0
//!
//! ```
//!
//! Only the channel name, the last token of the units line and the last token
//! of the scale line are used.

use std::collections::HashMap;
use std::path::Path;

use log::debug;

use super::conversion::Conversion;
use super::error::CalibrationError;
use super::table::{CalibrationEntry, CalibrationTable, Validity};

/// Preamble lines before the first channel block
pub const DAS_HEADER_LINES: usize = 64;

/// Lines per channel block
pub const DAS_BLOCK_LINES: usize = 7;

const UNITS_LINE: usize = 3;
const SCALE_LINE: usize = 4;

/// One channel block of a DAS.conf file
#[derive(Debug, Clone, PartialEq)]
pub struct DasChannel {
    /// Channel name
    pub name: String,
    /// Physical units after scaling
    pub units: String,
    /// Raw-to-physical scale factor
    pub scale: f64,
}

/// Parse the channel blocks of a DAS.conf file
pub fn parse_das_conf(content: &str) -> Result<Vec<DasChannel>, CalibrationError> {
    let lines: Vec<&str> = content.lines().skip(DAS_HEADER_LINES).collect();
    let mut channels = Vec::new();

    for (block_index, block) in lines.chunks(DAS_BLOCK_LINES).enumerate() {
        let first_line = DAS_HEADER_LINES + block_index * DAS_BLOCK_LINES + 1;
        if block.iter().all(|l| l.trim().is_empty()) {
            continue;
        }
        if block.len() <= SCALE_LINE {
            return Err(CalibrationError::Parse {
                line: first_line,
                detail: format!("incomplete channel block ({} lines)", block.len()),
            });
        }

        let header = block[0].trim();
        let name = header
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CalibrationError::Parse {
                line: first_line,
                detail: format!("expected [Channel], found '{}'", header),
            })?;

        let units = block[UNITS_LINE]
            .split_whitespace()
            .last()
            .ok_or_else(|| CalibrationError::Parse {
                line: first_line + UNITS_LINE,
                detail: "empty units line".to_string(),
            })?;

        let scale_token = block[SCALE_LINE].split_whitespace().last().unwrap_or("");
        let scale: f64 = scale_token
            .parse()
            .ok()
            .filter(|s: &f64| s.is_finite())
            .ok_or_else(|| CalibrationError::Parse {
                line: first_line + SCALE_LINE,
                detail: format!("invalid scale '{}'", scale_token),
            })?;

        channels.push(DasChannel {
            name: name.to_string(),
            units: units.to_string(),
            scale,
        });
    }

    Ok(channels)
}

/// Read a DAS.conf file. Invalid UTF-8 is replaced rather than rejected.
pub fn read_das_conf(path: &Path) -> Result<Vec<DasChannel>, CalibrationError> {
    let bytes = std::fs::read(path).map_err(|source| CalibrationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let channels = parse_das_conf(&String::from_utf8_lossy(&bytes))?;
    debug!("{}: {} channel blocks", path.display(), channels.len());
    Ok(channels)
}

/// Render channel blocks in DAS.conf layout
pub fn write_das_conf(channels: &[DasChannel]) -> String {
    let mut out = String::from("; Pegasus III DAS configuration\n");
    for i in 1..DAS_HEADER_LINES {
        out.push_str(&format!("; reserved {:02}\n", i));
    }
    for (i, channel) in channels.iter().enumerate() {
        out.push_str(&format!(
            "[{}]\nDigitizer = DTACQ{}\nInput = {}\nUnits = {}\nScale = {}\nOffset = 0\n\n",
            channel.name,
            i / 32 + 1,
            i % 32,
            channel.units,
            channel.scale
        ));
    }
    out
}

impl CalibrationTable {
    /// Table from DAS.conf blocks; every entry is valid for all time.
    ///
    /// A channel listed twice takes its last block.
    pub fn from_das_channels(channels: &[DasChannel]) -> Self {
        let mut latest: HashMap<&str, &DasChannel> = HashMap::new();
        for channel in channels {
            if latest.insert(channel.name.as_str(), channel).is_some() {
                debug!("DAS.conf: later block for {} replaces the earlier one", channel.name);
            }
        }

        let mut table = CalibrationTable::new();
        for (name, channel) in latest {
            let entry = CalibrationEntry {
                channel: name.to_string(),
                validity: Validity::ALWAYS,
                conversion: Conversion::scale(channel.scale),
                units: channel.units.clone(),
            };
            // One all-time entry per channel cannot overlap
            if let Err(e) = table.insert(entry) {
                debug!("DAS.conf: {} skipped: {}", name, e);
            }
        }
        table
    }

    /// Load a shot's DAS.conf as a calibration table
    pub fn from_das_conf(path: &Path) -> Result<Self, CalibrationError> {
        Ok(Self::from_das_channels(&read_das_conf(path)?))
    }
}
