use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Errors that can occur while building or querying calibrations
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// No entry for the channel covers the requested time
    #[error("No calibration for channel {channel} at {at}")]
    NoCalibration {
        /// Channel name
        channel: String,
        /// Lookup time
        at: DateTime<Utc>,
    },

    /// A new entry overlaps an existing one for the same channel
    #[error("Calibration for {channel} overlaps an existing entry ({existing})")]
    Overlap {
        /// Channel name
        channel: String,
        /// Validity of the entry already in the table
        existing: String,
    },

    /// Validity range is empty or inverted
    #[error("Invalid validity range for {channel}: {detail}")]
    InvalidRange {
        /// Channel name
        channel: String,
        /// What was wrong
        detail: String,
    },

    /// Lookup curve is not usable
    #[error("Invalid lookup curve: {0}")]
    InvalidCurve(String),

    /// Entry has neither a usable linear factor nor a curve
    #[error("Invalid calibration entry for {channel}: {detail}")]
    InvalidEntry {
        /// Channel name
        channel: String,
        /// What was wrong
        detail: String,
    },

    /// Malformed DAS.conf block
    #[error("DAS.conf parse error at line {line}: {detail}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong
        detail: String,
    },

    /// I/O error with the file that caused it
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Calibration table file is not valid TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
