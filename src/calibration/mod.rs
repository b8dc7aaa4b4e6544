//! # Calibration Resolver
//!
//! Maps a channel and a timestamp to the conversion from raw digitizer units
//! to physical units. Entries are scoped by a half-open validity range and
//! never overlap for one channel, so every lookup has at most one answer.
//! A lookup nothing covers fails with [`CalibrationError::NoCalibration`];
//! raw values are never passed through as if they were calibrated.
//!
//! Tables come from a TOML file:
//!
//! ```toml
//! [[entry]]
//! channel = "PDX01"
//! valid_from = "2023-07-31"
//! units = "T/s"
//! scale = 0.0125
//!
//! [[entry]]
//! channel = "RT_DPWMi_TF"
//! units = "A"
//! curve = [[0.0, 0.0], [5.0, 12000.0], [10.0, 26000.0]]
//! ```
//!
//! or from the `DAS.conf` stored with each shot.

mod conversion;
mod das_conf;
mod error;
pub mod probes;
mod table;


pub use conversion::{Conversion, LookupCurve};
pub use das_conf::{
    parse_das_conf, read_das_conf, write_das_conf, DasChannel, DAS_BLOCK_LINES, DAS_HEADER_LINES,
};
pub use error::CalibrationError;
pub use probes::bdot_inverse_area;
pub use table::{CalibrationEntry, CalibrationTable, Validity};
