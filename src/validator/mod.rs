//! # Validation
//!
//! Integrity checks for shot folders and exported datasets. Problems that
//! would make processing fail are reported as failures; problems that only
//! degrade the result (missing channels, non-finite samples) are warnings.
//!
//! ## Shot folder checks
//!
//! 1. **Structure**: the folder exists and holds a `DAS.conf`
//! 2. **Digitizer configuration**: `DAS.conf` parses
//! 3. **Waves**: every channel file decodes into a valid trace
//! 4. **Samples**: sample values are finite and time spans overlap
//! 5. **Calibration coverage**: every present channel has a `DAS.conf` block
//!
//! ## Usage
//!
//! ```rust,no_run
//! use p3data::shot::ShotArchive;
//! use p3data::validator::validate_shot;
//!
//! let report = validate_shot(&ShotArchive::default(), 109756)?;
//! println!("{}", report);
//! # Ok::<(), p3data::validator::ValidationError>(())
//! ```

use std::path::Path;

use crate::shot::ShotArchive;

pub use report::{CheckFamily, CheckStatus, Tally, Target, ValidationCheck, ValidationReport};

mod export;
mod report;
mod shot;

#[cfg(test)]
mod tests;

/// Errors that stop validation before all checks have run
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The target does not exist or has the wrong shape
    #[error("Structure error: {0}")]
    StructureError(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the Parquet library
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Error from the Arrow library
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
}

/// Validate a shot in the archive
pub fn validate_shot(archive: &ShotArchive, shot: u32) -> Result<ValidationReport, ValidationError> {
    validate_shot_folder(&archive.shot_folder(shot))
}

/// Validate an explicit shot folder
pub fn validate_shot_folder(folder: &Path) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::new(Target::shot_folder(folder));
    shot::check_shot_folder(folder, &mut report)?;
    Ok(report)
}

/// Validate an exported Parquet dataset
pub fn validate_export(path: &Path) -> Result<ValidationReport, ValidationError> {
    let mut report = ValidationReport::new(Target::export(path));
    export::check_export(path, &mut report)?;
    Ok(report)
}
