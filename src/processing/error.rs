use crate::align::AlignmentError;
use crate::calibration::CalibrationError;
use crate::ibw::ReaderError;
use crate::pipeline::TransformError;
use crate::shot::SignalGroup;

/// A shot failed to process; carries the shot number and the failing step
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// Reading the shot's files failed
    #[error("Shot {shot}: read failed: {source}")]
    Read {
        /// Shot number
        shot: u32,
        /// Underlying error
        #[source]
        source: ReaderError,
    },

    /// Calibration data could not be loaded
    #[error("Shot {shot}: calibration failed: {source}")]
    Calibration {
        /// Shot number
        shot: u32,
        /// Underlying error
        #[source]
        source: CalibrationError,
    },

    /// A signal group could not be aligned
    #[error("Shot {shot} ({group}): alignment failed: {source}")]
    Alignment {
        /// Shot number
        shot: u32,
        /// Group being aligned
        group: SignalGroup,
        /// Underlying error
        #[source]
        source: AlignmentError,
    },

    /// A pipeline stage failed
    #[error("Shot {shot} ({group}): {source}")]
    Transform {
        /// Shot number
        shot: u32,
        /// Group being processed
        group: SignalGroup,
        /// Underlying error
        #[source]
        source: TransformError,
    },
}

impl ProcessingError {
    /// Shot the error belongs to
    pub fn shot(&self) -> u32 {
        match self {
            ProcessingError::Read { shot, .. }
            | ProcessingError::Calibration { shot, .. }
            | ProcessingError::Alignment { shot, .. }
            | ProcessingError::Transform { shot, .. } => *shot,
        }
    }

    /// Name of the step that failed
    pub fn step(&self) -> &'static str {
        match self {
            ProcessingError::Read { .. } => "read",
            ProcessingError::Calibration { .. } => "calibration",
            ProcessingError::Alignment { .. } => "alignment",
            ProcessingError::Transform { .. } => "transform",
        }
    }
}
