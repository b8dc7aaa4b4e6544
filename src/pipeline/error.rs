use crate::calibration::CalibrationError;
use crate::dataset::DatasetError;

/// Errors raised by a single stage
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Offset window holds no present samples of a channel
    #[error("Channel {channel} has no samples in the window ({start}, {end}) s")]
    EmptyWindow {
        /// Channel name
        channel: String,
        /// Window start (exclusive)
        start: f64,
        /// Window end (exclusive)
        end: f64,
    },

    /// Integration would bridge missing points
    #[error("Channel {channel} has a gap at grid index {index}; cannot integrate across it")]
    InteriorGap {
        /// Channel name
        channel: String,
        /// First missing grid index inside the channel
        index: usize,
    },

    /// No conversion covers a channel at the shot's acquisition time
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Probe scaling requested for a channel with no factor
    #[error("No probe factor for channel {0}")]
    MissingProbeFactor(String),

    /// Stage refers to a channel the dataset does not have
    #[error("Unknown channel {0}")]
    UnknownChannel(String),

    /// Stage parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Stage output violates dataset invariants
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// A pipeline stage failed; no partial result is produced
#[derive(Debug, thiserror::Error)]
#[error("Stage {stage_index} ({stage}) failed: {source}")]
pub struct TransformError {
    /// Zero-based position of the stage in its pipeline
    pub stage_index: usize,
    /// Stage name
    pub stage: String,
    /// What went wrong
    #[source]
    pub source: StageError,
}
