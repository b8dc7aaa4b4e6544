/// Errors that can occur while aligning traces onto a common grid
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignmentError {
    /// Nothing to align
    #[error("No traces to align")]
    NoTraces,

    /// A trace has no samples
    #[error("Trace {0} has no samples")]
    EmptyTrace(String),

    /// Target rate is not a positive finite number
    #[error("Invalid sample rate: {0} Hz")]
    InvalidRate(f64),

    /// Gap tolerance is not a positive finite number
    #[error("Invalid gap tolerance: {0}")]
    InvalidTolerance(f64),

    /// Reference channel is not among the traces
    #[error("Reference channel {0} not found")]
    UnknownReference(String),

    /// No trace has two distinct sample times to derive a spacing from
    #[error("Cannot derive a grid spacing: no trace has distinct sample times")]
    UndefinedSpacing,

    /// The intersection of the trace spans is empty
    #[error("Trace spans do not overlap")]
    EmptySpan,

    /// The grid would exceed the configured size limit
    #[error("Grid of {points} points exceeds the limit of {max}")]
    GridTooLarge {
        /// Points the grid would need
        points: f64,
        /// Configured limit
        max: usize,
    },

    /// Resampled data does not form a valid dataset
    #[error("Invalid aligned grid: {0}")]
    InvalidGrid(#[from] crate::dataset::DatasetError),

    /// Interior grid points of a channel could not be filled
    #[error("Channel {channel} has {missing} missing points inside its span")]
    Gap {
        /// Channel name
        channel: String,
        /// Missing interior points
        missing: usize,
    },
}
