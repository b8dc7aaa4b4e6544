/// Violations of the channel trace invariants
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraceError {
    /// Times and values differ in length
    #[error("{times} times but {values} values")]
    LengthMismatch {
        /// Number of times
        times: usize,
        /// Number of values
        values: usize,
    },

    /// A sample time is NaN or infinite
    #[error("non-finite time at sample {index}")]
    NonFiniteTime {
        /// Offending sample
        index: usize,
    },

    /// A sample time is earlier than its predecessor
    #[error("time decreases at sample {index}")]
    DecreasingTime {
        /// Offending sample
        index: usize,
    },

    /// Uniform spacing is not finite and positive
    #[error("invalid sample spacing {0}")]
    InvalidSpacing(f64),
}
