use std::path::{Path, PathBuf};

use crate::ibw::Wave;

use super::error::TraceError;

/// One channel's time series within a shot.
///
/// Times are finite and non-decreasing; values may hold non-finite samples,
/// which downstream stages treat as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTrace {
    name: String,
    units: String,
    times: Vec<f64>,
    values: Vec<f64>,
    source: Option<PathBuf>,
}

impl ChannelTrace {
    /// Create a trace from explicit sample times
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        times: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, TraceError> {
        if times.len() != values.len() {
            return Err(TraceError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(TraceError::NonFiniteTime { index });
        }
        if let Some(index) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(TraceError::DecreasingTime { index: index + 1 });
        }

        Ok(Self {
            name: name.into(),
            units: units.into(),
            times,
            values,
            source: None,
        })
    }

    /// Create a trace sampled every `dx` seconds starting at `x0`
    pub fn uniform(
        name: impl Into<String>,
        units: impl Into<String>,
        x0: f64,
        dx: f64,
        values: Vec<f64>,
    ) -> Result<Self, TraceError> {
        if !dx.is_finite() || dx <= 0.0 {
            return Err(TraceError::InvalidSpacing(dx));
        }
        let times = (0..values.len()).map(|i| x0 + i as f64 * dx).collect();
        Self::new(name, units, times, values)
    }

    /// Build a trace from a decoded wave, keeping the file it came from
    pub fn from_wave(
        channel: impl Into<String>,
        wave: Wave,
        source: Option<&Path>,
    ) -> Result<Self, TraceError> {
        let times = wave.times();
        let mut trace = Self::new(channel, wave.header.data_units, times, wave.values)?;
        trace.source = source.map(Path::to_path_buf);
        Ok(trace)
    }

    /// Channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units of the values
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Sample times in seconds
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// File the trace was read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the trace has no samples
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First and last sample time
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// Median positive spacing between consecutive samples.
    ///
    /// Returns `None` when the trace has fewer than two distinct times.
    pub fn nominal_spacing(&self) -> Option<f64> {
        let mut diffs: Vec<f64> = self
            .times
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.0)
            .collect();
        if diffs.is_empty() {
            return None;
        }
        let mid = diffs.len() / 2;
        let (_, median, _) = diffs.select_nth_unstable_by(mid, f64::total_cmp);
        Some(*median)
    }
}
