use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AlignmentError;

/// How the common grid spacing is chosen
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSpec {
    /// Smallest nominal spacing among the inputs
    #[default]
    Finest,
    /// Explicit rate in Hz
    Rate(f64),
    /// Sample times of one channel
    Reference(String),
}

impl fmt::Display for GridSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSpec::Finest => write!(f, "finest"),
            GridSpec::Rate(hz) => write!(f, "{} Hz", hz),
            GridSpec::Reference(channel) => write!(f, "reference {}", channel),
        }
    }
}

/// Which time range the grid covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanPolicy {
    /// From the earliest start to the latest end
    #[default]
    Union,
    /// From the latest start to the earliest end
    Intersection,
}

/// How channel values are carried onto grid points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Value of the closer bracketing sample
    Nearest,
    /// Straight line between the bracketing samples
    #[default]
    Linear,
}

/// Largest distance between bracketing samples that may be bridged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapTolerance {
    /// Multiple of the channel's nominal (median) sample spacing
    Samples(f64),
    /// Absolute duration in seconds
    Seconds(f64),
}

impl Default for GapTolerance {
    fn default() -> Self {
        GapTolerance::Samples(1.5)
    }
}

impl GapTolerance {
    /// Tolerance in seconds for a channel with the given nominal spacing.
    ///
    /// A channel without a spacing only matches grid points exactly.
    pub fn seconds(&self, nominal_spacing: Option<f64>) -> f64 {
        match *self {
            GapTolerance::Samples(k) => nominal_spacing.map_or(0.0, |dt| k * dt),
            GapTolerance::Seconds(s) => s,
        }
    }
}

/// Default upper bound on grid length
pub const DEFAULT_MAX_GRID_POINTS: usize = 50_000_000;

/// Configuration of the time-alignment engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Grid spacing choice
    pub grid: GridSpec,
    /// Grid span
    pub span: SpanPolicy,
    /// Interpolation method
    pub method: Interpolation,
    /// Gap bridging limit
    pub gap_tolerance: GapTolerance,
    /// Fail instead of marking interior points missing
    pub strict_gaps: bool,
    /// Upper bound on grid length
    pub max_grid_points: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            span: SpanPolicy::default(),
            method: Interpolation::default(),
            gap_tolerance: GapTolerance::default(),
            strict_gaps: false,
            max_grid_points: DEFAULT_MAX_GRID_POINTS,
        }
    }
}

impl AlignConfig {
    /// Grid at an explicit rate
    pub fn at_rate(hz: f64) -> Self {
        Self {
            grid: GridSpec::Rate(hz),
            ..Self::default()
        }
    }

    /// Set the grid spacing choice
    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// Set the span policy
    pub fn with_span(mut self, span: SpanPolicy) -> Self {
        self.span = span;
        self
    }

    /// Set the interpolation method
    pub fn with_method(mut self, method: Interpolation) -> Self {
        self.method = method;
        self
    }

    /// Set the gap tolerance
    pub fn with_gap_tolerance(mut self, tolerance: GapTolerance) -> Self {
        self.gap_tolerance = tolerance;
        self
    }

    /// Fail on interior gaps
    pub fn with_strict_gaps(mut self, strict: bool) -> Self {
        self.strict_gaps = strict;
        self
    }

    /// Check rate and tolerance values
    pub fn validate(&self) -> Result<(), AlignmentError> {
        if let GridSpec::Rate(hz) = self.grid {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(AlignmentError::InvalidRate(hz));
            }
        }
        let tolerance = match self.gap_tolerance {
            GapTolerance::Samples(k) => k,
            GapTolerance::Seconds(s) => s,
        };
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(AlignmentError::InvalidTolerance(tolerance));
        }
        Ok(())
    }
}
