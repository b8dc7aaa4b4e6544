use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationTable;

use super::stage::Stage;
use super::stages::*;
use super::Pipeline;

fn default_baseline_end() -> f64 {
    DEFAULT_BASELINE_END
}

/// Declarative description of a stage, as written in configuration files.
///
/// ```toml
/// [[pipeline.stage]]
/// kind = "baseline"
/// end = 0.001
///
/// [[pipeline.stage]]
/// kind = "integrate"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageSpec {
    /// [`Baseline`]
    Baseline {
        /// Window start in seconds
        #[serde(default)]
        start: f64,
        /// Window end in seconds
        #[serde(default = "default_baseline_end")]
        end: f64,
    },
    /// [`Integrate`]
    Integrate,
    /// [`Detrend`]
    Detrend,
    /// [`Calibrate`]
    Calibrate,
    /// [`ProbeScale`]
    ProbeScale {
        /// Explicit factors; the B-dot table when absent
        #[serde(default)]
        factors: Option<BTreeMap<String, f64>>,
        /// Units after scaling
        #[serde(default)]
        units: Option<String>,
    },
    /// [`Scale`]
    Scale {
        /// Multiplier
        factor: f64,
        /// Units after scaling
        #[serde(default)]
        units: Option<String>,
    },
    /// [`Smooth`]
    Smooth {
        /// Window in grid points
        window: usize,
    },
    /// [`WindowedMean`]
    WindowedMean {
        /// Window in seconds
        window: f64,
    },
    /// [`Select`]
    Select {
        /// Channels to keep
        channels: Vec<String>,
    },
    /// [`Rename`]
    Rename {
        /// Current name
        from: String,
        /// New name
        to: String,
    },
}

impl StageSpec {
    /// Baseline over the default pre-shot window
    pub fn baseline() -> Self {
        StageSpec::Baseline {
            start: 0.0,
            end: DEFAULT_BASELINE_END,
        }
    }

    /// Instantiate the stage; `calibration` backs the calibrate stage
    pub fn build(&self, calibration: &Arc<CalibrationTable>) -> Arc<dyn Stage> {
        match self {
            StageSpec::Baseline { start, end } => Arc::new(Baseline::new(*start, *end)),
            StageSpec::Integrate => Arc::new(Integrate),
            StageSpec::Detrend => Arc::new(Detrend),
            StageSpec::Calibrate => Arc::new(Calibrate::new(Arc::clone(calibration))),
            StageSpec::ProbeScale { factors, units } => {
                let stage = match factors {
                    Some(factors) => ProbeScale::with_factors(factors.clone()),
                    None => ProbeScale::bdot(),
                };
                Arc::new(match units {
                    Some(units) => stage.with_units(units.clone()),
                    None => stage,
                })
            }
            StageSpec::Scale { factor, units } => Arc::new(Scale {
                factor: *factor,
                units: units.clone(),
            }),
            StageSpec::Smooth { window } => Arc::new(Smooth::new(*window)),
            StageSpec::WindowedMean { window } => Arc::new(WindowedMean::new(*window)),
            StageSpec::Select { channels } => Arc::new(Select::new(channels.iter().cloned())),
            StageSpec::Rename { from, to } => Arc::new(Rename::new(from.clone(), to.clone())),
        }
    }

    /// Whether the stage needs calibration data
    pub fn needs_calibration(&self) -> bool {
        matches!(self, StageSpec::Calibrate)
    }
}

/// Build a pipeline from stage descriptions
pub fn build_pipeline(specs: &[StageSpec], calibration: &Arc<CalibrationTable>) -> Pipeline {
    specs
        .iter()
        .fold(Pipeline::new(), |p, spec| p.with_arc(spec.build(calibration)))
}
