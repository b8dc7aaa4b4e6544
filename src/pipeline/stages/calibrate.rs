//! Unit conversion stages.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::calibration::{bdot_inverse_area, CalibrationTable};
use crate::dataset::AlignedDataset;
use crate::pipeline::error::StageError;
use crate::pipeline::stage::{map_columns, params, Stage};

/// Convert each channel with the calibration valid at the shot's acquisition time.
///
/// Columns are looked up by the channel they were derived from, so renamed
/// columns still find their calibration.
#[derive(Debug, Clone)]
pub struct Calibrate {
    table: Arc<CalibrationTable>,
}

impl Calibrate {
    /// Calibrate against a shared table
    pub fn new(table: Arc<CalibrationTable>) -> Self {
        Self { table }
    }
}

impl Stage for Calibrate {
    fn name(&self) -> &str {
        "calibrate"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        params([("entries", self.table.len().to_string())])
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        let at = input.acquired_at();
        map_columns(input, |column| {
            let entry = self.table.resolve(&column.provenance().channel, at)?;
            let values = column
                .values()
                .iter()
                .map(|v| v.and_then(|raw| entry.conversion.apply(raw)))
                .collect();
            Ok(column.with_values(values).with_units(entry.units.clone()))
        })
    }
}

/// Multiply each channel by a per-probe factor.
///
/// Without explicit factors the built-in B-dot `1/NA` table is used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeScale {
    factors: Option<BTreeMap<String, f64>>,
    units: Option<String>,
}

impl ProbeScale {
    /// Scale by the built-in B-dot inverse areas
    pub fn bdot() -> Self {
        Self::default()
    }

    /// Scale by explicit per-channel factors
    pub fn with_factors(factors: BTreeMap<String, f64>) -> Self {
        Self {
            factors: Some(factors),
            units: None,
        }
    }

    /// Units of the scaled channels
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    fn factor(&self, channel: &str) -> Option<f64> {
        match &self.factors {
            Some(factors) => factors.get(channel).copied(),
            None => bdot_inverse_area(channel),
        }
    }
}

impl Stage for ProbeScale {
    fn name(&self) -> &str {
        "probe_scale"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        let mut p = match &self.factors {
            Some(factors) => factors
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            None => params([("table", "bdot_inverse_area".to_string())]),
        };
        if let Some(units) = &self.units {
            p.insert("units".to_string(), units.clone());
        }
        p
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        map_columns(input, |column| {
            let channel = &column.provenance().channel;
            let factor = self
                .factor(channel)
                .ok_or_else(|| StageError::MissingProbeFactor(channel.clone()))?;
            let scaled = column.map(|v| v * factor);
            Ok(match &self.units {
                Some(units) => scaled.with_units(units.clone()),
                None => scaled,
            })
        })
    }
}

/// Multiply every channel by a constant
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    /// Multiplier
    pub factor: f64,
    /// New units, if the factor changes them
    pub units: Option<String>,
}

impl Scale {
    /// Scale by `factor` keeping units
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            units: None,
        }
    }

    /// Units after scaling
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

impl Stage for Scale {
    fn name(&self) -> &str {
        "scale"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        let mut p = params([("factor", self.factor.to_string())]);
        if let Some(units) = &self.units {
            p.insert("units".to_string(), units.clone());
        }
        p
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        if !self.factor.is_finite() {
            return Err(StageError::InvalidParameter(format!(
                "scale factor {} is not finite",
                self.factor
            )));
        }
        map_columns(input, |column| {
            let scaled = column.map(|v| v * self.factor);
            Ok(match &self.units {
                Some(units) => scaled.with_units(units.clone()),
                None => scaled,
            })
        })
    }
}
