use std::sync::Arc;

use crate::shot::ChannelTrace;

/// Where a column's values came from
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    /// Shot number
    pub shot: u32,
    /// Channel the column was derived from
    pub channel: String,
    /// Source trace, when the column was aligned from one
    pub source: Option<Arc<ChannelTrace>>,
}

impl Provenance {
    /// Provenance pointing back to an aligned trace
    pub fn from_trace(shot: u32, trace: &Arc<ChannelTrace>) -> Self {
        Self {
            shot,
            channel: trace.name().to_string(),
            source: Some(Arc::clone(trace)),
        }
    }

    /// Provenance of a column with no backing trace
    pub fn derived(shot: u32, channel: impl Into<String>) -> Self {
        Self {
            shot,
            channel: channel.into(),
            source: None,
        }
    }
}

/// One channel of an aligned dataset: a value or a missing marker per grid point
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    units: String,
    values: Vec<Option<f64>>,
    provenance: Provenance,
}

impl Column {
    /// Create a column
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        values: Vec<Option<f64>>,
        provenance: Provenance,
    ) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            values,
            provenance,
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical units
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Values, `None` where missing
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Origin of the values
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Indices of the first and last present values
    pub fn present_range(&self) -> Option<(usize, usize)> {
        let first = self.values.iter().position(Option::is_some)?;
        let last = self.values.iter().rposition(Option::is_some)?;
        Some((first, last))
    }

    /// Same column with new values
    pub fn with_values(&self, values: Vec<Option<f64>>) -> Self {
        Self {
            name: self.name.clone(),
            units: self.units.clone(),
            values,
            provenance: self.provenance.clone(),
        }
    }

    /// Apply `f` to every present value. Non-finite results become missing.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.with_values(
            self.values
                .iter()
                .map(|v| v.map(&f).filter(|x| x.is_finite()))
                .collect(),
        )
    }

    /// Rename the column
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Change the units
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }
}
