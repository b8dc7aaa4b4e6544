//! Offset removal, integration and drift removal.

use std::collections::BTreeMap;

use crate::dataset::AlignedDataset;
use crate::pipeline::error::StageError;
use crate::pipeline::stage::{map_columns, params, Stage};

/// Default end of the pre-shot offset window, in seconds
pub const DEFAULT_BASELINE_END: f64 = 1e-3;

/// Subtract each channel's mean over the open window `start < t < end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Window start in seconds (exclusive)
    pub start: f64,
    /// Window end in seconds (exclusive)
    pub end: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: DEFAULT_BASELINE_END,
        }
    }
}

impl Baseline {
    /// Offset window `(start, end)`
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

impl Stage for Baseline {
    fn name(&self) -> &str {
        "baseline"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        params([("start", self.start.to_string()), ("end", self.end.to_string())])
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        if !(self.start.is_finite() && self.end.is_finite() && self.start < self.end) {
            return Err(StageError::InvalidParameter(format!(
                "baseline window ({}, {}) is empty",
                self.start, self.end
            )));
        }
        let time = input.time();
        map_columns(input, |column| {
            let (sum, count) = time
                .iter()
                .zip(column.values())
                .filter(|(t, _)| **t > self.start && **t < self.end)
                .filter_map(|(_, v)| *v)
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if count == 0 {
                return Err(StageError::EmptyWindow {
                    channel: column.name().to_string(),
                    start: self.start,
                    end: self.end,
                });
            }
            let offset = sum / count as f64;
            Ok(column.map(|v| v - offset))
        })
    }
}

/// Cumulative trapezoidal integral in time, starting at zero.
///
/// Leading and trailing missing points stay missing. A missing point between
/// present ones is an error.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Integrate;

impl Stage for Integrate {
    fn name(&self) -> &str {
        "integrate"
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        let time = input.time();
        map_columns(input, |column| {
            let Some((first, last)) = column.present_range() else {
                return Ok(column.clone());
            };
            let values = column.values();
            let mut out = vec![None; values.len()];
            let mut acc = 0.0;
            out[first] = Some(acc);
            for i in first + 1..=last {
                let (Some(prev), Some(cur)) = (values[i - 1], values[i]) else {
                    return Err(StageError::InteriorGap {
                        channel: column.name().to_string(),
                        index: if values[i - 1].is_none() { i - 1 } else { i },
                    });
                };
                acc += 0.5 * (prev + cur) * (time[i] - time[i - 1]);
                out[i] = Some(acc);
            }
            let units = match column.units() {
                "" => "s".to_string(),
                units => format!("{}*s", units),
            };
            Ok(column.with_values(out).with_units(units))
        })
    }
}

/// Subtract the straight line joining the first and last present samples, so
/// each channel ends at the value it starts with
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Detrend;

impl Stage for Detrend {
    fn name(&self) -> &str {
        "detrend"
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        let time = input.time();
        map_columns(input, |column| {
            let Some((first, last)) = column.present_range() else {
                return Ok(column.clone());
            };
            if first == last {
                return Ok(column.clone());
            }
            let values = column.values();
            let (t0, t1) = (time[first], time[last]);
            // present_range guarantees both ends exist
            let (v0, v1) = (values[first].unwrap_or(0.0), values[last].unwrap_or(0.0));
            let slope = (v1 - v0) / (t1 - t0);
            let out = values
                .iter()
                .zip(time)
                .map(|(v, t)| v.map(|v| v - slope * (t - t0)))
                .collect();
            Ok(column.with_values(out))
        })
    }
}
