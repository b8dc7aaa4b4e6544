//! Smoothing and windowed statistics.

use std::collections::BTreeMap;

use crate::align::DEFAULT_MAX_GRID_POINTS;
use crate::dataset::AlignedDataset;
use crate::pipeline::error::StageError;
use crate::pipeline::stage::{map_columns, params, Stage};

/// Centered moving average over `window` grid points.
///
/// Missing neighbours are left out of the average; missing points stay missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Smooth {
    /// Window length in grid points
    pub window: usize,
}

impl Smooth {
    /// Moving average over `window` points
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

impl Stage for Smooth {
    fn name(&self) -> &str {
        "smooth"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        params([("window", self.window.to_string())])
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        if self.window == 0 {
            return Err(StageError::InvalidParameter(
                "smoothing window must be at least 1 point".to_string(),
            ));
        }
        let before = (self.window - 1) / 2;
        let after = self.window / 2;

        map_columns(input, |column| {
            let values = column.values();
            let out = (0..values.len())
                .map(|i| {
                    values[i]?;
                    let lo = i.saturating_sub(before);
                    let hi = (i + after).min(values.len() - 1);
                    let (sum, n) = values[lo..=hi]
                        .iter()
                        .flatten()
                        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                    Some(sum / n as f64)
                })
                .collect();
            Ok(column.with_values(out))
        })
    }
}

/// Mean over consecutive non-overlapping windows of `window` seconds.
///
/// Windows start at the first grid point. The output grid holds the window
/// centres; the last window is cut at the last grid point and centred on what
/// remains of it. A window with no present values is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowedMean {
    /// Window length in seconds
    pub window: f64,
}

impl WindowedMean {
    /// Windows of `window` seconds
    pub fn new(window: f64) -> Self {
        Self { window }
    }
}

impl Stage for WindowedMean {
    fn name(&self) -> &str {
        "windowed_mean"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        params([("window", self.window.to_string())])
    }

    fn apply(&self, input: &AlignedDataset) -> Result<AlignedDataset, StageError> {
        if !self.window.is_finite() || self.window <= 0.0 {
            return Err(StageError::InvalidParameter(format!(
                "window {} s must be positive",
                self.window
            )));
        }
        let time = input.time();
        let (Some(&t0), Some(&t_end)) = (time.first(), time.last()) else {
            return Ok(input.clone());
        };

        let windows = ((t_end - t0) / self.window).ceil().max(1.0);
        if windows > DEFAULT_MAX_GRID_POINTS as f64 {
            return Err(StageError::InvalidParameter(format!(
                "window {} s splits {} s into more than {} windows",
                self.window,
                t_end - t0,
                DEFAULT_MAX_GRID_POINTS
            )));
        }
        let count = windows as usize;
        let bin = |t: f64| (((t - t0) / self.window).floor() as usize).min(count - 1);
        let centres: Vec<f64> = (0..count)
            .map(|k| {
                let start = t0 + k as f64 * self.window;
                (start + (start + self.window).min(t_end)) / 2.0
            })
            .collect();

        let columns = input
            .columns()
            .iter()
            .map(|column| {
                let mut sums = vec![(0.0, 0usize); count];
                for (t, v) in time.iter().zip(column.values()) {
                    if let Some(v) = v {
                        let slot = &mut sums[bin(*t)];
                        slot.0 += v;
                        slot.1 += 1;
                    }
                }
                let values = sums
                    .into_iter()
                    .map(|(s, n)| (n > 0).then(|| s / n as f64))
                    .collect();
                column.with_values(values)
            })
            .collect();

        Ok(input.with_grid(centres, columns)?)
    }
}
