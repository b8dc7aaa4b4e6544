//! # Time-Alignment Engine
//!
//! Digitizers on Pegasus III run at different rates and start times. Alignment
//! puts a set of channel traces onto one shared time grid:
//!
//! 1. The grid span is the union (default) or intersection of the trace spans.
//! 2. The grid spacing follows the finest input, an explicit rate, or the
//!    sample times of a reference channel. Points are `start + i * dt`.
//! 3. Each channel is resampled by nearest-neighbour or linear interpolation.
//!    Grid points outside a channel's span, or between samples further apart
//!    than the gap tolerance, are marked missing. Values are never invented
//!    across gaps.
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Utc;
//! use p3data::align::{align_traces, AlignConfig};
//! use p3data::shot::ChannelTrace;
//!
//! let slow = ChannelTrace::uniform("CFL01", "V", 0.0, 1e-3, vec![0.0, 1.0, 2.0])?;
//! let fast = ChannelTrace::uniform("PDX01", "V", 0.0, 5e-4, vec![0.0; 5])?;
//! let dataset = align_traces(1, Utc::now(), &[Arc::new(slow), Arc::new(fast)], &AlignConfig::default())?;
//! assert_eq!(dataset.len(), 5);
//! let midpoint = dataset.value_at("CFL01", 5e-4).unwrap();
//! assert!((midpoint - 0.5).abs() < 1e-9);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod error;
mod grid;
mod interpolate;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::dataset::{AlignedDataset, Column, Provenance};
use crate::shot::{ChannelTrace, Shot};

pub use config::{
    AlignConfig, GapTolerance, GridSpec, Interpolation, SpanPolicy, DEFAULT_MAX_GRID_POINTS,
};
pub use error::AlignmentError;

/// Align every trace of a shot
pub fn align_shot(shot: &Shot, config: &AlignConfig) -> Result<AlignedDataset, AlignmentError> {
    align_traces(shot.number(), shot.acquired_at(), shot.traces(), config)
}

/// Align the listed channels of a shot; channels the shot lacks are skipped
pub fn align_channels<S: AsRef<str>>(
    shot: &Shot,
    channels: &[S],
    config: &AlignConfig,
) -> Result<AlignedDataset, AlignmentError> {
    align_traces(
        shot.number(),
        shot.acquired_at(),
        &shot.subset(channels),
        config,
    )
}

/// Align traces onto a common grid
pub fn align_traces(
    shot: u32,
    acquired_at: DateTime<Utc>,
    traces: &[Arc<ChannelTrace>],
    config: &AlignConfig,
) -> Result<AlignedDataset, AlignmentError> {
    config.validate()?;
    let span = grid::span(traces, config.span)?;
    let grid = grid::build_grid(traces, span, config)?;
    debug!(
        "Shot {}: aligning {} traces onto {} points ({}, span {:.6}..{:.6} s)",
        shot,
        traces.len(),
        grid.len(),
        config.grid,
        span.0,
        span.1
    );

    let mut columns = Vec::with_capacity(traces.len());
    for trace in traces {
        let tolerance = config.gap_tolerance.seconds(trace.nominal_spacing());
        let values = interpolate::resample(trace, &grid, config.method, tolerance);

        let missing = interior_missing(trace, &grid, &values);
        if missing > 0 {
            if config.strict_gaps {
                return Err(AlignmentError::Gap {
                    channel: trace.name().to_string(),
                    missing,
                });
            }
            warn!(
                "Shot {}: {} has {} missing points inside its span",
                shot,
                trace.name(),
                missing
            );
        }

        columns.push(Column::new(
            trace.name(),
            trace.units(),
            values,
            Provenance::from_trace(shot, trace),
        ));
    }

    Ok(AlignedDataset::new(shot, acquired_at, grid, columns)?)
}

/// Missing values at grid points within the trace's own span
fn interior_missing(trace: &ChannelTrace, grid: &[f64], values: &[Option<f64>]) -> usize {
    let Some((start, end)) = trace.span() else {
        return 0;
    };
    grid.iter()
        .zip(values)
        .filter(|(t, v)| v.is_none() && (start..=end).contains(*t))
        .count()
}
