use std::sync::Arc;

use crate::shot::ChannelTrace;

use super::config::{AlignConfig, GridSpec, SpanPolicy};
use super::error::AlignmentError;

/// Slack for grid points that land on the span end within rounding
const END_EPSILON: f64 = 1e-9;

/// Time range covered by the grid
pub(crate) fn span(
    traces: &[Arc<ChannelTrace>],
    policy: SpanPolicy,
) -> Result<(f64, f64), AlignmentError> {
    let mut spans = traces
        .iter()
        .map(|t| t.span().ok_or_else(|| AlignmentError::EmptyTrace(t.name().to_string())));
    let (mut start, mut end) = spans.next().ok_or(AlignmentError::NoTraces)??;
    for s in spans {
        let (s0, s1) = s?;
        match policy {
            SpanPolicy::Union => {
                start = start.min(s0);
                end = end.max(s1);
            }
            SpanPolicy::Intersection => {
                start = start.max(s0);
                end = end.min(s1);
            }
        }
    }
    if start > end {
        return Err(AlignmentError::EmptySpan);
    }
    Ok((start, end))
}

/// Build the common grid for `traces` over `[start, end]`
pub(crate) fn build_grid(
    traces: &[Arc<ChannelTrace>],
    (start, end): (f64, f64),
    config: &AlignConfig,
) -> Result<Vec<f64>, AlignmentError> {
    match &config.grid {
        GridSpec::Rate(hz) => uniform_grid(start, end, 1.0 / hz, config.max_grid_points),
        GridSpec::Finest => {
            let dt = traces
                .iter()
                .filter_map(|t| t.nominal_spacing())
                .min_by(f64::total_cmp);
            match dt {
                Some(dt) => uniform_grid(start, end, dt, config.max_grid_points),
                None if start == end => Ok(vec![start]),
                None => Err(AlignmentError::UndefinedSpacing),
            }
        }
        GridSpec::Reference(channel) => {
            let reference = traces
                .iter()
                .find(|t| t.name() == channel)
                .ok_or_else(|| AlignmentError::UnknownReference(channel.clone()))?;
            let mut grid: Vec<f64> = reference
                .times()
                .iter()
                .copied()
                .filter(|t| (start..=end).contains(t))
                .collect();
            grid.dedup();
            if grid.len() > config.max_grid_points {
                return Err(AlignmentError::GridTooLarge {
                    points: grid.len() as f64,
                    max: config.max_grid_points,
                });
            }
            Ok(grid)
        }
    }
}

/// `start + i * dt` for every point up to `end`, the last one clamped to `end`
pub(crate) fn uniform_grid(
    start: f64,
    end: f64,
    dt: f64,
    max_points: usize,
) -> Result<Vec<f64>, AlignmentError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(AlignmentError::InvalidRate(1.0 / dt));
    }
    let points = ((end - start) / dt + END_EPSILON).floor() + 1.0;
    if !points.is_finite() || points > max_points as f64 {
        return Err(AlignmentError::GridTooLarge {
            points,
            max: max_points,
        });
    }
    let count = points as usize;
    Ok((0..count)
        .map(|i| (start + i as f64 * dt).min(end))
        .collect())
}
