use crate::shot::ChannelTrace;

use super::config::Interpolation;

/// Resample a trace onto an increasing grid.
///
/// A grid point gets a value when it coincides with a sample, or when it lies
/// between two samples no more than `tolerance` seconds apart. Points outside
/// the trace's span, inside wider gaps, or next to non-finite samples are
/// `None`.
pub(crate) fn resample(
    trace: &ChannelTrace,
    grid: &[f64],
    method: Interpolation,
    tolerance: f64,
) -> Vec<Option<f64>> {
    let times = trace.times();
    let values = trace.values();
    let finite = |i: usize| Some(values[i]).filter(|v| v.is_finite());

    let mut out = Vec::with_capacity(grid.len());
    // First sample at or after the current grid point
    let mut hi = 0usize;

    for &t in grid {
        while hi < times.len() && times[hi] < t {
            hi += 1;
        }
        if hi == times.len() || (hi == 0 && times[0] > t) {
            out.push(None);
            continue;
        }
        if times[hi] == t {
            out.push(finite(hi));
            continue;
        }

        let lo = hi - 1;
        let (t0, t1) = (times[lo], times[hi]);
        if t1 - t0 > tolerance {
            out.push(None);
            continue;
        }
        let value = match method {
            Interpolation::Nearest => {
                if t - t0 <= t1 - t {
                    finite(lo)
                } else {
                    finite(hi)
                }
            }
            Interpolation::Linear => match (finite(lo), finite(hi)) {
                (Some(v0), Some(v1)) => Some(v0 + (v1 - v0) * (t - t0) / (t1 - t0)),
                _ => None,
            },
        };
        out.push(value);
    }

    out
}
