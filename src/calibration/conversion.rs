use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::CalibrationError;

/// Piecewise-linear lookup from raw value to physical value.
///
/// Points are strictly increasing in x. Inputs outside `[x_first, x_last]`
/// have no physical value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupCurve {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LookupCurve {
    /// Build a curve from `(raw, physical)` points
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, CalibrationError> {
        if points.len() < 2 {
            return Err(CalibrationError::InvalidCurve(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(CalibrationError::InvalidCurve(
                "points must be finite".to_string(),
            ));
        }
        if let Some(i) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(CalibrationError::InvalidCurve(format!(
                "x values must be strictly increasing (point {})",
                i + 1
            )));
        }
        let (xs, ys) = points.into_iter().unzip();
        Ok(Self { xs, ys })
    }

    /// Raw-value domain covered by the curve
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Curve points
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Interpolate the curve at `x`; `None` outside the domain
    pub fn eval(&self, x: f64) -> Option<f64> {
        let (lo, hi) = self.domain();
        if !x.is_finite() || x < lo || x > hi {
            return None;
        }
        // First index with xs[i] >= x
        let i = self.xs.partition_point(|&v| v < x);
        if self.xs[i] == x {
            return Some(self.ys[i]);
        }
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

impl<'de> Deserialize<'de> for LookupCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<(f64, f64)>::deserialize(deserializer)?;
        LookupCurve::new(points).map_err(serde::de::Error::custom)
    }
}

/// Raw-to-physical conversion of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    /// `physical = raw * scale + offset`
    Linear {
        /// Multiplicative factor
        scale: f64,
        /// Additive offset
        offset: f64,
    },
    /// Piecewise-linear lookup
    Curve(LookupCurve),
}

impl Conversion {
    /// Pure scale factor without offset
    pub fn scale(scale: f64) -> Self {
        Conversion::Linear { scale, offset: 0.0 }
    }

    /// Convert one raw value. `None` when the input is non-finite or outside a
    /// curve's domain.
    pub fn apply(&self, raw: f64) -> Option<f64> {
        if !raw.is_finite() {
            return None;
        }
        match self {
            Conversion::Linear { scale, offset } => Some(raw * scale + offset),
            Conversion::Curve(curve) => curve.eval(raw),
        }
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Linear { scale, offset } if *offset == 0.0 => write!(f, "x * {}", scale),
            Conversion::Linear { scale, offset } => write!(f, "x * {} + {}", scale, offset),
            Conversion::Curve(curve) => {
                let (lo, hi) = curve.domain();
                write!(f, "curve[{} points, {}..{}]", curve.xs.len(), lo, hi)
            }
        }
    }
}
