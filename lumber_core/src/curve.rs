//! # Piecewise-Linear Curves
//!
//! Breakpoint tables with linear interpolation between neighbours. Used for
//! the NDS Table 4A size and flat-use factors and for width-graduated
//! reference values.
//!
//! Curves never extrapolate: a query outside `[first x, last x]` is a
//! [`LumberError::Domain`]. Open-ended tables carry a final breakpoint at a
//! very large x (1000 in) that stands for "no further change".
//!
//! ```rust
//! use lumber_core::curve::PiecewiseLinearCurve;
//!
//! let curve =
//!     PiecewiseLinearCurve::new("demo", vec![1.0, 2.0, 4.0], vec![1.0, 1.5, 0.5]).unwrap();
//! assert_eq!(curve.evaluate(2.0).unwrap(), 1.5);
//! assert_eq!(curve.evaluate(3.0).unwrap(), 1.0);
//! assert!(curve.evaluate(0.5).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LumberError, LumberResult};

/// Ordered (x, y) breakpoints with strictly increasing x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveData", into = "CurveData")]
pub struct PiecewiseLinearCurve {
    name: String,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

/// Unvalidated wire form of a curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurveData {
    #[serde(default)]
    name: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<CurveData> for PiecewiseLinearCurve {
    type Error = LumberError;

    fn try_from(data: CurveData) -> LumberResult<Self> {
        PiecewiseLinearCurve::new(data.name, data.x, data.y)
    }
}

impl From<PiecewiseLinearCurve> for CurveData {
    fn from(curve: PiecewiseLinearCurve) -> Self {
        CurveData {
            name: curve.name,
            x: curve.xs,
            y: curve.ys,
        }
    }
}

impl PiecewiseLinearCurve {
    /// Build a curve from parallel x and y sequences.
    ///
    /// Fails with [`LumberError::Config`] when the lengths differ, fewer than
    /// two points are given, a value is not finite, or x is not strictly
    /// increasing.
    pub fn new(name: impl Into<String>, xs: Vec<f64>, ys: Vec<f64>) -> LumberResult<Self> {
        let name = name.into();
        if xs.len() != ys.len() {
            return Err(LumberError::config(format!(
                "curve '{}': {} x values but {} y values",
                name,
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(LumberError::config(format!(
                "curve '{}': at least two breakpoints are required",
                name
            )));
        }
        if let Some(bad) = xs.iter().chain(ys.iter()).find(|v| !v.is_finite()) {
            return Err(LumberError::config(format!(
                "curve '{}': non-finite breakpoint value {}",
                name, bad
            )));
        }
        if let Some(pair) = xs.windows(2).find(|w| w[1] <= w[0]) {
            return Err(LumberError::config(format!(
                "curve '{}': x values must be strictly increasing ({} then {})",
                name, pair[0], pair[1]
            )));
        }

        Ok(Self { name, xs, ys })
    }

    /// Linearly interpolated y at `x`.
    ///
    /// Exactly reproduces the tabulated y at every breakpoint.
    pub fn evaluate(&self, x: f64) -> LumberResult<f64> {
        let (min, max) = self.domain();
        if !x.is_finite() || x < min || x > max {
            return Err(LumberError::domain(self.name.clone(), x, min, max));
        }

        // First index whose x is strictly greater than the query.
        let upper = self.xs.partition_point(|&xi| xi <= x);
        if upper == self.xs.len() {
            return Ok(self.ys[upper - 1]);
        }

        let (x0, x1) = (self.xs[upper - 1], self.xs[upper]);
        let (y0, y1) = (self.ys[upper - 1], self.ys[upper]);
        Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }

    /// Smallest and largest x covered by the curve
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Curve name used in error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate over (x, y) breakpoints
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}
