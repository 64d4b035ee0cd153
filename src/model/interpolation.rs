//! Piecewise-linear interpolation on strictly increasing nodes.
//!
//! Two queries are needed by the model:
//! - [`interp_linear`]: value of the piecewise-linear interpolant with linear
//!   extrapolation on both sides (used to map the endogenous grid back onto
//!   the exogenous one).
//! - [`bracket`]: the bracketing interval and linear weight of a point,
//!   clamped to the node range (used to split distribution mass between two
//!   neighboring grid points).
//!
//! Nodes are assumed validated by the caller (strictly increasing, finite,
//! at least two points); these helpers do no allocation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryLocation {
    Left,
    Inside(usize),
    Right,
}

fn query_location(x: &[f64], xq: f64) -> QueryLocation {
    if xq < x[0] {
        return QueryLocation::Left;
    }
    if xq > x[x.len() - 1] {
        return QueryLocation::Right;
    }
    let idx = x.partition_point(|v| *v <= xq);
    if idx == 0 {
        QueryLocation::Inside(0)
    } else if idx >= x.len() {
        QueryLocation::Inside(x.len() - 2)
    } else {
        QueryLocation::Inside(idx - 1)
    }
}

/// Weight on the upper node `x1` of the segment `[x0, x1]` at `xq`.
#[inline]
fn upper_weight(x0: f64, x1: f64, xq: f64) -> f64 {
    if (x1 - x0).abs() <= f64::EPSILON { 0.0 } else { (xq - x0) / (x1 - x0) }
}

/// Evaluate the linear interpolant of `(x, y)` at `xq`, extrapolating the
/// first or last segment outside `[x[0], x[n-1]]`.
pub fn interp_linear(x: &[f64], y: &[f64], xq: f64) -> f64 {
    let n = x.len();
    let i = match query_location(x, xq) {
        QueryLocation::Left => 0,
        QueryLocation::Inside(i) => i,
        QueryLocation::Right => n - 2,
    };
    let w = upper_weight(x[i], x[i + 1], xq);
    (1.0 - w) * y[i] + w * y[i + 1]
}

/// Segment index `i` and weight `w ∈ [0, 1]` such that
/// `xq ≈ (1-w)·x[i] + w·x[i+1]`, clamping `xq` to the node range.
pub fn bracket(x: &[f64], xq: f64) -> (usize, f64) {
    let n = x.len();
    match query_location(x, xq) {
        QueryLocation::Left => (0, 0.0),
        QueryLocation::Right => (n - 2, 1.0),
        QueryLocation::Inside(i) => (i, upper_weight(x[i], x[i + 1], xq).clamp(0.0, 1.0)),
    }
}
