//! fixed_point::types — shared numeric aliases and argmin state wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types used by the damped fixed-point engine so the
//! rest of the crate stays agnostic to `ndarray` and argmin generics.
//!
//! Conventions
//! -----------
//! - Every iterate is a flat `Array1<f64>`. Callers with matrix-valued
//!   unknowns (consumption, distributions) flatten in row-major order.
//! - The argmin "cost" slot of [`FixedPointState`] carries the sup-norm change
//!   of the last damped step, so argmin's best-cost bookkeeping tracks the
//!   smallest step seen.
use argmin::core::IterState;
use ndarray::Array1;
use std::collections::HashMap;

/// Iterate `x` of a fixed-point problem `x = T(x)`.
pub type Iterate = Array1<f64>;

/// Scalar step size `‖x_{n+1} - x_n‖_∞`.
pub type Change = f64;

/// Operator-evaluation counters as reported by argmin (e.g. `"operator_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// argmin iteration state specialized to the engine: parameters only, with
/// the step size stored in the cost slot.
pub type FixedPointState = IterState<Iterate, (), (), (), (), Change>;

/// Default cap on fixed-point sweeps when the caller does not choose one.
pub const DEFAULT_MAX_ITER: usize = 10_000;
