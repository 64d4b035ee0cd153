//! fixed_point — damped "iterate-to-fixed-point" engine on top of argmin.
//!
//! Purpose
//! -------
//! Provide the single iteration utility shared by every nested loop of the
//! model: the household Euler iteration, the stationary-distribution
//! iteration (both over `(capital, labor)` and over labor alone), and the
//! outer capital-market loop. Callers implement [`FixedPointMap`] and call
//! [`iterate`] with [`IterationOptions`].
//!
//! Key behaviors
//! -------------
//! - Bridge maps into argmin `Operator`s via [`adapter::ArgMinAdapter`] and
//!   drive them with a custom argmin solver ([`solver::DampedIteration`]).
//! - Stop on the sup-norm step size and cap the number of sweeps; hitting the
//!   cap is a typed `NonConvergence` error, never an endless loop.
//! - Report non-finite iterates as `NumericalInstability` at the sweep where
//!   they first appear.
//!
//! Invariants & assumptions
//! ------------------------
//! - Iterates are flat `Array1<f64>`; maps preserve length.
//! - Sweeps are Jacobi: a map reads only the previous iterate, so the result
//!   does not depend on evaluation order inside a sweep.
//! - Configuration is validated on construction ([`IterationOptions::new`]).
//!
//! Conventions
//! -----------
//! - Damping `κ` is the weight kept on the previous iterate.
//! - This module does no I/O; progress output comes from argmin's slog
//!   observer (feature `obs_slog`) and `tracing` events emitted by callers.
//!
//! Testing notes
//! -------------
//! - Unit tests cover validation helpers, the damping step, and full runs on
//!   affine maps (convergence, oscillation, error propagation).

pub mod adapter;
pub mod api;
pub mod run;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::iterate;
pub use self::traits::{FixedPointMap, FixedPointOutcome, IterationOptions};
pub use self::types::{Change, DEFAULT_MAX_ITER, FnEvalMap, Iterate};
