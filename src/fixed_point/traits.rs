//! Public API surface for damped fixed-point iteration.
//!
//! - [`FixedPointMap`]: trait implemented by every operator `T` whose fixed
//!   point `x = T(x)` the crate solves for.
//! - [`IterationOptions`]: damping, tolerance, iteration cap and verbosity.
//! - [`FixedPointOutcome`]: normalized result returned by [`iterate`](crate::fixed_point::iterate).
//!
//! Convention: one sweep computes `x_{n+1} = κ·x_n + (1-κ)·T(x_n)` and the
//! run stops as soon as `‖x_{n+1} - x_n‖_∞ < tol`.
use crate::{
    errors::{ModelError, ModelResult},
    fixed_point::{
        types::{Change, DEFAULT_MAX_ITER, FnEvalMap, Iterate},
        validation::{validate_iterate, verify_damping, verify_max_iter, verify_tol},
    },
};
use argmin_math::ArgminL2Norm;

/// Operator whose fixed point is sought.
///
/// Required:
/// - `apply(&Iterate) -> ModelResult<Iterate>`: evaluate `T(x)`. The output
///   must have the same length as the input. Domain violations and numerical
///   failures are returned as [`ModelError`] values, never panics.
///
/// Optional:
/// - `check(&Iterate) -> ModelResult<()>`: reject an unusable starting point
///   before the first sweep (e.g. wrong length). Defaults to accepting.
pub trait FixedPointMap {
    fn apply(&self, x: &Iterate) -> ModelResult<Iterate>;

    fn check(&self, _x0: &Iterate) -> ModelResult<()> {
        Ok(())
    }
}

/// Iteration-level configuration.
///
/// Fields:
/// - `damping: f64` — weight `κ ∈ [0, 1)` kept on the previous iterate.
/// - `tol: f64` — sup-norm step size below which the run has converged.
/// - `max_iter: usize` — hard cap on sweeps; reaching it is a
///   [`ModelError::NonConvergence`].
/// - `verbose: bool` — attach the argmin terminal observer (behind the
///   `obs_slog` feature).
/// - `routine: &'static str` — label used in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationOptions {
    pub damping: f64,
    pub tol: f64,
    pub max_iter: usize,
    pub verbose: bool,
    pub routine: &'static str,
}

impl IterationOptions {
    /// Construct validated iteration options.
    ///
    /// # Errors
    /// - [`ModelError::InvalidDamping`] unless `0 ≤ damping < 1`.
    /// - [`ModelError::InvalidTolerance`] for non-finite or non-positive `tol`.
    /// - [`ModelError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        damping: f64, tol: f64, max_iter: usize, verbose: bool, routine: &'static str,
    ) -> ModelResult<Self> {
        verify_damping(damping)?;
        verify_tol(tol)?;
        verify_max_iter(max_iter)?;
        Ok(Self { damping, tol, max_iter, verbose, routine })
    }
}

impl Default for IterationOptions {
    fn default() -> Self {
        Self {
            damping: 0.0,
            tol: 1e-8,
            max_iter: DEFAULT_MAX_ITER,
            verbose: false,
            routine: "fixed point",
        }
    }
}

/// Canonical result of a converged fixed-point run.
///
/// - `fixed_point`: final damped iterate `x_{n+1}`.
/// - `last_change`: `‖x_{n+1} - x_n‖_∞` of the final sweep (below `tol`).
/// - `step_norm`: Euclidean norm of the final step, for diagnostics.
/// - `iterations`: number of sweeps performed.
/// - `fn_evals`: operator-evaluation counters reported by argmin.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPointOutcome {
    pub fixed_point: Iterate,
    pub last_change: Change,
    pub step_norm: f64,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl FixedPointOutcome {
    /// Build a validated [`FixedPointOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - a finiteness check of the final iterate and of the last change,
    /// - the convergence check `last_change < tol`; a run that stopped for
    ///   any other reason (iteration cap) is reported as non-convergence.
    ///
    /// # Errors
    /// - [`ModelError::NonFiniteValue`] if the iterate or step is not finite.
    /// - [`ModelError::NonConvergence`] if the tolerance was never met.
    pub fn new(
        fixed_point: Option<Iterate>, previous: Option<&Iterate>, last_change: Change,
        iterations: u64, fn_evals: FnEvalMap, opts: &IterationOptions,
    ) -> ModelResult<Self> {
        let routine = opts.routine;
        let iterations = iterations as usize;
        let fixed_point = fixed_point.ok_or(ModelError::NonConvergence {
            routine,
            iterations,
            last_change,
            tol: opts.tol,
        })?;
        validate_iterate(&fixed_point, routine)?;
        if last_change.is_nan() {
            return Err(ModelError::NonFiniteValue { routine, index: 0, value: last_change });
        }
        if !(last_change < opts.tol) {
            return Err(ModelError::NonConvergence {
                routine,
                iterations,
                last_change,
                tol: opts.tol,
            });
        }
        let step_norm = previous.map(|prev| (&fixed_point - prev).l2_norm()).unwrap_or(0.0);
        Ok(Self { fixed_point, last_change, step_norm, iterations, fn_evals })
    }
}
