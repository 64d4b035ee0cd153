//! High-level entry point for solving `x = T(x)` with damping.
//!
//! Validates the starting point, wraps the map in an [`ArgMinAdapter`], and
//! delegates the run to [`run_damped`].
use crate::{
    errors::ModelResult,
    fixed_point::{
        adapter::ArgMinAdapter,
        run::run_damped,
        solver::DampedIteration,
        traits::{FixedPointMap, FixedPointOutcome, IterationOptions},
        types::Iterate,
        validation::validate_initial_guess,
    },
};

/// Iterate a [`FixedPointMap`] to its fixed point.
///
/// # Behavior
/// - Rejects empty or non-finite starting points, then calls `map.check(&x0)`.
/// - Runs `x_{n+1} = κ·x_n + (1-κ)·T(x_n)` until `‖x_{n+1} - x_n‖_∞ < tol`.
///
/// # Errors
/// - [`ModelError::InvalidInitialGuess`](crate::errors::ModelError::InvalidInitialGuess)
///   or any error from `map.check`.
/// - Any error raised by `map.apply` during a sweep.
/// - [`ModelError::NonConvergence`](crate::errors::ModelError::NonConvergence)
///   when `opts.max_iter` sweeps do not reach the tolerance.
///
/// # Example
/// ```
/// use ndarray::{Array1, array};
/// use rust_aiyagari::errors::ModelResult;
/// use rust_aiyagari::fixed_point::{FixedPointMap, IterationOptions, iterate};
///
/// // T(x) = 0.5·x + 1 has the fixed point x = 2.
/// struct Affine;
/// impl FixedPointMap for Affine {
///     fn apply(&self, x: &Array1<f64>) -> ModelResult<Array1<f64>> {
///         Ok(x * 0.5 + 1.0)
///     }
/// }
///
/// let opts = IterationOptions::new(0.0, 1e-12, 200, false, "affine")?;
/// let out = iterate(&Affine, array![0.0], &opts)?;
/// assert!((out.fixed_point[0] - 2.0).abs() < 1e-10);
/// # Ok::<(), rust_aiyagari::errors::ModelError>(())
/// ```
pub fn iterate<M: FixedPointMap>(
    map: &M, x0: Iterate, opts: &IterationOptions,
) -> ModelResult<FixedPointOutcome> {
    validate_initial_guess(&x0)?;
    map.check(&x0)?;
    let problem = ArgMinAdapter::new(map);
    let solver = DampedIteration::new(opts);
    run_damped(x0, opts, problem, solver)
}
