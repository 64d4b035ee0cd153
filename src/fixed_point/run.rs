//! Execution helper that runs the damped solver through argmin's
//! [`Executor`] and returns a crate-friendly [`FixedPointOutcome`].
use crate::{
    errors::ModelResult,
    fixed_point::{
        adapter::ArgMinAdapter,
        solver::DampedIteration,
        traits::{FixedPointMap, FixedPointOutcome, IterationOptions},
        types::Iterate,
    },
};
use argmin::core::{Executor, State};

/// Run a damped fixed-point iteration on an adapted map.
///
/// Wires up:
/// - the map via [`ArgMinAdapter`],
/// - the [`DampedIteration`] solver,
/// - the starting iterate `x0` and the cap `opts.max_iter`,
/// - the terminal slog observer when the `obs_slog` feature is enabled and
///   `opts.verbose == true`,
///
/// then executes and converts the final argmin state into a
/// [`FixedPointOutcome`].
///
/// # Errors
/// - Propagates map failures (domain or numerical) raised during any sweep.
/// - [`ModelError::NonConvergence`](crate::errors::ModelError::NonConvergence)
///   when the cap is reached before the tolerance.
pub fn run_damped<'a, M>(
    x0: Iterate, opts: &IterationOptions, problem: ArgMinAdapter<'a, M>, solver: DampedIteration,
) -> ModelResult<FixedPointOutcome>
where
    M: FixedPointMap,
{
    let max_iter = opts.max_iter as u64;
    #[allow(unused_mut)]
    let mut executor =
        Executor::new(problem, solver).configure(|state| state.param(x0).max_iters(max_iter));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut state = executor.run()?.state().clone();
    let iterations = state.get_iter();
    let last_change = state.get_cost();
    let fn_evals = state.get_func_counts().clone();
    let previous = state.get_prev_param().cloned();
    let outcome = FixedPointOutcome::new(
        state.take_param(),
        previous.as_ref(),
        last_change,
        iterations,
        fn_evals,
        opts,
    )?;
    tracing::trace!(
        routine = opts.routine,
        iterations = outcome.iterations,
        change = outcome.last_change,
        "fixed point reached"
    );
    Ok(outcome)
}
