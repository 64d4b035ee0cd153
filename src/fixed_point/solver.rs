//! Damped fixed-point iteration as an argmin [`Solver`].
//!
//! Each argmin iteration performs one Jacobi sweep: the whole operator is
//! evaluated at the current iterate, blended with it, and the sup-norm of the
//! step is stored in the state's cost slot. Termination is requested as soon
//! as that step falls below the tolerance; the iteration cap itself is
//! enforced by argmin's executor.
use crate::{
    errors::ModelError,
    fixed_point::{
        traits::IterationOptions,
        types::{FixedPointState, Iterate},
        validation::{sup_norm_diff, validate_iterate},
    },
};
use argmin::core::{
    ArgminError, Error, KV, Operator, Problem, Solver, State, TerminationReason, TerminationStatus,
};

/// Damped (Mann-type) iteration `x_{n+1} = κ·x_n + (1-κ)·T(x_n)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedIteration {
    damping: f64,
    tol: f64,
    routine: &'static str,
}

impl DampedIteration {
    /// Build the solver from already-validated options.
    pub fn new(opts: &IterationOptions) -> Self {
        Self { damping: opts.damping, tol: opts.tol, routine: opts.routine }
    }
}

/// Blend the previous iterate with its image under `T`.
pub fn damped_step(x: &Iterate, mapped: &Iterate, damping: f64) -> Iterate {
    if damping == 0.0 {
        return mapped.clone();
    }
    x * damping + mapped * (1.0 - damping)
}

impl<O> Solver<O, FixedPointState> for DampedIteration
where
    O: Operator<Param = Iterate, Output = Iterate>,
{
    const NAME: &'static str = "Damped fixed-point iteration";

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: FixedPointState,
    ) -> Result<(FixedPointState, Option<KV>), Error> {
        let x = state.get_param().ok_or_else(|| {
            Error::from(ArgminError::NotInitialized {
                text: "Damped iteration requires an initial iterate; set it via `configure`."
                    .to_string(),
            })
        })?;
        let mapped = problem.apply(x)?;
        if mapped.len() != x.len() {
            return Err(ModelError::ShapeMismatch {
                expected: (x.len(), 1),
                found: (mapped.len(), 1),
            }
            .into());
        }
        let next = damped_step(x, &mapped, self.damping);
        validate_iterate(&next, self.routine)?;
        let change = sup_norm_diff(&next, x);
        // The step size rides in the cost slot, which is what the observer prints.
        Ok((state.param(next).cost(change), None))
    }

    fn terminate(&mut self, state: &FixedPointState) -> TerminationStatus {
        if state.get_cost() < self.tol {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        } else {
            TerminationStatus::NotTerminated
        }
    }
}
