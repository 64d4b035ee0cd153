//! Finite Markov chains — validated state values plus a row-stochastic
//! transition matrix.
//!
//! Purpose
//! -------
//! Represent the discretized labor-endowment process shared by the household
//! problem (conditional expectations over next-period states), the joint
//! stationary distribution (transition of the labor coordinate) and the
//! aggregate labor supply (stationary labor distribution).
//!
//! Key behaviors
//! -------------
//! - [`MarkovChain::new`] validates shape, state ordering and stochasticity.
//! - [`MarkovChain::stationary_distribution`] solves `π = π P` with the shared
//!   fixed-point engine on the lazy chain `½(I + P)`, which has the same fixed
//!   point and converges for periodic `P` as well.
//! - [`MarkovChain::map_states`] relabels states (e.g. log endowment → level).
//!
//! Invariants & assumptions
//! ------------------------
//! - `states` is finite and non-decreasing; `transition` is `n × n` with
//!   entries in `[0, 1]` and rows summing to 1 within [`ROW_SUM_TOL`].
//! - Chains are immutable after construction.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each rejection path, stationary distributions of a
//!   two-state chain (closed form) and of a periodic chain.
use crate::{
    errors::{ModelError, ModelResult},
    fixed_point::{FixedPointMap, Iterate, IterationOptions, iterate},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::debug;

/// Allowed deviation of a transition row sum from 1.
pub const ROW_SUM_TOL: f64 = 1e-10;

/// MarkovChain — ordered states and transition probabilities `P[i, j] =
/// Pr(x' = states[j] | x = states[i])`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovChain {
    states: Array1<f64>,
    transition: Array2<f64>,
}

impl MarkovChain {
    /// Build a validated chain.
    ///
    /// # Errors
    /// - [`ModelError::InvalidStateCount`] if there are no states.
    /// - [`ModelError::ChainShapeMismatch`] unless `transition` is `n × n`.
    /// - [`ModelError::InvalidChainState`] for non-finite or decreasing states.
    /// - [`ModelError::InvalidTransitionRow`] for entries outside `[0, 1]` or a
    ///   row sum away from 1.
    pub fn new(states: Array1<f64>, transition: Array2<f64>) -> ModelResult<Self> {
        let n = states.len();
        if n == 0 {
            return Err(ModelError::InvalidStateCount { n });
        }
        let (rows, cols) = transition.dim();
        if rows != n || cols != n {
            return Err(ModelError::ChainShapeMismatch { states: n, rows, cols });
        }
        validate_states(states.view())?;
        validate_transition(transition.view())?;
        Ok(Self { states, transition })
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false` for a validated chain; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> ArrayView1<'_, f64> {
        self.states.view()
    }

    pub fn transition(&self) -> ArrayView2<'_, f64> {
        self.transition.view()
    }

    /// Apply `f` to every state value, keeping the transition matrix.
    ///
    /// # Errors
    /// [`ModelError::InvalidChainState`] if the mapped states are non-finite
    /// or no longer non-decreasing (i.e. `f` is not monotone).
    pub fn map_states<F: Fn(f64) -> f64>(&self, f: F) -> ModelResult<Self> {
        let states = self.states.mapv(f);
        validate_states(states.view())?;
        Ok(Self { states, transition: self.transition.clone() })
    }

    /// Stationary distribution `π` with `π = π P`, normalized to sum to 1.
    ///
    /// Iterates from the uniform distribution using `opts` (the damping in
    /// `opts` makes the chain lazy).
    ///
    /// # Errors
    /// - Propagates [`iterate`] errors (non-convergence, non-finite values).
    /// - [`ModelError::DegenerateDistribution`] if the mass vanishes.
    pub fn stationary_distribution(&self, opts: &IterationOptions) -> ModelResult<Array1<f64>> {
        let n = self.len();
        let x0 = Array1::from_elem(n, 1.0 / n as f64);
        let outcome = iterate(&ChainStep { transition: self.transition.view() }, x0, opts)?;
        debug!(
            routine = opts.routine,
            iterations = outcome.iterations,
            last_change = outcome.last_change,
            "stationary distribution converged"
        );
        normalize(outcome.fixed_point)
    }

    /// Expected state value `Σ π_i · x_i` under `dist`.
    ///
    /// # Errors
    /// [`ModelError::ShapeMismatch`] if `dist` has the wrong length.
    pub fn mean(&self, dist: ArrayView1<'_, f64>) -> ModelResult<f64> {
        if dist.len() != self.len() {
            return Err(ModelError::ShapeMismatch {
                expected: (self.len(), 1),
                found: (dist.len(), 1),
            });
        }
        Ok(dist.dot(&self.states))
    }
}

/// One step of the distribution recursion, `π ↦ π P`.
struct ChainStep<'a> {
    transition: ArrayView2<'a, f64>,
}

impl FixedPointMap for ChainStep<'_> {
    fn apply(&self, x: &Iterate) -> ModelResult<Iterate> {
        Ok(x.dot(&self.transition))
    }

    fn check(&self, x0: &Iterate) -> ModelResult<()> {
        let n = self.transition.nrows();
        if x0.len() != n {
            return Err(ModelError::ShapeMismatch { expected: (n, 1), found: (x0.len(), 1) });
        }
        Ok(())
    }
}

/// Rescale a non-negative mass vector to sum to 1.
pub(crate) fn normalize(mut mass: Array1<f64>) -> ModelResult<Array1<f64>> {
    mass.mapv_inplace(|m| m.max(0.0));
    let total = mass.sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(ModelError::DegenerateDistribution { total });
    }
    mass /= total;
    Ok(mass)
}

fn validate_states(states: ArrayView1<'_, f64>) -> ModelResult<()> {
    for (index, &value) in states.iter().enumerate() {
        if !value.is_finite() {
            return Err(ModelError::InvalidChainState {
                index,
                value,
                reason: "State value must be finite.",
            });
        }
        if index > 0 && value < states[index - 1] {
            return Err(ModelError::InvalidChainState {
                index,
                value,
                reason: "State values must be non-decreasing.",
            });
        }
    }
    Ok(())
}

fn validate_transition(transition: ArrayView2<'_, f64>) -> ModelResult<()> {
    for (row, probs) in transition.outer_iter().enumerate() {
        if let Some(&value) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Err(ModelError::InvalidTransitionRow {
                row,
                value,
                reason: "Transition probabilities must lie in [0, 1].",
            });
        }
        let total = probs.sum();
        if (total - 1.0).abs() > ROW_SUM_TOL {
            return Err(ModelError::InvalidTransitionRow {
                row,
                value: total,
                reason: "Transition row must sum to 1.",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn opts() -> IterationOptions {
        IterationOptions::new(0.5, 1e-13, 100_000, false, "labor distribution").unwrap()
    }

    #[test]
    fn new_rejects_shape_and_probability_violations() {
        let states = array![0.0, 1.0];

        let wrong_shape = MarkovChain::new(states.clone(), Array2::eye(3));
        let negative = MarkovChain::new(states.clone(), array![[1.2, -0.2], [0.5, 0.5]]);
        let bad_sum = MarkovChain::new(states.clone(), array![[0.6, 0.6], [0.5, 0.5]]);
        let decreasing = MarkovChain::new(array![1.0, 0.0], Array2::eye(2));

        assert!(matches!(wrong_shape, Err(ModelError::ChainShapeMismatch { rows: 3, .. })));
        assert!(matches!(negative, Err(ModelError::InvalidTransitionRow { row: 0, .. })));
        assert!(matches!(bad_sum, Err(ModelError::InvalidTransitionRow { row: 0, .. })));
        assert!(matches!(decreasing, Err(ModelError::InvalidChainState { index: 1, .. })));
        assert_eq!(bad_sum.unwrap_err().kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    // Purpose
    // -------
    // A two-state chain has the closed-form stationary law
    // `π = (q, p) / (p + q)` with `p = P[0,1]`, `q = P[1,0]`.
    fn stationary_distribution_matches_two_state_closed_form() {
        // Arrange
        let chain = MarkovChain::new(array![0.5, 1.5], array![[0.9, 0.1], [0.3, 0.7]]).unwrap();

        // Act
        let pi = chain.stationary_distribution(&opts()).unwrap();

        // Assert
        assert_relative_eq!(pi[0], 0.75, epsilon = 1e-10);
        assert_relative_eq!(pi[1], 0.25, epsilon = 1e-10);
        assert_relative_eq!(chain.mean(pi.view()).unwrap(), 0.75, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // The lazy iteration converges on a periodic chain, where plain
    // `π ↦ π P` would oscillate forever.
    fn stationary_distribution_handles_periodic_chain() {
        let chain = MarkovChain::new(array![0.0, 1.0], array![[0.0, 1.0], [1.0, 0.0]]).unwrap();

        let pi = chain.stationary_distribution(&opts()).unwrap();

        assert_relative_eq!(pi[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(pi.sum(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn map_states_requires_monotone_relabeling() {
        let chain = MarkovChain::new(array![-1.0, 0.0, 1.0], Array2::eye(3)).unwrap();

        let levels = chain.map_states(f64::exp).unwrap();
        let flipped = chain.map_states(|x| -x);

        assert_relative_eq!(levels.states()[1], 1.0);
        assert_eq!(levels.transition(), chain.transition());
        assert!(matches!(flipped, Err(ModelError::InvalidChainState { .. })));
    }

    #[test]
    fn mean_rejects_wrong_length() {
        let chain = MarkovChain::new(array![0.0, 1.0], Array2::eye(2)).unwrap();

        assert!(matches!(
            chain.mean(array![1.0].view()),
            Err(ModelError::ShapeMismatch { expected: (2, 1), found: (1, 1) })
        ));
    }
}
