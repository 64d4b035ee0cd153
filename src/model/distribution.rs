//! Stationary distribution of households over `(capital, labor)`.
//!
//! Purpose
//! -------
//! Given a savings policy `g(k, l)`, find the invariant mass `λ` of the
//! law of motion
//! `λ'(k'_j, l') = Σ_{k,l} λ(k, l) · P(l, l') · ω_j(g(k, l))`,
//! where `ω` splits the mass of an off-grid savings choice between its two
//! bracketing grid points in proportion to the linear-interpolation weights
//! (a "lottery" that preserves expected capital).
//!
//! Key behaviors
//! -------------
//! - Brackets and weights are computed once per policy; each sweep is a
//!   scatter of current mass through them.
//! - Iterates through the shared fixed-point engine as a lazy chain
//!   (damping `1/2`), from the uniform distribution or a warm start.
//! - The result is clipped at zero and renormalized to sum to exactly 1.
//!
//! Invariants & assumptions
//! ------------------------
//! - Mass is non-negative and sums to 1; the policy lies inside the grid.
//! - Arrays share the `kNum × lNum` layout of [`PolicyFunction`].
//!
//! Testing notes
//! -------------
//! - Unit tests use hand-built policies with known invariant laws (all mass
//!   at the constraint, mass split by the lottery) and the model policy.
use crate::{
    config::options::SolverOptions,
    errors::{ModelError, ModelResult},
    fixed_point::{FixedPointMap, Iterate, iterate},
    markov::{MarkovChain, chain::normalize},
    model::{grid::Grid, household::PolicyFunction, interpolation::bracket},
};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::debug;

/// Distribution — invariant mass over the `kNum × lNum` state space.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    mass: Array2<f64>,
}

impl Distribution {
    /// Uniform mass over all states.
    pub fn uniform(k_num: usize, l_num: usize) -> Self {
        let n = (k_num * l_num) as f64;
        Self { mass: Array2::from_elem((k_num, l_num), 1.0 / n) }
    }

    pub fn mass(&self) -> ArrayView2<'_, f64> {
        self.mass.view()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.mass.dim()
    }

    /// Marginal distribution over capital grid points.
    pub fn capital_marginal(&self) -> Array1<f64> {
        self.mass.sum_axis(Axis(1))
    }

    /// Marginal distribution over labor states.
    pub fn labor_marginal(&self) -> Array1<f64> {
        self.mass.sum_axis(Axis(0))
    }

    /// `Σ λ(k, l) · f(k, l)` for a state-space function `f`.
    ///
    /// # Errors
    /// [`ModelError::ShapeMismatch`] if `values` is not `kNum × lNum`.
    pub fn aggregate(&self, values: ArrayView2<'_, f64>) -> ModelResult<f64> {
        if values.dim() != self.dim() {
            return Err(ModelError::ShapeMismatch { expected: self.dim(), found: values.dim() });
        }
        Ok((&self.mass * &values).sum())
    }

    /// Share of households at the borrowing limit (first grid point).
    pub fn constrained_mass(&self) -> f64 {
        self.mass.row(0).sum()
    }
}

/// Aggregate capital supply `K* = Σ g(k, l) · λ(k, l)`.
///
/// # Errors
/// [`ModelError::ShapeMismatch`] if policy and distribution disagree in shape.
pub fn aggregate_capital(policy: &PolicyFunction, dist: &Distribution) -> ModelResult<f64> {
    dist.aggregate(policy.next_capital())
}

/// Law of motion of the mass, with precomputed lottery brackets.
struct MassTransition<'a> {
    transition: ArrayView2<'a, f64>,
    brackets: Vec<(usize, f64)>,
    shape: (usize, usize),
}

impl<'a> MassTransition<'a> {
    fn new(policy: &PolicyFunction, grid: &Grid, chain: &'a MarkovChain) -> Self {
        let k = grid.as_slice();
        let brackets = policy.next_capital().iter().map(|&kp| bracket(k, kp)).collect();
        Self { transition: chain.transition(), brackets, shape: policy.dim() }
    }
}

impl FixedPointMap for MassTransition<'_> {
    fn apply(&self, x: &Iterate) -> ModelResult<Iterate> {
        let (k_num, l_num) = self.shape;
        let mut next = Array2::<f64>::zeros((k_num, l_num));
        for (idx, (&m, &(i, w))) in x.iter().zip(&self.brackets).enumerate() {
            if m == 0.0 {
                continue;
            }
            let l = idx % l_num;
            for (l_next, &p) in self.transition.row(l).iter().enumerate() {
                let flow = m * p;
                next[[i, l_next]] += (1.0 - w) * flow;
                next[[i + 1, l_next]] += w * flow;
            }
        }
        Ok(Iterate::from_iter(next.iter().copied()))
    }

    fn check(&self, x0: &Iterate) -> ModelResult<()> {
        let (k_num, l_num) = self.shape;
        if x0.len() != k_num * l_num {
            return Err(ModelError::ShapeMismatch { expected: self.shape, found: (x0.len(), 1) });
        }
        Ok(())
    }
}

/// Invariant distribution implied by `policy`.
///
/// # Errors
/// - [`ModelError::ShapeMismatch`] if the policy does not match grid × chain.
/// - [`ModelError::NonConvergence`] after `distribution_max_iter` sweeps.
/// - [`ModelError::DegenerateDistribution`] if the mass vanishes.
pub fn stationary_distribution(
    policy: &PolicyFunction, grid: &Grid, chain: &MarkovChain, options: &SolverOptions,
    warm_start: Option<&Distribution>,
) -> ModelResult<Distribution> {
    let shape = (grid.len(), chain.len());
    if policy.dim() != shape {
        return Err(ModelError::ShapeMismatch { expected: shape, found: policy.dim() });
    }
    let start = match warm_start {
        Some(dist) if dist.dim() == shape => dist.mass.clone(),
        _ => Distribution::uniform(shape.0, shape.1).mass,
    };

    let law = MassTransition::new(policy, grid, chain);
    let opts = options.distribution();
    let outcome = iterate(&law, Iterate::from_iter(start.iter().copied()), &opts)?;
    debug!(
        iterations = outcome.iterations,
        last_change = outcome.last_change,
        "stationary distribution converged"
    );

    let mass = normalize(outcome.fixed_point)?
        .into_shape(shape)
        .map_err(|_| ModelError::ShapeMismatch { expected: shape, found: (shape.0 * shape.1, 1) })?;
    Ok(Distribution { mass })
}
