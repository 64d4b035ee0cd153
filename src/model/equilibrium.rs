//! Stationary equilibrium — damped fixed point on aggregate capital.
//!
//! Purpose
//! -------
//! Find the capital stock `K` at which the capital households supply in the
//! stationary distribution equals the capital the firm demands at the
//! implied prices. One outer iteration moves through the stages
//!
//! `Proposing → Pricing → SolvingHousehold → Aggregating → Converged | Proposing`
//!
//! - **Proposing**: current guess `K⁽ʲ⁾`.
//! - **Pricing**: `(r, w)` from the firm's FOCs at `(K⁽ʲ⁾, L)`.
//! - **SolvingHousehold**: household policy at `(r, w)`.
//! - **Aggregating**: stationary distribution and `K* = Σ g·λ`.
//!
//! and the guess is updated to `K⁽ʲ⁺¹⁾ = κ·K⁽ʲ⁾ + (1-κ)·K*` until
//! `|K⁽ʲ⁺¹⁾ - K⁽ʲ⁾| < tol`.
//!
//! Key behaviors
//! -------------
//! - Aggregate labor `L = Σ π(l)·l` is computed once from the stationary
//!   distribution of the labor chain.
//! - Household policies and distributions are warm-started from the
//!   previous outer iteration.
//! - The outer loop runs on the shared fixed-point engine; inner failures
//!   abort it with their original error.
//! - Every outer iteration is recorded in [`EquilibriumState::history`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `K⁽⁰⁾ > 0`; the damping `κ` lies in `(0, 1)`.
//! - The reported policy, distribution and prices are those evaluated at
//!   the last guess `K⁽ʲ⁾`; the reported capital is `K⁽ʲ⁺¹⁾`.
//!
//! Testing notes
//! -------------
//! - Unit tests run a small economy to convergence and check the error paths.
//!   The reference economy runs in `tests/integration_equilibrium.rs`.
use crate::{
    config::Parameters,
    errors::{ModelError, ModelResult},
    fixed_point::{FixedPointMap, Iterate, IterationOptions, iterate},
    markov::{MarkovChain, rouwenhorst_labor},
    model::{
        distribution::{Distribution, aggregate_capital, stationary_distribution},
        firm::{Prices, firm_prices},
        grid::Grid,
        household::{PolicyFunction, solve_household},
    },
};
use ndarray::{Array1, array};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use tracing::{debug, info, warn};

/// Stage of an outer iteration, attached to log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Proposing,
    Pricing,
    SolvingHousehold,
    Aggregating,
    Converged,
}

/// One outer iteration: guess, implied supply, prices and the size of the
/// damped update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    pub iteration: usize,
    pub capital: f64,
    pub implied_capital: f64,
    pub r: f64,
    pub w: f64,
    pub change: f64,
}

/// EquilibriumState — terminal output of the outer loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EquilibriumState {
    pub capital: f64,
    pub labor: f64,
    pub prices: Prices,
    pub policy: PolicyFunction,
    pub distribution: Distribution,
    pub labor_distribution: Array1<f64>,
    pub iterations: usize,
    pub history: Vec<IterationRecord>,
}

impl EquilibriumState {
    /// Scalar summary suitable for serialization.
    pub fn summary(&self) -> EquilibriumSummary {
        EquilibriumSummary {
            capital: self.capital,
            labor: self.labor,
            interest_rate: self.prices.r,
            wage: self.prices.w,
            iterations: self.iterations,
            constrained_share: self.distribution.constrained_mass(),
            history: self.history.clone(),
        }
    }
}

/// Serializable equilibrium aggregates and iteration history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumSummary {
    pub capital: f64,
    pub labor: f64,
    pub interest_rate: f64,
    pub wage: f64,
    pub iterations: usize,
    pub constrained_share: f64,
    pub history: Vec<IterationRecord>,
}

/// EquilibriumSolver — the economy's fixed objects plus the outer loop.
///
/// Construction builds the grid, the labor chain and aggregate labor once;
/// [`EquilibriumSolver::solve`] can then be called from any positive guess.
#[derive(Debug, Clone)]
pub struct EquilibriumSolver<'p> {
    params: &'p Parameters,
    grid: Grid,
    chain: MarkovChain,
    labor_distribution: Array1<f64>,
    labor: f64,
}

impl<'p> EquilibriumSolver<'p> {
    /// # Errors
    /// - Grid or chain construction errors.
    /// - Errors from the labor-chain stationary distribution.
    /// - [`ModelError::InvalidAggregate`] if aggregate labor is not positive.
    pub fn new(params: &'p Parameters) -> ModelResult<Self> {
        let grid = Grid::from_spec(&params.grid)?;
        let chain = rouwenhorst_labor(&params.income)?;
        let labor_distribution =
            chain.stationary_distribution(&params.solver.labor_distribution())?;
        let labor = chain.mean(labor_distribution.view())?;
        if !(labor.is_finite() && labor > 0.0) {
            return Err(ModelError::InvalidAggregate { name: "labor", value: labor });
        }
        Ok(Self { params, grid, chain, labor_distribution, labor })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn chain(&self) -> &MarkovChain {
        &self.chain
    }

    /// Aggregate labor supply `L`.
    pub fn labor(&self) -> f64 {
        self.labor
    }

    pub fn labor_distribution(&self) -> &Array1<f64> {
        &self.labor_distribution
    }

    /// Iterate from `initial_capital` to the stationary equilibrium.
    ///
    /// # Errors
    /// - [`ModelError::InvalidInitialGuess`] unless `initial_capital > 0`.
    /// - [`ModelError::NonConvergence`] after `maxIter` outer iterations, or
    ///   any inner non-convergence.
    /// - Numerical errors from the household or distribution routines.
    pub fn solve(&self, initial_capital: f64) -> ModelResult<EquilibriumState> {
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(ModelError::InvalidInitialGuess {
                index: 0,
                value: initial_capital,
                reason: "Initial capital must be positive and finite.",
            });
        }
        let iteration = self.params.iteration;
        let opts = IterationOptions::new(
            iteration.kappa,
            iteration.tol,
            iteration.max_iter,
            self.params.solver.verbose,
            "equilibrium",
        )?;
        info!(
            initial_capital,
            labor = self.labor,
            kappa = iteration.kappa,
            tol = iteration.tol,
            "solving stationary equilibrium"
        );

        let market = CapitalMarket { solver: self, memo: RefCell::new(Memo::default()) };
        let outcome = iterate(&market, array![initial_capital], &opts)
            .inspect_err(|err| warn!(error = %err, "equilibrium iteration failed"))?;

        let Memo { last, history } = market.memo.into_inner();
        let Some(Evaluation { prices, policy, distribution }) = last else {
            return Err(ModelError::NonConvergence {
                routine: "equilibrium",
                iterations: outcome.iterations,
                last_change: outcome.last_change,
                tol: iteration.tol,
            });
        };
        let capital = outcome.fixed_point[0];
        info!(
            stage = ?Stage::Converged,
            capital,
            r = prices.r,
            w = prices.w,
            iterations = history.len(),
            "stationary equilibrium found"
        );
        debug!(solver_iterations = outcome.iterations, evaluations = history.len());
        Ok(EquilibriumState {
            capital,
            labor: self.labor,
            prices,
            policy,
            distribution,
            labor_distribution: self.labor_distribution.clone(),
            iterations: history.len(),
            history,
        })
    }
}

/// Solve the model described by `params` from the guess `initial_capital`.
pub fn solve_equilibrium(params: &Parameters, initial_capital: f64) -> ModelResult<EquilibriumState> {
    EquilibriumSolver::new(params)?.solve(initial_capital)
}

/// Objects evaluated at the latest guess.
#[derive(Debug)]
struct Evaluation {
    prices: Prices,
    policy: PolicyFunction,
    distribution: Distribution,
}

#[derive(Debug, Default)]
struct Memo {
    last: Option<Evaluation>,
    history: Vec<IterationRecord>,
}

/// Capital-market map `K ↦ K*(K)`; the engine applies the damping.
struct CapitalMarket<'s, 'p> {
    solver: &'s EquilibriumSolver<'p>,
    memo: RefCell<Memo>,
}

impl CapitalMarket<'_, '_> {
    fn evaluate(&self, capital: f64, iteration: usize) -> ModelResult<Evaluation> {
        let EquilibriumSolver { params, grid, chain, labor, .. } = self.solver;

        debug!(stage = ?Stage::Pricing, iteration, capital);
        let prices = firm_prices(capital, *labor, &params.technology)?;

        debug!(stage = ?Stage::SolvingHousehold, iteration, r = prices.r, w = prices.w);
        let memo = self.memo.borrow();
        let warm = memo.last.as_ref();
        let policy = solve_household(&prices, grid, chain, params, warm.map(|e| &e.policy))
            .inspect_err(|err| warn!(iteration, error = %err, "household solve failed"))?;

        debug!(stage = ?Stage::Aggregating, iteration);
        let distribution = stationary_distribution(
            &policy,
            grid,
            chain,
            &params.solver,
            warm.map(|e| &e.distribution),
        )
        .inspect_err(|err| warn!(iteration, error = %err, "distribution solve failed"))?;
        Ok(Evaluation { prices, policy, distribution })
    }
}

impl FixedPointMap for CapitalMarket<'_, '_> {
    fn apply(&self, x: &Iterate) -> ModelResult<Iterate> {
        let capital = x[0];
        let iteration = self.memo.borrow().history.len() + 1;
        debug!(stage = ?Stage::Proposing, iteration, capital);

        let evaluation = self.evaluate(capital, iteration)?;
        let implied_capital = aggregate_capital(&evaluation.policy, &evaluation.distribution)?;
        let kappa = self.solver.params.iteration.kappa;
        let change = (capital * kappa + implied_capital * (1.0 - kappa) - capital).abs();
        let record = IterationRecord {
            iteration,
            capital,
            implied_capital,
            r: evaluation.prices.r,
            w: evaluation.prices.w,
            change,
        };
        debug!(iteration, capital, implied_capital, r = record.r, w = record.w, change);

        let mut memo = self.memo.borrow_mut();
        memo.history.push(record);
        memo.last = Some(evaluation);
        Ok(array![implied_capital])
    }

    fn check(&self, x0: &Iterate) -> ModelResult<()> {
        if x0.len() != 1 {
            return Err(ModelError::ShapeMismatch { expected: (1, 1), found: (x0.len(), 1) });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ModelConfig, errors::ErrorKind, model::firm::firm_prices};
    use approx::assert_relative_eq;

    // A coarse version of the reference economy: the implied return keeps
    // βR above one, so savings pile up towards the upper bound and the outer
    // loop settles within a few dozen iterations.
    fn small_params() -> Parameters {
        let config = ModelConfig {
            k_max: 20.0,
            k_num: 40,
            l_num: 3,
            tol: 1e-5,
            max_iter: 200,
            ..ModelConfig::default()
        };
        Parameters::from_config(&config).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The outer loop converges and the reported objects are consistent.
    //
    // Expect
    // ------
    // - Finite positive K and w, `r` equal to the FOC at (K, L).
    // - One history record per outer iteration, the last below tol.
    // - The distribution is a probability law and K lies inside the grid.
    fn small_economy_converges() {
        // Arrange
        let params = small_params();

        // Act
        let state = solve_equilibrium(&params, 5.0).unwrap();

        // Assert
        assert!(state.capital.is_finite() && state.capital > 0.0);
        assert!(state.capital <= params.grid.k_max + 1e-9);
        assert!(state.prices.w > 0.0);
        let foc = firm_prices(state.capital, state.labor, &params.technology).unwrap();
        assert_relative_eq!(state.prices.r, foc.r, max_relative = 1e-4);
        assert_relative_eq!(state.prices.w, foc.w, max_relative = 1e-4);
        assert_eq!(state.history.len(), state.iterations);
        let last = state.history[state.history.len() - 1];
        assert!(last.change < params.iteration.tol);
        assert_relative_eq!(state.distribution.mass().sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_non_positive_initial_capital() {
        let params = small_params();
        let solver = EquilibriumSolver::new(&params).unwrap();

        for k0 in [0.0, -1.0, f64::NAN] {
            assert!(matches!(solver.solve(k0), Err(ModelError::InvalidInitialGuess { .. })));
        }
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let mut params = small_params();
        params.iteration.max_iter = 2;

        let err = solve_equilibrium(&params, 5.0).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NonConvergence);
    }

    #[test]
    fn labor_supply_is_mean_endowment() {
        let params = small_params();

        let solver = EquilibriumSolver::new(&params).unwrap();

        let expected: f64 = solver
            .labor_distribution()
            .iter()
            .zip(solver.chain().states().iter())
            .map(|(p, l)| p * l)
            .sum();
        assert_relative_eq!(solver.labor(), expected, max_relative = 1e-14);
        assert_relative_eq!(solver.labor_distribution().sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let params = small_params();
        let state = solve_equilibrium(&params, 5.0).unwrap();

        let json = serde_json::to_string(&state.summary()).unwrap();

        assert!(json.contains("\"interestRate\""));
        assert!(json.contains("\"constrainedShare\""));
        assert!(json.contains("\"impliedCapital\""));
    }
}
