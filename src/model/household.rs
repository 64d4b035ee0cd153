//! Household problem — consumption/savings policy for given prices.
//!
//! Purpose
//! -------
//! Solve the income-fluctuation problem of a household with CRRA utility,
//! labor endowment following a finite Markov chain, and the borrowing
//! constraint `k' ≥ kMin`, by iterating the Euler equation
//! `u'(c) = β(1+r) E[u'(c')]` to a fixed point in the consumption policy.
//!
//! Key behaviors
//! -------------
//! - One sweep runs in endogenous-grid form: for every next-period grid level
//!   `k'_i` and state `l`, the Euler right-hand side computed from the
//!   previous sweep's policy is inverted to current consumption, which pins
//!   the current capital `(c + k'_i - w·l)/(1+r)` that makes `k'_i` optimal.
//!   Linear interpolation maps those endogenous points back onto the grid.
//! - Grid points below the first endogenous point are credit constrained and
//!   save exactly `kMin`. Savings are clamped to `kMax`.
//! - Consumption is damped, `c ← κ_h·c_old + (1-κ_h)·c_cand`, through the
//!   shared fixed-point engine; the run stops on the sup-norm change.
//!
//! Invariants & assumptions
//! ------------------------
//! - `1 + r > 0` and `w > 0`; labor endowments are positive levels.
//! - Every sweep reads only the previous sweep's policy (Jacobi update).
//! - Final policies satisfy `c > 0`, `kMin ≤ k' ≤ kMax` and `c + k' = cash`.
//!
//! Conventions
//! -----------
//! - Policy arrays are `kNum × lNum`: rows index current capital, columns
//!   index the current labor state. Iterates flatten them in row-major order.
//!
//! Testing notes
//! -------------
//! - Unit tests check monotonicity, budget feasibility, the constraint, the
//!   Euler equation at unconstrained interior points, and error paths.
use crate::{
    config::{Parameters, Preferences},
    errors::{ModelError, ModelResult},
    fixed_point::{FixedPointMap, Iterate, iterate},
    markov::MarkovChain,
    model::{firm::Prices, grid::Grid, interpolation::interp_linear},
};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

/// PolicyFunction — optimal consumption and savings on the state space.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyFunction {
    consumption: Array2<f64>,
    next_capital: Array2<f64>,
}

impl PolicyFunction {
    /// Assemble a policy from consumption and savings arrays of equal shape.
    ///
    /// # Errors
    /// [`ModelError::ShapeMismatch`] if the shapes differ.
    pub fn new(consumption: Array2<f64>, next_capital: Array2<f64>) -> ModelResult<Self> {
        if consumption.dim() != next_capital.dim() {
            return Err(ModelError::ShapeMismatch {
                expected: consumption.dim(),
                found: next_capital.dim(),
            });
        }
        Ok(Self { consumption, next_capital })
    }

    /// Consumption `c(k, l)`.
    pub fn consumption(&self) -> ArrayView2<'_, f64> {
        self.consumption.view()
    }

    /// Next-period capital `g(k, l)`.
    pub fn next_capital(&self) -> ArrayView2<'_, f64> {
        self.next_capital.view()
    }

    /// `(kNum, lNum)`.
    pub fn dim(&self) -> (usize, usize) {
        self.consumption.dim()
    }
}

/// Cash-in-hand `w·l + (1+r)·k` on the state space.
pub fn cash_in_hand(prices: &Prices, grid: &Grid, chain: &MarkovChain) -> Array2<f64> {
    let gross = prices.gross_return();
    let (capital, labor) = (grid.points(), chain.states());
    Array2::from_shape_fn((grid.len(), chain.len()), |(i, l)| {
        prices.w * labor[l] + gross * capital[i]
    })
}

/// One Euler sweep as a [`FixedPointMap`] over flattened consumption.
struct EulerSweep<'a> {
    prices: Prices,
    preferences: Preferences,
    grid: &'a Grid,
    chain: &'a MarkovChain,
    cash: Array2<f64>,
}

impl EulerSweep<'_> {
    fn shape(&self) -> (usize, usize) {
        (self.grid.len(), self.chain.len())
    }

    fn as_policy<'x>(&self, x: &'x Iterate) -> ModelResult<ArrayView2<'x, f64>> {
        let shape = self.shape();
        x.view().into_shape(shape).map_err(|_| ModelError::ShapeMismatch {
            expected: shape,
            found: (x.len(), 1),
        })
    }

    /// Current capital levels at which each grid `k'_i` is optimal in state `l`.
    fn endogenous_grid(&self, c_old: ArrayView2<'_, f64>, l: usize) -> ModelResult<Vec<f64>> {
        let Preferences { beta, .. } = self.preferences;
        let gross = self.prices.gross_return();
        let income = self.prices.w * self.chain.states()[l];
        let probs = self.chain.transition().row(l).to_owned();
        let k = self.grid.as_slice();

        let mut k_endo = Vec::with_capacity(k.len());
        for (i, &k_next) in k.iter().enumerate() {
            let mut expected = 0.0;
            for (l_next, &p) in probs.iter().enumerate() {
                let c_next = c_old[[i, l_next]];
                if !(c_next > 0.0) {
                    return Err(ModelError::NonPositiveConsumption {
                        capital: i,
                        labor: l_next,
                        value: c_next,
                    });
                }
                expected += p * self.preferences.marginal_utility(c_next);
            }
            let rhs = beta * gross * expected;
            if !(rhs.is_finite() && rhs > 0.0) {
                return Err(ModelError::NonFiniteValue {
                    routine: "household",
                    index: i * self.chain.len() + l,
                    value: rhs,
                });
            }
            let c = self.preferences.inverse_marginal_utility(rhs);
            let k_now = (c + k_next - income) / gross;
            if let Some(&prev) = k_endo.last() {
                if !(k_now > prev) {
                    return Err(ModelError::NonMonotoneEndogenousGrid { labor: l, index: i });
                }
            }
            k_endo.push(k_now);
        }
        Ok(k_endo)
    }
}

impl FixedPointMap for EulerSweep<'_> {
    fn apply(&self, x: &Iterate) -> ModelResult<Iterate> {
        let c_old = self.as_policy(x)?;
        let (k_num, l_num) = self.shape();
        let k = self.grid.as_slice();
        let (k_min, k_max) = (self.grid.min(), self.grid.max());

        let mut c_new = Array2::<f64>::zeros((k_num, l_num));
        for l in 0..l_num {
            let k_endo = self.endogenous_grid(c_old, l)?;
            for (j, &k_now) in k.iter().enumerate() {
                let k_next = if k_now < k_endo[0] {
                    k_min
                } else {
                    interp_linear(&k_endo, k, k_now).clamp(k_min, k_max)
                };
                let c = self.cash[[j, l]] - k_next;
                if !(c > 0.0) {
                    return Err(ModelError::NonPositiveConsumption { capital: j, labor: l, value: c });
                }
                c_new[[j, l]] = c;
            }
        }
        Ok(Iterate::from_iter(c_new.iter().copied()))
    }

    fn check(&self, x0: &Iterate) -> ModelResult<()> {
        self.as_policy(x0).map(|_| ())
    }
}

/// Solve the household problem at `prices`.
///
/// Starts from `warm_start` when it has the right shape, otherwise from
/// consuming everything down to the borrowing limit (`c = cash - kMin`).
///
/// # Errors
/// - [`ModelError::InvalidInterestRate`] unless `1 + r > 0`;
///   [`ModelError::InvalidWage`] unless `w > 0`.
/// - [`ModelError::NonPositiveConsumption`] if cash-in-hand at the borrowing
///   limit is not positive, or a sweep produces non-positive consumption.
/// - [`ModelError::NonMonotoneEndogenousGrid`] and
///   [`ModelError::NonFiniteValue`] on numerical breakdown.
/// - [`ModelError::NonConvergence`] after `household_max_iter` sweeps.
pub fn solve_household(
    prices: &Prices, grid: &Grid, chain: &MarkovChain, params: &Parameters,
    warm_start: Option<&PolicyFunction>,
) -> ModelResult<PolicyFunction> {
    verify_prices(prices)?;
    let cash = cash_in_hand(prices, grid, chain);
    let k_min = grid.min();
    let k_max = grid.max();
    let shape = (grid.len(), chain.len());

    let x0 = match warm_start {
        Some(policy) if policy.dim() == shape => Iterate::from_iter(policy.consumption.iter().copied()),
        _ => Iterate::from_iter(cash.iter().map(|&m| m - k_min)),
    };
    if let Some((index, &value)) = x0.iter().enumerate().find(|(_, c)| !(**c > 0.0)) {
        return Err(ModelError::NonPositiveConsumption {
            capital: index / shape.1,
            labor: index % shape.1,
            value,
        });
    }

    let sweep = EulerSweep { prices: *prices, preferences: params.preferences, grid, chain, cash };
    let opts = params.solver.household();
    let outcome = iterate(&sweep, x0, &opts)?;
    debug!(
        r = prices.r,
        w = prices.w,
        iterations = outcome.iterations,
        last_change = outcome.last_change,
        "household policy converged"
    );

    let c_star = sweep.as_policy(&outcome.fixed_point)?;
    let next_capital = Array2::from_shape_fn(shape, |(i, l)| {
        (sweep.cash[[i, l]] - c_star[[i, l]]).clamp(k_min, k_max)
    });
    let consumption = &sweep.cash - &next_capital;
    if let Some(((i, l), &value)) = consumption.indexed_iter().find(|(_, c)| !(**c > 0.0)) {
        return Err(ModelError::NonPositiveConsumption { capital: i, labor: l, value });
    }
    Ok(PolicyFunction { consumption, next_capital })
}

fn verify_prices(prices: &Prices) -> ModelResult<()> {
    if !(prices.r.is_finite() && prices.gross_return() > 0.0) {
        return Err(ModelError::InvalidInterestRate { r: prices.r });
    }
    if !(prices.w.is_finite() && prices.w > 0.0) {
        return Err(ModelError::InvalidWage { w: prices.w });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ModelConfig, Parameters},
        errors::ErrorKind,
        markov::rouwenhorst_labor,
    };
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------
    // A small economy with βR < 1 so the policy has an interior region and a
    // constrained region, solved to tight tolerance.
    fn small_economy() -> (Parameters, Grid, MarkovChain, Prices) {
        let config = ModelConfig {
            k_num: 60,
            l_num: 5,
            k_max: 30.0,
            gamma: 2.0,
            household_damping: Some(0.0),
            household_tol: Some(1e-10),
            ..ModelConfig::default()
        };
        let params = Parameters::from_config(&config).unwrap();
        let grid = Grid::from_spec(&params.grid).unwrap();
        let chain = rouwenhorst_labor(&params.income).unwrap();
        (params, grid, chain, Prices { r: 0.03, w: 1.0 })
    }

    #[test]
    // Purpose
    // -------
    // Savings are non-decreasing in current capital for every labor state.
    fn next_capital_is_non_decreasing_in_capital() {
        // Arrange
        let (params, grid, chain, prices) = small_economy();

        // Act
        let policy = solve_household(&prices, &grid, &chain, &params, None).unwrap();

        // Assert
        for column in policy.next_capital().columns() {
            assert!(column.windows(2).into_iter().all(|w| w[1] >= w[0] - 1e-12));
        }
    }

    #[test]
    // Purpose
    // -------
    // Budget feasibility and the constraint hold at every grid point.
    //
    // Expect
    // ------
    // - `c > 0`, `kMin ≤ k' ≤ kMax`, `c + k' = cash` up to rounding.
    fn policy_is_budget_feasible_and_respects_constraint() {
        let (params, grid, chain, prices) = small_economy();

        let policy = solve_household(&prices, &grid, &chain, &params, None).unwrap();

        let cash = cash_in_hand(&prices, &grid, &chain);
        for ((idx, &c), &kp) in policy.consumption().indexed_iter().zip(policy.next_capital()) {
            assert!(c > 0.0);
            assert!(kp >= grid.min() && kp <= grid.max());
            assert_relative_eq!(c + kp, cash[idx], max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // The poorest, lowest-income household is credit constrained, and at
    // interior points the Euler equation holds up to interpolation error.
    fn constrained_at_bottom_and_euler_holds_inside() {
        let (params, grid, chain, prices) = small_economy();
        let prefs = params.preferences;

        let policy = solve_household(&prices, &grid, &chain, &params, None).unwrap();

        assert_eq!(policy.next_capital()[[0, 0]], grid.min());
        // A mid-grid, mid-income point where savings land inside the grid.
        let (i, l) = (20, 2);
        let kp = policy.next_capital()[[i, l]];
        assert!(kp > grid.min() && kp < grid.max());
        let k = grid.as_slice();
        let next_c: Vec<f64> = (0..chain.len())
            .map(|l2| {
                let column = policy.consumption().column(l2).to_vec();
                interp_linear(k, &column, kp)
            })
            .collect();
        let expected: f64 = chain
            .transition()
            .row(l)
            .iter()
            .zip(&next_c)
            .map(|(p, c)| p * prefs.marginal_utility(*c))
            .sum();
        let lhs = prefs.marginal_utility(policy.consumption()[[i, l]]);
        assert_relative_eq!(lhs, prefs.beta * prices.gross_return() * expected, max_relative = 1e-2);
    }

    #[test]
    fn warm_start_reaches_same_policy() {
        let (params, grid, chain, prices) = small_economy();

        let cold = solve_household(&prices, &grid, &chain, &params, None).unwrap();
        let warm = solve_household(&prices, &grid, &chain, &params, Some(&cold)).unwrap();

        for (a, b) in cold.consumption().iter().zip(warm.consumption()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-8);
        }
    }

    #[test]
    fn rejects_invalid_prices() {
        let (params, grid, chain, _) = small_economy();

        let bad_r = solve_household(&Prices { r: -1.5, w: 1.0 }, &grid, &chain, &params, None);
        let bad_w = solve_household(&Prices { r: 0.02, w: 0.0 }, &grid, &chain, &params, None);

        assert!(matches!(bad_r, Err(ModelError::InvalidInterestRate { .. })));
        assert!(matches!(bad_w, Err(ModelError::InvalidWage { .. })));
    }

    #[test]
    fn cash_in_hand_combines_wage_income_and_gross_capital() {
        let (_, grid, chain, _) = small_economy();
        let prices = Prices { r: 0.05, w: 1.2 };

        let cash = cash_in_hand(&prices, &grid, &chain);

        assert_eq!(cash.dim(), (grid.len(), chain.len()));
        let (i, l) = (7, 3);
        let expected = 1.2 * chain.states()[l] + 1.05 * grid.as_slice()[i];
        assert_relative_eq!(cash[[i, l]], expected, max_relative = 1e-14);
    }

    // -------------------------------------------------------------------------
    // Numerical breakdown
    // -------------------------------------------------------------------------
    // A warm start is used verbatim as the first Jacobi iterate, so a
    // malformed one drives each failure mode of the Euler sweep directly.
    fn warm_start_from(
        grid: &Grid, chain: &MarkovChain, consumption: impl Fn(usize, usize) -> f64,
    ) -> PolicyFunction {
        let shape = (grid.len(), chain.len());
        let consumption = Array2::from_shape_fn(shape, |(i, l)| consumption(i, l));
        PolicyFunction::new(consumption, Array2::zeros(shape)).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A starting policy with zero consumption is rejected before any sweep.
    //
    // Expect
    // ------
    // - `NonPositiveConsumption` at the offending state, classified as
    //   numerical instability.
    fn zero_consumption_start_is_numerical_instability() {
        // Arrange
        let (params, grid, chain, prices) = small_economy();
        let start = warm_start_from(&grid, &chain, |i, l| if (i, l) == (3, 1) { 0.0 } else { 1.0 });

        // Act
        let err = solve_household(&prices, &grid, &chain, &params, Some(&start)).unwrap_err();

        // Assert
        assert_eq!(err, ModelError::NonPositiveConsumption { capital: 3, labor: 1, value: 0.0 });
        assert_eq!(err.kind(), ErrorKind::NumericalInstability);
    }

    #[test]
    // Purpose
    // -------
    // Consumption that falls steeply in capital inverts to an endogenous grid
    // that is not increasing, which the sweep refuses to interpolate on.
    //
    // Given
    // -----
    // - `c(k_i, l) = 100 / (1 + i)²`: the inverted Euler consumption drops by
    //   far more than one grid step between the first two points.
    //
    // Expect
    // ------
    // - `NonMonotoneEndogenousGrid` in the first labor state at index 1.
    fn decreasing_consumption_breaks_endogenous_grid() {
        let (params, grid, chain, prices) = small_economy();
        let start = warm_start_from(&grid, &chain, |i, _| 100.0 / ((1 + i) as f64).powi(2));

        let err = solve_household(&prices, &grid, &chain, &params, Some(&start)).unwrap_err();

        assert_eq!(err, ModelError::NonMonotoneEndogenousGrid { labor: 0, index: 1 });
        assert_eq!(err.kind(), ErrorKind::NumericalInstability);
    }

    #[test]
    // Purpose
    // -------
    // Marginal utility overflowing at vanishing consumption is reported as a
    // non-finite Euler term rather than propagating infinities.
    fn overflowing_marginal_utility_is_non_finite() {
        let (params, grid, chain, prices) = small_economy();
        let start = warm_start_from(&grid, &chain, |_, _| 1e-200);

        let err = solve_household(&prices, &grid, &chain, &params, Some(&start)).unwrap_err();

        assert!(matches!(err, ModelError::NonFiniteValue { routine: "household", index: 0, .. }));
        assert_eq!(err.kind(), ErrorKind::NumericalInstability);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let (mut params, grid, chain, prices) = small_economy();
        params.solver.household_max_iter = 2;

        let err = solve_household(&prices, &grid, &chain, &params, None).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NonConvergence);
    }
}
