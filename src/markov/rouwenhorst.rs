//! Rouwenhorst discretization of a Gaussian AR(1) process.
//!
//! For `x_t = (1-ρ)μ + ρ x_{t-1} + ε_t`, `ε_t ~ N(0, σ²)`, the N-state chain
//! places states evenly on `[μ - f, μ + f]` with
//! `f = sqrt(N-1) · σ / sqrt(1-ρ²)` and builds the transition matrix from the
//! 2-state matrix `[[p, 1-p], [1-p, p]]`, `p = (1+ρ)/2`, by repeated
//! block embedding. The construction matches the unconditional mean,
//! variance and first-order autocorrelation of the process exactly, and its
//! stationary distribution is `Binomial(N-1, 1/2)` over the state indices.
use crate::{config::IncomeProcess, errors::ModelResult, markov::chain::MarkovChain};
use ndarray::{Array1, Array2, array, s};

/// Discretize the AR(1) process into an `n`-state [`MarkovChain`].
///
/// # Errors
/// `InvalidParameter`-kind errors if `n < 2`, `|ρ| ≥ 1`, `σ < 0`, or any
/// input is non-finite (see [`IncomeProcess::new`]).
pub fn rouwenhorst(n: usize, mu: f64, rho: f64, sigma: f64) -> ModelResult<MarkovChain> {
    let process = IncomeProcess::new(mu, rho, sigma, n)?;
    let transition = transition_matrix(process.n_states, process.rho);
    let half_width = ((n - 1) as f64).sqrt() * sigma / (1.0 - rho * rho).sqrt();
    let states = Array1::linspace(mu - half_width, mu + half_width, n);
    MarkovChain::new(states, transition)
}

/// Chain of labor endowment *levels* `exp(x)` for a log-endowment process.
///
/// Endowments are strictly positive, so cash-in-hand stays positive at the
/// borrowing limit even when the log states are negative.
pub fn rouwenhorst_labor(income: &IncomeProcess) -> ModelResult<MarkovChain> {
    rouwenhorst(income.n_states, income.mu, income.rho, income.sigma)?.map_states(f64::exp)
}

fn transition_matrix(n: usize, rho: f64) -> Array2<f64> {
    let p = 0.5 * (1.0 + rho);
    let q = 1.0 - p;
    let mut theta = array![[p, q], [q, p]];
    for size in 3..=n {
        let prev = size - 1;
        let mut next = Array2::<f64>::zeros((size, size));
        next.slice_mut(s![..prev, ..prev]).scaled_add(p, &theta);
        next.slice_mut(s![..prev, 1..]).scaled_add(q, &theta);
        next.slice_mut(s![1.., ..prev]).scaled_add(q, &theta);
        next.slice_mut(s![1.., 1..]).scaled_add(p, &theta);
        next.slice_mut(s![1..prev, ..]).mapv_inplace(|v| 0.5 * v);
        theta = next;
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::{ErrorKind, ModelError},
        fixed_point::IterationOptions,
    };
    use approx::assert_relative_eq;
    use statrs::distribution::{Binomial, Discrete};

    fn stationary_opts() -> IterationOptions {
        IterationOptions::new(0.5, 1e-13, 100_000, false, "labor distribution").unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Every generated matrix is row-stochastic with entries in [0, 1].
    //
    // Given
    // -----
    // - N = 2..=25 over a spread of persistences, including negative ρ.
    //
    // Expect
    // ------
    // - Construction succeeds (the chain validator enforces the invariants)
    //   and each row sums to 1 within 1e-12.
    fn transition_is_row_stochastic_for_all_sizes() {
        for n in 2..=25 {
            for &rho in &[-0.9, -0.3, 0.0, 0.53, 0.95, 0.999] {
                // Act
                let chain = rouwenhorst(n, 0.0, rho, 0.2).unwrap();

                // Assert
                assert_eq!(chain.transition().dim(), (n, n));
                for row in chain.transition().outer_iter() {
                    assert!(row.iter().all(|&v| (0.0..=1.0).contains(&v)));
                    assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn two_states_with_half_persistence() {
        let chain = rouwenhorst(2, 0.0, 0.5, 1.0).unwrap();

        let expected = array![[0.75, 0.25], [0.25, 0.75]];
        for (a, b) in chain.transition().iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
        let f = 1.0 / 0.75_f64.sqrt();
        assert_relative_eq!(chain.states()[0], -f, epsilon = 1e-14);
        assert_relative_eq!(chain.states()[1], f, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // The 3-state middle row is the halved block sum
    // `[p·q, p² + q², p·q]`.
    fn three_state_middle_row_is_halved_block_sum() {
        let rho = 0.4;
        let p = 0.7;
        let q = 0.3;

        let chain = rouwenhorst(3, 1.0, rho, 0.5).unwrap();

        let row = chain.transition().row(1).to_owned();
        assert_relative_eq!(row[0], p * q, epsilon = 1e-15);
        assert_relative_eq!(row[1], p * p + q * q, epsilon = 1e-15);
        assert_relative_eq!(row[2], p * q, epsilon = 1e-15);
        assert_relative_eq!(chain.transition()[[0, 2]], q * q, epsilon = 1e-15);
        assert_relative_eq!(chain.states()[1], 1.0, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Stationary law over state indices is Binomial(N-1, 1/2), so the chain
    // reproduces the unconditional mean μ and variance σ²/(1-ρ²).
    //
    // Given
    // -----
    // - N = 9, μ = 0.3, ρ = 0.53, σ = 0.296.
    //
    // Expect
    // ------
    // - π matches the binomial pmf within 1e-9.
    // - Mean and variance under π match the AR(1) moments.
    fn stationary_law_is_binomial() {
        // Arrange
        let (n, mu, rho, sigma) = (9usize, 0.3, 0.53, 0.296);
        let chain = rouwenhorst(n, mu, rho, sigma).unwrap();
        let binomial = Binomial::new(0.5, (n - 1) as u64).unwrap();

        // Act
        let pi = chain.stationary_distribution(&stationary_opts()).unwrap();

        // Assert
        for (i, &mass) in pi.iter().enumerate() {
            assert_relative_eq!(mass, binomial.pmf(i as u64), epsilon = 1e-9);
        }
        let mean = chain.mean(pi.view()).unwrap();
        let variance: f64 =
            pi.iter().zip(chain.states().iter()).map(|(w, x)| w * (x - mean).powi(2)).sum();
        assert_relative_eq!(mean, mu, epsilon = 1e-9);
        assert_relative_eq!(variance, sigma * sigma / (1.0 - rho * rho), epsilon = 1e-9);
    }

    #[test]
    fn zero_shock_collapses_states_to_mean() {
        let chain = rouwenhorst(5, 2.0, 0.9, 0.0).unwrap();

        assert!(chain.states().iter().all(|&x| x == 2.0));
    }

    #[test]
    fn labor_chain_is_exponential_of_log_states() {
        let income = IncomeProcess::new(0.0, 0.53, 0.296, 9).unwrap();

        let logs = rouwenhorst(9, 0.0, 0.53, 0.296).unwrap();
        let levels = rouwenhorst_labor(&income).unwrap();

        assert!(levels.states().iter().all(|&l| l > 0.0));
        for (l, x) in levels.states().iter().zip(logs.states().iter()) {
            assert_relative_eq!(*l, x.exp(), max_relative = 1e-15);
        }
        assert_relative_eq!(levels.states()[4], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn invalid_inputs_are_parameter_errors() {
        let cases = [
            rouwenhorst(1, 0.0, 0.5, 0.1),
            rouwenhorst(5, 0.0, 1.0, 0.1),
            rouwenhorst(5, 0.0, -1.2, 0.1),
            rouwenhorst(5, 0.0, 0.5, -0.1),
            rouwenhorst(5, f64::NAN, 0.5, 0.1),
            rouwenhorst(5, 0.0, f64::NAN, 0.1),
        ];

        for case in cases {
            assert_eq!(case.unwrap_err().kind(), ErrorKind::InvalidParameter);
        }
        assert!(matches!(rouwenhorst(0, 0.0, 0.5, 0.1), Err(ModelError::InvalidStateCount { n: 0 })));
    }
}
