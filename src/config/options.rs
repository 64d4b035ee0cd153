//! Inner-loop options — tolerances and caps for the household and
//! stationary-distribution iterations.
//!
//! Purpose
//! -------
//! Keep the knobs of the nested iterations in one validated carrier so the
//! equilibrium loop can hand explicit [`IterationOptions`] to each routine
//! instead of threading loose numbers through call sites.
//!
//! Key behaviors
//! -------------
//! - [`SolverOptions::new`] validates every field with the fixed-point
//!   validators (damping in `[0, 1)`, positive finite tolerances, non-zero caps).
//! - [`SolverOptions::household`], [`SolverOptions::distribution`] and
//!   [`SolverOptions::labor_distribution`] build the per-routine
//!   [`IterationOptions`].
//!
//! Conventions
//! -----------
//! - Stationary distributions are iterated as lazy chains (damping
//!   [`STATIONARY_DAMPING`]) so periodic labor chains still converge; the
//!   fixed point is unchanged by the laziness.
use crate::{
    errors::ModelResult,
    fixed_point::{
        IterationOptions,
        validation::{verify_damping, verify_max_iter, verify_tol},
    },
};

/// Weight kept on the previous distribution in stationary iterations.
pub const STATIONARY_DAMPING: f64 = 0.5;

/// Default sup-norm tolerance for stationary distributions.
pub const DEFAULT_DISTRIBUTION_TOL: f64 = 1e-10;

/// Default cap on household Euler sweeps.
pub const DEFAULT_HOUSEHOLD_MAX_ITER: usize = 10_000;

/// Default cap on distribution sweeps.
pub const DEFAULT_DISTRIBUTION_MAX_ITER: usize = 100_000;

/// SolverOptions — configuration of the inner iterations.
///
/// Fields
/// ------
/// - `household_damping`: `f64`
///   Weight `κ_h` on the previous consumption policy, in `[0, 1)`.
/// - `household_tol`: `f64`
///   Sup-norm tolerance on the consumption change between sweeps.
/// - `household_max_iter`: `usize`
///   Cap on household sweeps.
/// - `distribution_tol`: `f64`
///   Sup-norm tolerance on the mass change between sweeps.
/// - `distribution_max_iter`: `usize`
///   Cap on distribution sweeps.
/// - `verbose`: `bool`
///   Attach argmin's terminal observer to every run (feature `obs_slog`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    pub household_damping: f64,
    pub household_tol: f64,
    pub household_max_iter: usize,
    pub distribution_tol: f64,
    pub distribution_max_iter: usize,
    pub verbose: bool,
}

impl SolverOptions {
    /// Construct validated inner-loop options.
    ///
    /// # Errors
    /// - `ModelError::InvalidDamping` unless `0 ≤ household_damping < 1`.
    /// - `ModelError::InvalidTolerance` for a non-finite or non-positive tolerance.
    /// - `ModelError::InvalidMaxIter` for a zero cap.
    pub fn new(
        household_damping: f64, household_tol: f64, household_max_iter: usize,
        distribution_tol: f64, distribution_max_iter: usize, verbose: bool,
    ) -> ModelResult<Self> {
        verify_damping(household_damping)?;
        verify_tol(household_tol)?;
        verify_max_iter(household_max_iter)?;
        verify_tol(distribution_tol)?;
        verify_max_iter(distribution_max_iter)?;
        Ok(Self {
            household_damping,
            household_tol,
            household_max_iter,
            distribution_tol,
            distribution_max_iter,
            verbose,
        })
    }

    /// Options for the household Euler iteration.
    pub fn household(&self) -> IterationOptions {
        IterationOptions {
            damping: self.household_damping,
            tol: self.household_tol,
            max_iter: self.household_max_iter,
            verbose: self.verbose,
            routine: "household",
        }
    }

    /// Options for the joint `(capital, labor)` stationary distribution.
    pub fn distribution(&self) -> IterationOptions {
        IterationOptions {
            damping: STATIONARY_DAMPING,
            tol: self.distribution_tol,
            max_iter: self.distribution_max_iter,
            verbose: self.verbose,
            routine: "distribution",
        }
    }

    /// Options for the labor-only stationary distribution.
    pub fn labor_distribution(&self) -> IterationOptions {
        IterationOptions { routine: "labor distribution", ..self.distribution() }
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            household_damping: 0.2,
            household_tol: 1e-6,
            household_max_iter: DEFAULT_HOUSEHOLD_MAX_ITER,
            distribution_tol: DEFAULT_DISTRIBUTION_TOL,
            distribution_max_iter: DEFAULT_DISTRIBUTION_MAX_ITER,
            verbose: false,
        }
    }
}
