//! Model parameters — validated, immutable configuration of the economy.
//!
//! Purpose
//! -------
//! Replace a loose dictionary of named numbers with typed, validated
//! records that every component receives by reference. Parameters are
//! grouped by concern (preferences, technology, income process, capital
//! grid, outer iteration, inner iterations) and can also be built from the
//! flat, serde-backed [`ModelConfig`] that carries the conventional key names
//! `{alpha, beta, gamma, mu, rho, sigma, kMin, kMax, kNum, lNum, kappa, tol,
//! maxIter}`.
//!
//! Key behaviors
//! -------------
//! - Each group has a `new` constructor that enforces its domain and returns
//!   `ModelError::Invalid*` values instead of panicking.
//! - [`Parameters::from_config`] validates a [`ModelConfig`] field by field
//!   and fills optional inner-loop settings from documented defaults.
//! - [`ModelConfig::from_json`] parses the flat configuration from JSON.
//!
//! Invariants & assumptions
//! ------------------------
//! - `0 < β < 1`, `γ > 0`, `0 < α < 1`, `0 ≤ δ ≤ 1`.
//! - `|ρ| < 1`, `σ ≥ 0`, `μ` finite, at least two income states.
//! - `0 ≤ kMin < kMax`, at least two grid points, curvature `≥ 1`.
//! - `0 < κ < 1`, `tol > 0`, `maxIter > 0`.
//!
//! Conventions
//! -----------
//! - `delta` (depreciation) defaults to 0, which makes the interest rate the
//!   gross marginal product of capital.
//! - The household damping defaults to `kappa` and the household tolerance
//!   to `tol` when the configuration leaves them unset.
//!
//! Testing notes
//! -------------
//! - Unit tests check each group's rejection paths, the JSON key names, and
//!   the defaults filled by `from_config`.
use crate::{
    config::options::{
        DEFAULT_DISTRIBUTION_MAX_ITER, DEFAULT_DISTRIBUTION_TOL, DEFAULT_HOUSEHOLD_MAX_ITER,
        SolverOptions,
    },
    errors::{ModelError, ModelResult},
    fixed_point::validation::{verify_max_iter, verify_tol},
};
use serde::{Deserialize, Serialize};

/// Household preferences: discount factor `β` and CRRA coefficient `γ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    pub beta: f64,
    pub gamma: f64,
}

impl Preferences {
    /// # Errors
    /// - [`ModelError::InvalidDiscountFactor`] unless `0 < β < 1`.
    /// - [`ModelError::InvalidRiskAversion`] unless `γ` is finite and `> 0`.
    pub fn new(beta: f64, gamma: f64) -> ModelResult<Self> {
        if !(beta > 0.0 && beta < 1.0) {
            return Err(ModelError::InvalidDiscountFactor { beta });
        }
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(ModelError::InvalidRiskAversion { gamma });
        }
        Ok(Self { beta, gamma })
    }

    /// Marginal utility `u'(c) = c^{-γ}`.
    #[inline]
    pub fn marginal_utility(&self, c: f64) -> f64 {
        c.powf(-self.gamma)
    }

    /// Inverse marginal utility `(u')^{-1}(m) = m^{-1/γ}`.
    #[inline]
    pub fn inverse_marginal_utility(&self, m: f64) -> f64 {
        m.powf(-1.0 / self.gamma)
    }
}

/// Firm technology: capital share `α` and depreciation `δ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Technology {
    pub alpha: f64,
    pub delta: f64,
}

impl Technology {
    /// # Errors
    /// - [`ModelError::InvalidCapitalShare`] unless `0 < α < 1`.
    /// - [`ModelError::InvalidDepreciation`] unless `0 ≤ δ ≤ 1`.
    pub fn new(alpha: f64, delta: f64) -> ModelResult<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ModelError::InvalidCapitalShare { alpha });
        }
        if !(0.0..=1.0).contains(&delta) {
            return Err(ModelError::InvalidDepreciation { delta });
        }
        Ok(Self { alpha, delta })
    }
}

/// Log labor-endowment process `x_t = (1-ρ)μ + ρ x_{t-1} + ε_t`, `ε ~ N(0, σ²)`,
/// discretized on `n_states` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeProcess {
    pub mu: f64,
    pub rho: f64,
    pub sigma: f64,
    pub n_states: usize,
}

impl IncomeProcess {
    /// # Errors
    /// - [`ModelError::InvalidMean`] if `μ` is not finite.
    /// - [`ModelError::InvalidPersistence`] unless `|ρ| < 1`.
    /// - [`ModelError::InvalidShockStd`] unless `σ` is finite and `≥ 0`.
    /// - [`ModelError::InvalidStateCount`] if `n_states < 2`.
    pub fn new(mu: f64, rho: f64, sigma: f64, n_states: usize) -> ModelResult<Self> {
        if !mu.is_finite() {
            return Err(ModelError::InvalidMean { mu });
        }
        if !(rho.abs() < 1.0) {
            return Err(ModelError::InvalidPersistence { rho });
        }
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(ModelError::InvalidShockStd { sigma });
        }
        if n_states < 2 {
            return Err(ModelError::InvalidStateCount { n: n_states });
        }
        Ok(Self { mu, rho, sigma, n_states })
    }
}

/// Capital grid specification.
///
/// `curvature = 1` is a uniform grid; larger values cluster points near
/// `k_min`, where the policy has its kink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub k_min: f64,
    pub k_max: f64,
    pub k_num: usize,
    pub curvature: f64,
}

impl GridSpec {
    /// # Errors
    /// - [`ModelError::InvalidGridBounds`] unless `0 ≤ k_min < k_max`, both finite.
    /// - [`ModelError::InvalidGridSize`] if `k_num < 2`.
    /// - [`ModelError::InvalidGridCurvature`] unless `curvature` is finite and `≥ 1`.
    pub fn new(k_min: f64, k_max: f64, k_num: usize, curvature: f64) -> ModelResult<Self> {
        if !k_min.is_finite() || !k_max.is_finite() {
            return Err(ModelError::InvalidGridBounds {
                min: k_min,
                max: k_max,
                reason: "Bounds must be finite.",
            });
        }
        if k_min < 0.0 {
            return Err(ModelError::InvalidGridBounds {
                min: k_min,
                max: k_max,
                reason: "Borrowing limit must be >= 0.",
            });
        }
        if k_min >= k_max {
            return Err(ModelError::InvalidGridBounds {
                min: k_min,
                max: k_max,
                reason: "Lower bound must be below the upper bound.",
            });
        }
        if k_num < 2 {
            return Err(ModelError::InvalidGridSize { n: k_num });
        }
        if !(curvature.is_finite() && curvature >= 1.0) {
            return Err(ModelError::InvalidGridCurvature { curvature });
        }
        Ok(Self { k_min, k_max, k_num, curvature })
    }
}

/// Outer capital-market loop: damping `κ`, tolerance and iteration cap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Iteration {
    pub kappa: f64,
    pub tol: f64,
    pub max_iter: usize,
}

impl Iteration {
    /// # Errors
    /// - [`ModelError::InvalidDamping`] unless `0 < κ < 1`.
    /// - [`ModelError::InvalidTolerance`] / [`ModelError::InvalidMaxIter`] as
    ///   in the fixed-point validators.
    pub fn new(kappa: f64, tol: f64, max_iter: usize) -> ModelResult<Self> {
        if !(kappa > 0.0 && kappa < 1.0) {
            return Err(ModelError::InvalidDamping {
                kappa,
                reason: "Outer-loop damping must lie in (0, 1).",
            });
        }
        verify_tol(tol)?;
        verify_max_iter(max_iter)?;
        Ok(Self { kappa, tol, max_iter })
    }
}

/// Parameters — the full, validated model configuration.
///
/// Constructed via [`Parameters::new`] from already-validated groups or via
/// [`Parameters::from_config`] from a flat [`ModelConfig`]. No component
/// mutates it; everything downstream borrows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub preferences: Preferences,
    pub technology: Technology,
    pub income: IncomeProcess,
    pub grid: GridSpec,
    pub iteration: Iteration,
    pub solver: SolverOptions,
}

impl Parameters {
    /// Bundle already-validated groups. No cross-field checks are needed.
    pub fn new(
        preferences: Preferences, technology: Technology, income: IncomeProcess, grid: GridSpec,
        iteration: Iteration, solver: SolverOptions,
    ) -> Self {
        Self { preferences, technology, income, grid, iteration, solver }
    }

    /// Validate a flat [`ModelConfig`].
    ///
    /// # Errors
    /// The first validation failure among the groups, in the order
    /// preferences, technology, income, grid, iteration, solver options.
    pub fn from_config(config: &ModelConfig) -> ModelResult<Self> {
        let preferences = Preferences::new(config.beta, config.gamma)?;
        let technology = Technology::new(config.alpha, config.delta)?;
        let income = IncomeProcess::new(config.mu, config.rho, config.sigma, config.l_num)?;
        let grid = GridSpec::new(config.k_min, config.k_max, config.k_num, config.grid_curvature)?;
        let iteration = Iteration::new(config.kappa, config.tol, config.max_iter)?;
        let solver = SolverOptions::new(
            config.household_damping.unwrap_or(config.kappa),
            config.household_tol.unwrap_or(config.tol),
            config.household_max_iter,
            config.distribution_tol,
            config.distribution_max_iter,
            config.verbose,
        )?;
        Ok(Self::new(preferences, technology, income, grid, iteration, solver))
    }
}

impl Default for Parameters {
    fn default() -> Self {
        // The default config is inside every domain.
        Parameters::from_config(&ModelConfig::default())
            .unwrap_or_else(|err| unreachable!("default configuration is invalid: {err}"))
    }
}

fn default_curvature() -> f64 {
    1.0
}

fn default_household_max_iter() -> usize {
    DEFAULT_HOUSEHOLD_MAX_ITER
}

fn default_distribution_tol() -> f64 {
    DEFAULT_DISTRIBUTION_TOL
}

fn default_distribution_max_iter() -> usize {
    DEFAULT_DISTRIBUTION_MAX_ITER
}

/// ModelConfig — flat, serializable parameter set.
///
/// Required keys mirror the conventional notebook names; the remaining keys
/// are optional and fall back to the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModelConfig {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub mu: f64,
    pub rho: f64,
    pub sigma: f64,
    pub k_min: f64,
    pub k_max: f64,
    pub k_num: usize,
    pub l_num: usize,
    pub kappa: f64,
    pub tol: f64,
    pub max_iter: usize,
    #[serde(default)]
    pub delta: f64,
    #[serde(default = "default_curvature")]
    pub grid_curvature: f64,
    #[serde(default)]
    pub household_damping: Option<f64>,
    #[serde(default)]
    pub household_tol: Option<f64>,
    #[serde(default = "default_household_max_iter")]
    pub household_max_iter: usize,
    #[serde(default = "default_distribution_tol")]
    pub distribution_tol: f64,
    #[serde(default = "default_distribution_max_iter")]
    pub distribution_max_iter: usize,
    #[serde(default)]
    pub verbose: bool,
}

impl ModelConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    /// [`ModelError::InvalidConfig`] on malformed JSON, a missing required
    /// key, or an unknown key. Domain checks happen later, in
    /// [`Parameters::from_config`].
    pub fn from_json(text: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.96,
            gamma: 1.0,
            mu: 0.0,
            rho: 0.53,
            sigma: 0.296,
            k_min: 0.0,
            k_max: 40.0,
            k_num: 100,
            l_num: 9,
            kappa: 0.2,
            tol: 1e-6,
            max_iter: 500,
            delta: 0.0,
            grid_curvature: default_curvature(),
            household_damping: None,
            household_tol: None,
            household_max_iter: DEFAULT_HOUSEHOLD_MAX_ITER,
            distribution_tol: DEFAULT_DISTRIBUTION_TOL,
            distribution_max_iter: DEFAULT_DISTRIBUTION_MAX_ITER,
            verbose: false,
        }
    }
}
