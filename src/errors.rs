//! errors — crate-wide error surface for the Aiyagari solver stack.
//!
//! Purpose
//! -------
//! Provide a single error enum, [`ModelError`], and result alias,
//! [`ModelResult`], shared by the Markov discretizer, firm pricing, the
//! household and distribution solvers, the equilibrium loop, and the generic
//! fixed-point engine. Every variant belongs to exactly one coarse
//! [`ErrorKind`] so callers can branch on the failure class without matching
//! individual payloads.
//!
//! Key behaviors
//! -------------
//! - Classify failures as `InvalidParameter` (bad input domain),
//!   `NonConvergence` (iteration cap reached) or `NumericalInstability`
//!   (NaN/Inf or degenerate intermediate values).
//! - Normalize `argmin` backend errors into [`ModelError`] values. Errors
//!   raised by our own fixed-point maps travel through `argmin` as
//!   `anyhow`-boxed values and are recovered by downcasting.
//! - Convert configuration parse failures (`serde_json`) into
//!   [`ModelError::InvalidConfig`].
//! - Convert into Python `ValueError`/`RuntimeError` when the
//!   `python-bindings` feature is enabled.
//!
//! Conventions
//! -----------
//! - Indices are 0-based. Two-dimensional indices are `(capital, labor)`.
//! - `routine` payloads are short static names of the iteration that failed
//!   (e.g. `"household"`, `"distribution"`, `"equilibrium"`).
//!
//! Testing notes
//! -------------
//! - Unit tests check the kind classification, the `Display` payloads and
//!   the round trip of a [`ModelError`] through `argmin::core::Error`.
use argmin::core::{ArgminError, Error};

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyRuntimeError, PyValueError},
};

/// Crate-wide result alias.
pub type ModelResult<T> = Result<T, ModelError>;

/// Coarse failure class of a [`ModelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    NonConvergence,
    NumericalInstability,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Markov chain ----
    /// Discretization needs at least two states.
    InvalidStateCount { n: usize },
    /// AR(1) persistence must satisfy |rho| < 1.
    InvalidPersistence { rho: f64 },
    /// Shock standard deviation must be finite and >= 0.
    InvalidShockStd { sigma: f64 },
    /// AR(1) mean must be finite.
    InvalidMean { mu: f64 },
    /// State vector and transition matrix disagree in size.
    ChainShapeMismatch { states: usize, rows: usize, cols: usize },
    /// A transition row has an entry outside [0, 1] or does not sum to 1.
    InvalidTransitionRow { row: usize, value: f64, reason: &'static str },
    /// Chain state values must be finite and sorted.
    InvalidChainState { index: usize, value: f64, reason: &'static str },

    // ---- Preferences / technology ----
    /// Discount factor must lie in (0, 1).
    InvalidDiscountFactor { beta: f64 },
    /// Relative risk aversion must be finite and > 0.
    InvalidRiskAversion { gamma: f64 },
    /// Capital share must lie in (0, 1).
    InvalidCapitalShare { alpha: f64 },
    /// Depreciation must lie in [0, 1].
    InvalidDepreciation { delta: f64 },
    /// Aggregate capital or labor must be finite and > 0.
    InvalidAggregate { name: &'static str, value: f64 },
    /// Gross return 1 + r must be positive.
    InvalidInterestRate { r: f64 },
    /// Wage must be finite and > 0.
    InvalidWage { w: f64 },

    // ---- Grid ----
    /// Grid bounds must be finite with 0 <= min < max.
    InvalidGridBounds { min: f64, max: f64, reason: &'static str },
    /// Grid needs at least two points.
    InvalidGridSize { n: usize },
    /// Grid curvature must be finite and >= 1.
    InvalidGridCurvature { curvature: f64 },

    // ---- Iteration options ----
    /// Damping coefficient must lie in [0, 1) (or (0, 1) for the outer loop).
    InvalidDamping { kappa: f64, reason: &'static str },
    /// Tolerance must be finite and > 0.
    InvalidTolerance { tol: f64, reason: &'static str },
    /// Maximum iterations must be > 0.
    InvalidMaxIter { max_iter: usize, reason: &'static str },
    /// Initial iterate is empty, mis-sized, or non-finite.
    InvalidInitialGuess { index: usize, value: f64, reason: &'static str },
    /// Array shapes do not match the state space.
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    /// Configuration could not be parsed.
    InvalidConfig { text: String },

    // ---- Convergence ----
    /// Iteration cap reached before the tolerance was met.
    NonConvergence { routine: &'static str, iterations: usize, last_change: f64, tol: f64 },

    // ---- Numerical ----
    /// A NaN/Inf appeared mid-iteration.
    NonFiniteValue { routine: &'static str, index: usize, value: f64 },
    /// Consumption or marginal utility must stay strictly positive.
    NonPositiveConsumption { capital: usize, labor: usize, value: f64 },
    /// Endogenous grid points must be strictly increasing.
    NonMonotoneEndogenousGrid { labor: usize, index: usize },
    /// Distribution mass vanished or became negative.
    DegenerateDistribution { total: f64 },

    // ---- Argmin ----
    /// Wrapper for argmin errors that have no model-level counterpart.
    BackendError { text: String },
}

impl ModelError {
    /// Failure class used by callers that do not care about payloads.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::NonConvergence { .. } => ErrorKind::NonConvergence,
            ModelError::NonFiniteValue { .. }
            | ModelError::NonPositiveConsumption { .. }
            | ModelError::NonMonotoneEndogenousGrid { .. }
            | ModelError::DegenerateDistribution { .. }
            | ModelError::BackendError { .. } => ErrorKind::NumericalInstability,
            _ => ErrorKind::InvalidParameter,
        }
    }
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Markov chain ----
            ModelError::InvalidStateCount { n } => {
                write!(f, "Markov chain needs at least 2 states; got {n}")
            }
            ModelError::InvalidPersistence { rho } => {
                write!(f, "AR(1) persistence must be finite with |rho| < 1; got {rho}")
            }
            ModelError::InvalidShockStd { sigma } => {
                write!(f, "Shock standard deviation must be finite and >= 0; got {sigma}")
            }
            ModelError::InvalidMean { mu } => {
                write!(f, "AR(1) mean must be finite; got {mu}")
            }
            ModelError::ChainShapeMismatch { states, rows, cols } => {
                write!(
                    f,
                    "Transition matrix must be {states}x{states} to match the states; got {rows}x{cols}"
                )
            }
            ModelError::InvalidTransitionRow { row, value, reason } => {
                write!(f, "Invalid transition row {row} (value {value}): {reason}")
            }
            ModelError::InvalidChainState { index, value, reason } => {
                write!(f, "Invalid chain state at index {index} ({value}): {reason}")
            }

            // ---- Preferences / technology ----
            ModelError::InvalidDiscountFactor { beta } => {
                write!(f, "Discount factor must lie in (0, 1); got {beta}")
            }
            ModelError::InvalidRiskAversion { gamma } => {
                write!(f, "Risk aversion must be finite and > 0; got {gamma}")
            }
            ModelError::InvalidCapitalShare { alpha } => {
                write!(f, "Capital share must lie in (0, 1); got {alpha}")
            }
            ModelError::InvalidDepreciation { delta } => {
                write!(f, "Depreciation must lie in [0, 1]; got {delta}")
            }
            ModelError::InvalidAggregate { name, value } => {
                write!(f, "Aggregate {name} must be finite and > 0; got {value}")
            }
            ModelError::InvalidInterestRate { r } => {
                write!(f, "Interest rate must be finite with 1 + r > 0; got {r}")
            }
            ModelError::InvalidWage { w } => {
                write!(f, "Wage must be finite and > 0; got {w}")
            }

            // ---- Grid ----
            ModelError::InvalidGridBounds { min, max, reason } => {
                write!(f, "Invalid capital grid bounds [{min}, {max}]: {reason}")
            }
            ModelError::InvalidGridSize { n } => {
                write!(f, "Capital grid needs at least 2 points; got {n}")
            }
            ModelError::InvalidGridCurvature { curvature } => {
                write!(f, "Grid curvature must be finite and >= 1; got {curvature}")
            }

            // ---- Iteration options ----
            ModelError::InvalidDamping { kappa, reason } => {
                write!(f, "Invalid damping coefficient {kappa}: {reason}")
            }
            ModelError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }
            ModelError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            ModelError::InvalidInitialGuess { index, value, reason } => {
                write!(f, "Invalid initial guess at index {index} ({value}): {reason}")
            }
            ModelError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {expected:?}, found {found:?}")
            }
            ModelError::InvalidConfig { text } => {
                write!(f, "Invalid configuration: {text}")
            }

            // ---- Convergence ----
            ModelError::NonConvergence { routine, iterations, last_change, tol } => {
                write!(
                    f,
                    "{routine} iteration did not converge after {iterations} iterations \
                     (last change {last_change:e}, tolerance {tol:e})"
                )
            }

            // ---- Numerical ----
            ModelError::NonFiniteValue { routine, index, value } => {
                write!(f, "{routine} produced a non-finite value at index {index}: {value}")
            }
            ModelError::NonPositiveConsumption { capital, labor, value } => {
                write!(
                    f,
                    "Consumption must stay > 0; got {value} at capital index {capital}, labor state {labor}"
                )
            }
            ModelError::NonMonotoneEndogenousGrid { labor, index } => {
                write!(
                    f,
                    "Endogenous capital grid is not strictly increasing at index {index} (labor state {labor})"
                )
            }
            ModelError::DegenerateDistribution { total } => {
                write!(f, "Distribution mass is degenerate (total {total})")
            }

            // ---- Argmin ----
            ModelError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }
        }
    }
}

impl From<Error> for ModelError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<ModelError>() {
            Ok(model_err) => return model_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(ArgminError::InvalidParameter { text }) => ModelError::InvalidConfig { text },
            Ok(other) => ModelError::BackendError { text: other.to_string() },
            Err(err) => ModelError::BackendError { text: err.to_string() },
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::InvalidConfig { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ModelError> for PyErr {
    fn from(err: ModelError) -> PyErr {
        match err.kind() {
            ErrorKind::InvalidParameter => PyValueError::new_err(err.to_string()),
            ErrorKind::NonConvergence | ErrorKind::NumericalInstability => {
                PyRuntimeError::new_err(err.to_string())
            }
        }
    }
}
