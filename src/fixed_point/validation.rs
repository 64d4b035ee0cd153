//! Validation helpers for damped fixed-point iteration.
//!
//! This module centralizes the consistency checks used by the engine:
//!
//! - **Option checks**: [`verify_tol`], [`verify_damping`], [`verify_max_iter`]
//!   ensure iteration settings are usable before any work is done.
//! - **Iterate checks**: [`validate_initial_guess`] and [`validate_iterate`]
//!   reject empty or non-finite vectors.
//! - **Step size**: [`sup_norm_diff`] measures `‖a - b‖_∞`, the stopping
//!   metric used by every fixed-point routine in the crate.
use crate::{
    errors::{ModelError, ModelResult},
    fixed_point::types::{Change, Iterate},
};
use ndarray::Zip;

/// Validate a convergence tolerance.
///
/// # Errors
/// Returns [`ModelError::InvalidTolerance`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol(tol: f64) -> ModelResult<()> {
    if !tol.is_finite() {
        return Err(ModelError::InvalidTolerance { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(ModelError::InvalidTolerance { tol, reason: "Tolerance must be positive." });
    }
    Ok(())
}

/// Validate a damping weight `κ` placed on the previous iterate.
///
/// `κ = 0` is a plain (undamped) iteration; `κ = 1` would never move and is
/// rejected.
///
/// # Errors
/// Returns [`ModelError::InvalidDamping`] unless `0 ≤ κ < 1`.
pub fn verify_damping(kappa: f64) -> ModelResult<()> {
    if !kappa.is_finite() {
        return Err(ModelError::InvalidDamping { kappa, reason: "Damping must be finite." });
    }
    if !(0.0..1.0).contains(&kappa) {
        return Err(ModelError::InvalidDamping { kappa, reason: "Damping must lie in [0, 1)." });
    }
    Ok(())
}

/// Validate an iteration cap.
///
/// # Errors
/// Returns [`ModelError::InvalidMaxIter`] if `max_iter == 0`.
pub fn verify_max_iter(max_iter: usize) -> ModelResult<()> {
    if max_iter == 0 {
        return Err(ModelError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate the starting point of an iteration.
///
/// # Errors
/// - [`ModelError::InvalidInitialGuess`] if `x0` is empty or has a non-finite
///   entry (the first offending index is reported).
pub fn validate_initial_guess(x0: &Iterate) -> ModelResult<()> {
    if x0.is_empty() {
        return Err(ModelError::InvalidInitialGuess {
            index: 0,
            value: f64::NAN,
            reason: "Initial guess must not be empty.",
        });
    }
    for (index, &value) in x0.iter().enumerate() {
        if !value.is_finite() {
            return Err(ModelError::InvalidInitialGuess {
                index,
                value,
                reason: "Initial guess must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate that an iterate produced mid-run is finite.
///
/// # Errors
/// Returns [`ModelError::NonFiniteValue`] tagged with `routine` and the first
/// offending index.
pub fn validate_iterate(x: &Iterate, routine: &'static str) -> ModelResult<()> {
    for (index, &value) in x.iter().enumerate() {
        if !value.is_finite() {
            return Err(ModelError::NonFiniteValue { routine, index, value });
        }
    }
    Ok(())
}

/// Sup-norm distance `max_i |a_i - b_i|`.
///
/// A NaN anywhere propagates to the result so a poisoned iterate can never
/// look converged.
pub fn sup_norm_diff(a: &Iterate, b: &Iterate) -> Change {
    Zip::from(a).and(b).fold(0.0_f64, |acc, &x, &y| {
        let d = (x - y).abs();
        if d.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(d) }
    })
}
