//! Firm pricing — factor prices from the Cobb-Douglas first-order conditions.
//!
//! With output `Y = K^α L^{1-α}` and depreciation `δ`:
//! - `r = α (K/L)^{α-1} - δ`
//! - `w = (1-α) (K/L)^α`
//!
//! `δ = 0` (the default) makes `r` the marginal product of capital itself.
use crate::{
    config::Technology,
    errors::{ModelError, ModelResult},
};
use serde::{Deserialize, Serialize};

/// Interest rate and wage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub r: f64,
    pub w: f64,
}

impl Prices {
    /// Gross return `1 + r`.
    #[inline]
    pub fn gross_return(&self) -> f64 {
        1.0 + self.r
    }
}

/// Prices paid by a competitive firm renting `capital` and `labor`.
///
/// # Errors
/// - [`ModelError::InvalidAggregate`] unless both aggregates are finite and `> 0`.
/// - [`ModelError::InvalidCapitalShare`] / [`ModelError::InvalidDepreciation`]
///   if `technology` holds out-of-domain values.
pub fn firm_prices(capital: f64, labor: f64, technology: &Technology) -> ModelResult<Prices> {
    let Technology { alpha, delta } = Technology::new(technology.alpha, technology.delta)?;
    verify_aggregate("capital", capital)?;
    verify_aggregate("labor", labor)?;
    let ratio = capital / labor;
    let r = alpha * ratio.powf(alpha - 1.0) - delta;
    let w = (1.0 - alpha) * ratio.powf(alpha);
    Ok(Prices { r, w })
}

/// Capital demanded at interest rate `r`, inverting the capital FOC:
/// `K = L · ((r + δ)/α)^{1/(α-1)}`.
///
/// # Errors
/// - [`ModelError::InvalidInterestRate`] unless `r + δ > 0`.
/// - [`ModelError::InvalidAggregate`] for invalid `labor`.
pub fn capital_demand(r: f64, labor: f64, technology: &Technology) -> ModelResult<f64> {
    let Technology { alpha, delta } = Technology::new(technology.alpha, technology.delta)?;
    verify_aggregate("labor", labor)?;
    let rental = r + delta;
    if !(rental.is_finite() && rental > 0.0) {
        return Err(ModelError::InvalidInterestRate { r });
    }
    Ok(labor * (rental / alpha).powf(1.0 / (alpha - 1.0)))
}

fn verify_aggregate(name: &'static str, value: f64) -> ModelResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ModelError::InvalidAggregate { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use approx::assert_relative_eq;

    fn tech(alpha: f64) -> Technology {
        Technology::new(alpha, 0.0).unwrap()
    }

    #[test]
    fn unit_aggregates_with_half_share() {
        let prices = firm_prices(1.0, 1.0, &tech(0.5)).unwrap();

        assert_relative_eq!(prices.r, 0.5);
        assert_relative_eq!(prices.w, 0.5);
    }

    #[test]
    // Purpose
    // -------
    // Factor payments exhaust output (constant returns): `(r+δ)K + wL = Y`.
    fn factor_payments_exhaust_output() {
        let technology = Technology::new(0.36, 0.08).unwrap();
        let (k, l) = (7.3, 1.2);

        let p = firm_prices(k, l, &technology).unwrap();

        let output = k.powf(0.36) * l.powf(0.64);
        assert_relative_eq!((p.r + 0.08) * k + p.w * l, output, max_relative = 1e-12);
    }

    #[test]
    fn capital_demand_inverts_interest_rate() {
        let technology = Technology::new(0.4, 0.05).unwrap();

        let p = firm_prices(12.0, 1.5, &technology).unwrap();
        let k = capital_demand(p.r, 1.5, &technology).unwrap();

        assert_relative_eq!(k, 12.0, max_relative = 1e-12);
    }

    #[test]
    fn rejects_non_positive_aggregates_and_bad_share() {
        let zero_k = firm_prices(0.0, 1.0, &tech(0.5));
        let nan_l = firm_prices(1.0, f64::NAN, &tech(0.5));
        let bad_alpha = firm_prices(1.0, 1.0, &Technology { alpha: 1.0, delta: 0.0 });
        let bad_r = capital_demand(-0.5, 1.0, &tech(0.5));

        assert!(matches!(zero_k, Err(ModelError::InvalidAggregate { name: "capital", .. })));
        assert!(matches!(nan_l, Err(ModelError::InvalidAggregate { name: "labor", .. })));
        assert_eq!(bad_alpha.unwrap_err().kind(), ErrorKind::InvalidParameter);
        assert!(matches!(bad_r, Err(ModelError::InvalidInterestRate { .. })));
    }
}
