//! model — the Aiyagari economy: firm, households, distribution, equilibrium.
//!
//! Purpose
//! -------
//! Hold the economic components that sit on top of the generic fixed-point
//! engine and the Markov-chain utilities.
//!
//! Key behaviors
//! -------------
//! - [`grid`] and [`interpolation`]: the capital grid and the linear
//!   interpolation shared by the household and distribution routines.
//! - [`firm`]: factor prices from the firm's first-order conditions.
//! - [`household`]: Euler-equation iteration for the savings policy.
//! - [`distribution`]: invariant distribution over `(capital, labor)`.
//! - [`equilibrium`]: damped outer loop on aggregate capital.
//!
//! Conventions
//! -----------
//! - State-space arrays are `kNum × lNum` (capital rows, labor columns).
//! - Labor states are endowment levels, not logs.

pub mod distribution;
pub mod equilibrium;
pub mod firm;
pub mod grid;
pub mod household;
pub mod interpolation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::distribution::{Distribution, aggregate_capital, stationary_distribution};
pub use self::equilibrium::{
    EquilibriumSolver, EquilibriumState, EquilibriumSummary, IterationRecord, Stage,
    solve_equilibrium,
};
pub use self::firm::{Prices, capital_demand, firm_prices};
pub use self::grid::Grid;
pub use self::household::{PolicyFunction, cash_in_hand, solve_household};
