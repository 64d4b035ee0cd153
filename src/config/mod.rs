//! config — validated model parameters and inner-loop options.
//!
//! - [`params`]: economic primitives ([`Preferences`], [`Technology`],
//!   [`IncomeProcess`]), the capital grid ([`GridSpec`]), the outer loop
//!   ([`Iteration`]), the bundled [`Parameters`] and the flat serde-backed
//!   [`ModelConfig`].
//! - [`options`]: [`SolverOptions`] for the household and distribution
//!   iterations.

pub mod options;
pub mod params;

pub use self::options::SolverOptions;
pub use self::params::{
    GridSpec, IncomeProcess, Iteration, ModelConfig, Parameters, Preferences, Technology,
};
