//! markov — finite-state Markov chains for the labor-endowment process.
//!
//! - [`chain`]: the validated [`MarkovChain`] type and its stationary
//!   distribution.
//! - [`rouwenhorst`](mod@rouwenhorst): discretization of a Gaussian AR(1) process.

pub mod chain;
pub mod rouwenhorst;

pub use self::chain::MarkovChain;
pub use self::rouwenhorst::{rouwenhorst, rouwenhorst_labor};
