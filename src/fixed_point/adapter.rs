//! Adapter that exposes a [`FixedPointMap`] as an argmin [`Operator`].
//!
//! argmin counts operator evaluations (`"operator_count"`) and carries our
//! [`ModelError`](crate::errors::ModelError) values through its boxed error
//! type; the crate-level `From<argmin::core::Error>` conversion recovers them
//! unchanged once the run returns.
use crate::fixed_point::{traits::FixedPointMap, types::Iterate};
use argmin::core::{Error, Operator};

/// Bridges a user [`FixedPointMap`] to argmin's `Operator` trait.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, M: FixedPointMap> {
    pub map: &'a M,
}

impl<'a, M: FixedPointMap> ArgMinAdapter<'a, M> {
    pub fn new(map: &'a M) -> Self {
        Self { map }
    }
}

impl<M: FixedPointMap> Operator for ArgMinAdapter<'_, M> {
    type Param = Iterate;
    type Output = Iterate;

    /// Evaluate `T(x)`.
    ///
    /// # Errors
    /// Propagates any `ModelError` from the map via `?`.
    fn apply(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.map.apply(x)?)
    }
}
