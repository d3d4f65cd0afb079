//! Traffic weight derivation.

use serde::Serialize;

use crate::state::ResourceState;

/// Observed and declared traffic weight of a service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct Weights {
    pub current: f64,
    pub desired: f64,
}

/// Current weight prefers the observed value, desired prefers the declared
/// one; each falls back to the other, then to 0. A resource without a status
/// reports `{ 0, 0 }`.
pub fn compute_weights(state: &ResourceState) -> Weights {
    if !state.has_status {
        return Weights::default();
    }

    Weights {
        current: state
            .status_computed_weight
            .or(state.spec_weight)
            .unwrap_or(0.0),
        desired: state
            .spec_weight
            .or(state.status_computed_weight)
            .unwrap_or(0.0),
    }
}
