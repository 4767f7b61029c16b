//! Scene configuration.

use serde::{Deserialize, Serialize};

/// Options controlling how a [`Scene`](crate::Scene) primes and advances its tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Compute bounding boxes at the start of the time range during `init`.
    pub compute_bounds_on_init: bool,

    /// Log rejected (out-of-range) updates at warn level instead of debug.
    pub warn_out_of_range: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            compute_bounds_on_init: true,
            warn_out_of_range: true,
        }
    }
}
