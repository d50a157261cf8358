//! Configuration for the activation scorer.

use serde::{Deserialize, Serialize};

use super::nonlinearity::DEFAULT_LEAKY_ALPHA;

/// Parameters shared by tiled and sliding-window scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Slope of the leaky rectifier for negative activations.
    /// Must lie in (0, 1) so the rectifier stays monotone.
    pub leaky_alpha: f64,

    /// Score (filter, patient) pairs on the rayon thread pool.
    /// Output order is identical either way.
    pub parallel: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            leaky_alpha: DEFAULT_LEAKY_ALPHA,
            parallel: true,
        }
    }
}
