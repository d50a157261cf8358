//! Activation scoring engine.
//!
//! Measures how strongly fixed 3D filters respond to temporal patient
//! graphs and ranks filters by how well that response separates the two
//! outcome classes.
//!
//! ## Modules
//!
//! - [`nonlinearity`]: leaky rectifier (scalar and elementwise)
//! - [`tiling`]: fractional repetition of a filter along the time axis
//! - [`scorer`]: tiled activation maps and sliding-window population scores
//! - [`aggregate`]: per-filter class differences and best-filter selection
//! - [`config`]: `ScoringConfig`

pub mod aggregate;
pub mod config;
pub mod nonlinearity;
pub mod scorer;
pub mod tiling;

pub use aggregate::{aggregate_difference, best_filter_id, select_best_filter, ClassDifferenceRecord};
pub use config::ScoringConfig;
pub use nonlinearity::{leaky, leaky_tensor, DEFAULT_LEAKY_ALPHA};
pub use scorer::{max_window_activation, score_population, tiled_activation, MaxActivationRecord};
pub use tiling::repeat_fractional;
