//! Leaky rectifier used by both scoring paths.

use candle_core::Tensor;

use crate::error::Result;

/// Slope applied to negative activations unless configured otherwise.
pub const DEFAULT_LEAKY_ALPHA: f64 = 0.01;

/// `max(alpha * x, x)`.
///
/// With `alpha` in (0, 1) positive values pass unchanged and negative ones
/// are damped rather than zeroed.
pub fn leaky(x: f64, alpha: f64) -> f64 {
    (alpha * x).max(x)
}

/// Elementwise [`leaky`] over a tensor of any shape.
pub fn leaky_tensor(t: &Tensor, alpha: f64) -> Result<Tensor> {
    let damped = t.affine(alpha, 0.0)?;
    Ok(t.maximum(&damped)?)
}
