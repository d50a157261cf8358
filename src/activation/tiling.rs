//! Fractional tiling of a filter along its time axis.
//!
//! A patient graph rarely spans an exact multiple of the filter length, so
//! the filter can be repeated a non-integer number of times: whole copies
//! first, then a leading slice of the filter for the fractional remainder.

use candle_core::Tensor;

use crate::error::{ensure_rank, ActGraphError, Result};

/// Number of leading filter rows contributed by the fractional part of `repeats`.
///
/// Truncates toward zero, so `W * frac` below one contributes nothing.
pub fn fractional_rows(filter_len: usize, repeats: f64) -> usize {
    let frac = repeats - repeats.trunc();
    (filter_len as f64 * frac) as usize
}

/// Output length of [`repeat_fractional`] for a filter of `filter_len` rows.
///
/// Fails with [`ActGraphError::InvalidRepeats`] when `repeats` is negative,
/// not finite, or the length does not fit in a `usize`.
pub fn tiled_len(filter_len: usize, repeats: f64) -> Result<usize> {
    let whole = repeats.trunc();
    if !repeats.is_finite() || repeats < 0.0 || whole >= usize::MAX as f64 {
        return Err(ActGraphError::InvalidRepeats(repeats));
    }
    (whole as usize)
        .checked_mul(filter_len)
        .and_then(|len| len.checked_add(fractional_rows(filter_len, repeats)))
        .ok_or(ActGraphError::InvalidRepeats(repeats))
}

/// Repeat `filter` (W, N, N) `repeats` times along axis 0.
///
/// Produces `trunc(repeats)` full copies followed by the first
/// `trunc(W * frac(repeats))` rows. The result is neither padded nor cut to
/// any target length; matching it against a patient graph is up to the
/// caller.
pub fn repeat_fractional(filter: &Tensor, repeats: f64) -> Result<Tensor> {
    ensure_rank(filter, "filter", 3)?;
    let filter_len = filter.dim(0)?;
    let total = tiled_len(filter_len, repeats)?;
    if total == 0 {
        return Ok(filter.narrow(0, 0, 0)?);
    }

    let frac_rows = fractional_rows(filter_len, repeats);
    let whole = (total - frac_rows) / filter_len;

    let mut parts: Vec<Tensor> = std::iter::repeat(filter.clone()).take(whole).collect();
    if frac_rows > 0 {
        parts.push(filter.narrow(0, 0, frac_rows)?);
    }
    Ok(Tensor::cat(&parts, 0)?)
}
