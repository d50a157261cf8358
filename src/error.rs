//! Error type shared by the scoring and layout engines.
//!
//! Every variant is a caller contract violation surfaced immediately: there
//! is no retry and no partial result. Two conditions are deliberately *not*
//! errors: a filter that only one class exercises (it is dropped from the
//! difference table) and a genuine 0.5 activation (indistinguishable from
//! the zero-weight sentinel on rendered edges).

use thiserror::Error;

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, ActGraphError>;

#[derive(Debug, Error)]
pub enum ActGraphError {
    /// A tensor does not have the contractual rank (3D graph/filter, 4D population/pool).
    #[error("{what} must be {expected}-dimensional, got {actual} dimensions")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Nested input arrays are empty or not rectangular.
    #[error("{what} is empty or ragged")]
    Ragged { what: &'static str },

    /// Node axes of a filter and a patient graph disagree.
    #[error("shape mismatch: {what} has node axes {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("filter has no time steps")]
    EmptyFilter,

    #[error("filter length {filter_len} exceeds patient graph length {graph_len}")]
    FilterLongerThanGraph { filter_len: usize, graph_len: usize },

    #[error("{labels} labels supplied for {patients} patient graphs")]
    LabelCountMismatch { labels: usize, patients: usize },

    #[error("label {label} at position {index} is not binary (expected 0 or 1)")]
    InvalidLabel { index: usize, label: u8 },

    #[error("repeat count must be finite and non-negative, got {0}")]
    InvalidRepeats(f64),

    #[error("no filter is represented in both classes")]
    NoDiscriminativeFilter,

    #[error("filter id {filter_id} is outside the pool of {pool_size} filters")]
    FilterOutOfRange { filter_id: usize, pool_size: usize },

    #[error("patient index {index} is outside the population of {population}")]
    PatientOutOfRange { index: usize, population: usize },

    #[error("malformed node id '{0}' (expected '<index>_v<visit>')")]
    MalformedNodeId(String),

    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),
}

/// Check that `tensor` has exactly `expected` dimensions.
pub(crate) fn ensure_rank(
    tensor: &candle_core::Tensor,
    what: &'static str,
    expected: usize,
) -> Result<()> {
    let actual = tensor.rank();
    if actual != expected {
        return Err(ActGraphError::Dimension {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
