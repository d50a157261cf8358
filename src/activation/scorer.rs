//! Activation scoring of filters against patient graphs.
//!
//! Two modes:
//! - **Tiled** ([`tiled_activation`]): the filter is repeated along the time
//!   axis to cover one patient graph and multiplied elementwise, giving a
//!   per-edge activation map.
//! - **Sliding** ([`score_population`]): each filter is slid over every
//!   patient graph with stride 1 and the best leaky-rectified window sum is
//!   kept, giving one score per (patient, filter) pair.

use candle_core::{DType, Tensor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ensure_rank, ActGraphError, Result};

use super::config::ScoringConfig;
use super::nonlinearity::{leaky, leaky_tensor};
use super::tiling::repeat_fractional;

/// Best sliding-window activation of one filter on one patient graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxActivationRecord {
    /// Outcome class of the patient (0 or 1).
    pub label: u8,
    /// 1-based position of the filter in the pool.
    pub filter_id: usize,
    /// Highest leaky-rectified window sum, floored at 0.
    pub max_activation: f64,
}

fn node_axes(tensor: &Tensor) -> Result<(usize, usize)> {
    let dims = tensor.dims();
    let n = dims.len();
    Ok((tensor.dim(n - 2)?, tensor.dim(n - 1)?))
}

fn ensure_same_nodes(graph: &Tensor, filter: &Tensor) -> Result<()> {
    let expected = node_axes(graph)?;
    let actual = node_axes(filter)?;
    if expected != actual {
        return Err(ActGraphError::ShapeMismatch {
            what: "filter",
            expected,
            actual,
        });
    }
    Ok(())
}

fn ensure_filter_fits(filter_len: usize, graph_len: usize) -> Result<()> {
    if filter_len == 0 {
        return Err(ActGraphError::EmptyFilter);
    }
    if filter_len > graph_len {
        return Err(ActGraphError::FilterLongerThanGraph {
            filter_len,
            graph_len,
        });
    }
    Ok(())
}

// ============================================================================
// Tiled mode
// ============================================================================

/// Activation map of `filter` (W, N, N) tiled over `patient_graph` (T, N, N).
///
/// The repeat count is `T / W` in integer division, so when W does not
/// divide T the tiled filter covers only the first `(T / W) * W` visits and
/// the returned map is that much shorter than the graph. The uncovered tail
/// is absent from the result, not zero-filled.
pub fn tiled_activation(patient_graph: &Tensor, filter: &Tensor, alpha: f64) -> Result<Tensor> {
    ensure_rank(patient_graph, "patient graph", 3)?;
    ensure_rank(filter, "filter", 3)?;
    ensure_same_nodes(patient_graph, filter)?;

    let time_steps = patient_graph.dim(0)?;
    let filter_len = filter.dim(0)?;
    ensure_filter_fits(filter_len, time_steps)?;

    let repeats = (time_steps / filter_len) as f64;
    let tiled = repeat_fractional(&filter.to_dtype(DType::F64)?, repeats)?;
    let covered = tiled.dim(0)?;
    if covered < time_steps {
        debug!(
            "Tiled filter covers {} of {} visits; trailing visits dropped from activation map",
            covered, time_steps
        );
    }

    let graph = patient_graph.to_dtype(DType::F64)?.narrow(0, 0, covered)?;
    leaky_tensor(&graph.mul(&tiled)?, alpha)
}

// ============================================================================
// Sliding mode
// ============================================================================

/// Maximum leaky-rectified window sum of `filter` slid over `patient_graph`.
///
/// Window starts run over `0..T-1`, one short of the last possible start,
/// and a start whose window would overrun the graph is skipped. The running
/// maximum starts at 0, so the score is never negative.
pub fn max_window_activation(patient_graph: &Tensor, filter: &Tensor, alpha: f64) -> Result<f64> {
    let time_steps = patient_graph.dim(0)?;
    let filter_len = filter.dim(0)?;

    let mut max_activation = 0.0;
    for start in 0..time_steps.saturating_sub(1) {
        if start + filter_len > time_steps {
            break;
        }
        let window_sum = patient_graph
            .narrow(0, start, filter_len)?
            .mul(filter)?
            .sum_all()?
            .to_scalar::<f64>()?;
        let activation = leaky(window_sum, alpha);
        if activation > max_activation {
            max_activation = activation;
        }
    }
    Ok(max_activation)
}

/// Score every filter in `filters` (F, W, N, N) against every patient in
/// `patient_graphs` (P, T, N, N).
///
/// Returns P×F records, filter-major then patient order.
pub fn score_population(
    patient_graphs: &Tensor,
    filters: &Tensor,
    labels: &[u8],
    config: &ScoringConfig,
) -> Result<Vec<MaxActivationRecord>> {
    ensure_rank(patient_graphs, "patient graphs", 4)?;
    ensure_rank(filters, "filters", 4)?;
    ensure_same_nodes(patient_graphs, filters)?;

    let (num_patients, time_steps, _, _) = patient_graphs.dims4()?;
    let (num_filters, filter_len, _, _) = filters.dims4()?;
    ensure_filter_fits(filter_len, time_steps)?;

    if labels.len() != num_patients {
        return Err(ActGraphError::LabelCountMismatch {
            labels: labels.len(),
            patients: num_patients,
        });
    }
    if let Some((index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l > 1) {
        return Err(ActGraphError::InvalidLabel { index, label });
    }

    let patient_graphs = patient_graphs.to_dtype(DType::F64)?;
    let filters = filters.to_dtype(DType::F64)?;
    let alpha = config.leaky_alpha;

    let pairs: Vec<(usize, usize)> = (0..num_filters)
        .flat_map(|f| (0..num_patients).map(move |p| (f, p)))
        .collect();

    let score_pair = |&(filter_idx, patient_idx): &(usize, usize)| -> Result<MaxActivationRecord> {
        let filter = filters.get(filter_idx)?;
        let graph = patient_graphs.get(patient_idx)?;
        let max_activation = max_window_activation(&graph, &filter, alpha)?;
        debug!(
            "The maximum activation for patient {} and filter {} = {}",
            patient_idx, filter_idx, max_activation
        );
        Ok(MaxActivationRecord {
            label: labels[patient_idx],
            filter_id: filter_idx + 1,
            max_activation,
        })
    };

    if config.parallel {
        pairs.par_iter().map(score_pair).collect()
    } else {
        pairs.iter().map(score_pair).collect()
    }
}
