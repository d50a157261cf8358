//! Class discrimination: which filter separates the two outcome classes best.

use std::collections::BTreeMap;

use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ensure_rank, ActGraphError, Result};

use super::scorer::MaxActivationRecord;

/// Absolute gap between the class means of one filter's max activations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDifferenceRecord {
    pub filter_id: usize,
    pub difference: f64,
}

/// Running (sum, count) per class for one filter.
#[derive(Default)]
struct ClassSums {
    sums: [f64; 2],
    counts: [usize; 2],
}

impl ClassSums {
    fn mean(&self, label: usize) -> Option<f64> {
        (self.counts[label] > 0).then(|| self.sums[label] / self.counts[label] as f64)
    }
}

/// Reduce per-patient scores to one class difference per filter.
///
/// Mean max activation is taken per (filter, label); the difference is
/// `|mean_0 - mean_1|`. Filters that only one class exercised have no
/// defined difference and are left out. Records whose label is neither 0
/// nor 1 are skipped. Rows come back ordered by `filter_id`.
pub fn aggregate_difference(records: &[MaxActivationRecord]) -> Vec<ClassDifferenceRecord> {
    let mut per_filter: BTreeMap<usize, ClassSums> = BTreeMap::new();
    for record in records {
        let label = match record.label {
            0 | 1 => usize::from(record.label),
            other => {
                warn!(
                    "Skipping filter {} record with label {} outside {{0, 1}}",
                    record.filter_id, other
                );
                continue;
            }
        };
        let entry = per_filter.entry(record.filter_id).or_default();
        entry.sums[label] += record.max_activation;
        entry.counts[label] += 1;
    }

    per_filter
        .into_iter()
        .filter_map(|(filter_id, sums)| match (sums.mean(0), sums.mean(1)) {
            (Some(negative), Some(positive)) => Some(ClassDifferenceRecord {
                filter_id,
                difference: (negative - positive).abs(),
            }),
            _ => {
                debug!("Filter {} lacks one class, no difference defined", filter_id);
                None
            }
        })
        .collect()
}

/// Id of the filter with the largest class difference.
///
/// Ties go to the lowest filter id.
pub fn best_filter_id(difference_table: &[ClassDifferenceRecord]) -> Option<usize> {
    let mut best: Option<&ClassDifferenceRecord> = None;
    for row in difference_table {
        let replace = match best {
            None => true,
            Some(current) => {
                row.difference > current.difference
                    || (row.difference == current.difference && row.filter_id < current.filter_id)
            }
        };
        if replace {
            best = Some(row);
        }
    }
    best.map(|row| row.filter_id)
}

/// Pick the filter tensor with the largest class difference from `filters` (F, W, N, N).
///
/// Returns the winning filter id together with its (W, N, N) tensor.
pub fn select_best_filter(
    difference_table: &[ClassDifferenceRecord],
    filters: &Tensor,
) -> Result<(usize, Tensor)> {
    ensure_rank(filters, "filters", 4)?;
    let filter_id = best_filter_id(difference_table).ok_or(ActGraphError::NoDiscriminativeFilter)?;

    let pool_size = filters.dim(0)?;
    if filter_id == 0 || filter_id > pool_size {
        return Err(ActGraphError::FilterOutOfRange {
            filter_id,
            pool_size,
        });
    }

    info!("Selected filter {} as most discriminative", filter_id);
    Ok((filter_id, filters.get(filter_id - 1)?))
}
