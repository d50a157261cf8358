//! Labeled population + filter pool, loaded from JSON.
//!
//! File layout:
//!
//! ```json
//! {
//!   "patients": [[[[0.0, 3.0], [0.0, 0.0]], ...], ...],
//!   "filters":  [[[[1.0, 0.0], [0.0, 0.0]], ...], ...],
//!   "labels":   [0, 1]
//! }
//! ```
//!
//! `patients` is (P, T, N, N), `filters` is (F, W, N, N). Population order
//! and label order are assumed to line up one to one.

use std::path::Path;

use anyhow::Context;
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{ActGraphError, Result};

/// (d0, d1, d2, d3) values as nested JSON arrays.
pub type Nested4 = Vec<Vec<Vec<Vec<f64>>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDataset {
    pub patients: Nested4,
    pub filters: Nested4,
    pub labels: Vec<u8>,
}

/// Tensors ready for scoring.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// (P, T, N, N)
    pub patients: Tensor,
    /// (F, W, N, N)
    pub filters: Tensor,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn new(patients: Tensor, filters: Tensor, labels: Vec<u8>) -> Self {
        Self {
            patients,
            filters,
            labels,
        }
    }

    pub fn from_raw(raw: RawDataset) -> Result<Self> {
        Ok(Self {
            patients: tensor4_from_nested(&raw.patients, "patients")?,
            filters: tensor4_from_nested(&raw.filters, "filters")?,
            labels: raw.labels,
        })
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let raw: RawDataset = serde_json::from_str(json).context("Failed to parse dataset JSON")?;
        Ok(Self::from_raw(raw)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let dataset = Self::from_json_str(&contents)
            .with_context(|| format!("Invalid dataset {}", path.display()))?;
        tracing::info!(
            "Loaded patient graphs {:?} and filters {:?} from {}",
            dataset.patients.dims(),
            dataset.filters.dims(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn num_patients(&self) -> usize {
        self.patients.dims().first().copied().unwrap_or(0)
    }

    /// Graph (T, N, N) of the patient at `index`.
    pub fn patient(&self, index: usize) -> Result<Tensor> {
        let population = self.num_patients();
        if index >= population {
            return Err(ActGraphError::PatientOutOfRange { index, population });
        }
        Ok(self.patients.get(index)?)
    }
}

/// Flatten a rectangular 4-level nesting into a (d0, d1, d2, d3) tensor.
pub fn tensor4_from_nested(nested: &Nested4, what: &'static str) -> Result<Tensor> {
    let ragged = || ActGraphError::Ragged { what };

    let d0 = nested.len();
    let d1 = nested.first().map(Vec::len).ok_or_else(ragged)?;
    let d2 = nested[0].first().map(Vec::len).ok_or_else(ragged)?;
    let d3 = nested[0][0].first().map(Vec::len).ok_or_else(ragged)?;
    if d3 == 0 {
        return Err(ragged());
    }

    let mut data = Vec::with_capacity(d0 * d1 * d2 * d3);
    for block in nested {
        if block.len() != d1 {
            return Err(ragged());
        }
        for matrix in block {
            if matrix.len() != d2 {
                return Err(ragged());
            }
            for row in matrix {
                if row.len() != d3 {
                    return Err(ragged());
                }
                data.extend_from_slice(row);
            }
        }
    }

    Ok(Tensor::from_vec(data, (d0, d1, d2, d3), &Device::Cpu)?)
}
