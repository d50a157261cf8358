//! Test fixtures shared by the unit tests.
//!
//! The reference population has 4 patients with 3 nodes and 4 visits each,
//! 2 filters of length 2, and labels `[0, 1, 1, 0]`. Filter 1 separates the
//! classes (difference 2.0), filter 2 barely does (difference 0.5).
#![allow(dead_code)]

use candle_core::{Device, Tensor};

pub const NODES: usize = 3;
pub const VISITS: usize = 4;

/// Build a (visits, n, n) block from sparse `(t, i, j, value)` entries.
pub fn sparse_block(visits: usize, n: usize, entries: &[(usize, usize, usize, f64)]) -> Vec<f64> {
    let mut data = vec![0.0; visits * n * n];
    for &(t, i, j, v) in entries {
        data[t * n * n + i * n + j] = v;
    }
    data
}

pub fn graph_from_entries(visits: usize, n: usize, entries: &[(usize, usize, usize, f64)]) -> Tensor {
    Tensor::from_vec(sparse_block(visits, n, entries), (visits, n, n), &Device::Cpu)
        .expect("graph tensor")
}

/// Entries of the reference patient (index 1): a 7-edge pathway.
pub fn reference_patient_entries() -> Vec<(usize, usize, usize, f64)> {
    vec![
        (0, 1, 2, 3.0),
        (1, 2, 1, 4.0),
        (1, 2, 2, 4.0),
        (2, 1, 1, 2.0),
        (2, 2, 1, 2.0),
        (3, 1, 0, 5.0),
        (3, 1, 2, 5.0),
    ]
}

pub fn reference_patient() -> Tensor {
    graph_from_entries(VISITS, NODES, &reference_patient_entries())
}

/// (4, 4, 3, 3) population tensor.
pub fn reference_population() -> Tensor {
    let patients = [
        vec![(0, 0, 0, 2.0), (1, 0, 1, 1.0), (2, 2, 2, 6.0), (3, 2, 0, 1.0)],
        reference_patient_entries(),
        vec![(0, 0, 1, 1.0), (2, 1, 1, 3.0), (3, 1, 2, 2.0)],
        vec![(1, 1, 1, 1.0), (3, 0, 2, 3.0)],
    ];
    let data: Vec<f64> = patients
        .iter()
        .flat_map(|entries| sparse_block(VISITS, NODES, entries))
        .collect();
    Tensor::from_vec(data, (patients.len(), VISITS, NODES, NODES), &Device::Cpu)
        .expect("population tensor")
}

/// (2, 2, 3, 3) filter pool.
pub fn reference_filters() -> Tensor {
    let filters = [vec![(0, 1, 1, 1.0)], vec![(0, 2, 2, 0.5)]];
    let data: Vec<f64> = filters
        .iter()
        .flat_map(|entries| sparse_block(2, NODES, entries))
        .collect();
    Tensor::from_vec(data, (filters.len(), 2, NODES, NODES), &Device::Cpu)
        .expect("filter tensor")
}

pub fn reference_labels() -> Vec<u8> {
    vec![0, 1, 1, 0]
}
