//! End-to-end run: population scores → best filter → one patient's activated graph.
//!
//! 1. Slide every filter over every patient and keep the max activation.
//! 2. Reduce to per-filter class differences.
//! 3. Pick the most discriminative filter.
//! 4. Tile it over the selected patient's graph.
//! 5. Extract the weighted edge list.
//! 6. Lay the nodes out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activation::{
    aggregate_difference, score_population, select_best_filter, tiled_activation,
    ClassDifferenceRecord, ScoringConfig,
};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::graph::{build_edges, layout_nodes, position_map, ActivatedGraph, EdgeRecord, NodePosition};

/// Everything a renderer needs for one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationReport {
    pub patient_index: usize,
    /// Filter chosen for the activation map (1-based).
    pub best_filter_id: usize,
    /// Per-filter class differences, ordered by filter id.
    pub differences: Vec<ClassDifferenceRecord>,
    pub edges: Vec<EdgeRecord>,
    pub positions: Vec<NodePosition>,
}

impl ActivationReport {
    /// Node id → (x, y).
    pub fn position_map(&self) -> HashMap<String, (usize, i64)> {
        position_map(&self.positions)
    }

    pub fn graph(&self) -> ActivatedGraph {
        ActivatedGraph::from_layout(&self.edges, &self.positions)
    }
}

/// Class difference per filter over the whole population (steps 1–2).
pub fn class_differences(
    dataset: &Dataset,
    config: &ScoringConfig,
) -> Result<Vec<ClassDifferenceRecord>> {
    let records = score_population(&dataset.patients, &dataset.filters, &dataset.labels, config)?;
    info!("Scored {} (patient, filter) pairs", records.len());
    let differences = aggregate_difference(&records);
    info!("{} filters have a defined class difference", differences.len());
    Ok(differences)
}

/// Run the whole pipeline for the patient at `patient_index`.
pub fn run_pipeline(
    dataset: &Dataset,
    patient_index: usize,
    config: &ScoringConfig,
) -> Result<ActivationReport> {
    let patient_graph = dataset.patient(patient_index)?;

    let differences = class_differences(dataset, config)?;
    let (best_filter_id, best_filter) = select_best_filter(&differences, &dataset.filters)?;

    let activation_map = tiled_activation(&patient_graph, &best_filter, config.leaky_alpha)?;
    let edges = build_edges(&patient_graph, &activation_map)?;
    let positions = layout_nodes(&edges)?;

    info!(
        "Patient {}: {} edges ({} activated by filter {}), {} nodes",
        patient_index,
        edges.len(),
        edges.iter().filter(|e| e.activated).count(),
        best_filter_id,
        positions.len()
    );

    Ok(ActivationReport {
        patient_index,
        best_filter_id,
        differences,
        edges,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActGraphError;
    use crate::test_helpers::*;

    fn reference_dataset() -> Dataset {
        Dataset::new(reference_population(), reference_filters(), reference_labels())
    }

    #[test]
    fn test_class_differences_reference() {
        let diffs = class_differences(&reference_dataset(), &ScoringConfig::default()).unwrap();
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].filter_id, 1);
        assert!((diffs[0].difference - 2.0).abs() < 1e-12);
        assert!((diffs[1].difference - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_run_pipeline_reference_patient() {
        let report = run_pipeline(&reference_dataset(), 1, &ScoringConfig::default()).unwrap();
        assert_eq!(report.best_filter_id, 1);
        assert_eq!(report.edges.len(), 7);

        let activated: Vec<&EdgeRecord> = report.edges.iter().filter(|e| e.activated).collect();
        assert_eq!(activated.len(), 1);
        assert_eq!(activated[0].weight, 2.0);
        assert_eq!(activated[0].start_node, "1_v2");
        assert_eq!(activated[0].end_node, "1_v3");

        let graph = report.graph();
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 7);
    }

    #[test]
    fn test_run_pipeline_patient_out_of_range() {
        assert!(matches!(
            run_pipeline(&reference_dataset(), 4, &ScoringConfig::default()),
            Err(ActGraphError::PatientOutOfRange {
                index: 4,
                population: 4
            })
        ));
    }

    #[test]
    fn test_run_pipeline_single_class_population() {
        let dataset = Dataset::new(reference_population(), reference_filters(), vec![1, 1, 1, 1]);
        assert!(matches!(
            run_pipeline(&dataset, 0, &ScoringConfig::default()),
            Err(ActGraphError::NoDiscriminativeFilter)
        ));
    }
}
