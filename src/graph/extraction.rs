//! Patient graph tensor → edge list.

use candle_core::{DType, Tensor};
use tracing::debug;

use crate::error::{ensure_rank, ActGraphError, Result};

use super::models::{node_id, EdgeRecord, ZERO_WEIGHT_SENTINEL};

/// Visits joined by the transition stored at time slice `t`.
///
/// Slice 0 joins visit 0 to visit 1; every later slice `t` joins `t` to `t + 1`.
pub fn visit_span(t: usize) -> (usize, usize) {
    match t {
        0 => (0, 1),
        t => (t, t + 1),
    }
}

/// Build the edge list of `patient_graph` (T, N, N) weighted by `activation_map`.
///
/// Every nonzero cell `(t, i, j)` becomes an edge `i_v{start} -> j_v{end}`,
/// in row-major order. `weight` is the activation at that cell (cells past
/// a tiling-truncated activation map count as 0); `time_between` is the
/// cell value itself. Zero weights become [`ZERO_WEIGHT_SENTINEL`] with
/// `activated = false`.
pub fn build_edges(patient_graph: &Tensor, activation_map: &Tensor) -> Result<Vec<EdgeRecord>> {
    ensure_rank(patient_graph, "patient graph", 3)?;
    ensure_rank(activation_map, "activation map", 3)?;

    let (_, rows, cols) = patient_graph.dims3()?;
    let (_, act_rows, act_cols) = activation_map.dims3()?;
    if (rows, cols) != (act_rows, act_cols) {
        return Err(ActGraphError::ShapeMismatch {
            what: "activation map",
            expected: (rows, cols),
            actual: (act_rows, act_cols),
        });
    }

    let graph = patient_graph.to_dtype(DType::F64)?.to_vec3::<f64>()?;
    let activations = activation_map.to_dtype(DType::F64)?.to_vec3::<f64>()?;

    let mut edges = Vec::new();
    for (t, slice) in graph.iter().enumerate() {
        let (start_visit, end_visit) = visit_span(t);
        for (i, row) in slice.iter().enumerate() {
            for (j, &time_between) in row.iter().enumerate() {
                if time_between == 0.0 {
                    continue;
                }
                let weight = activations
                    .get(t)
                    .map(|act| act[i][j])
                    .unwrap_or(0.0);
                let activated = weight != 0.0;
                edges.push(EdgeRecord {
                    start_node: node_id(i, start_visit),
                    end_node: node_id(j, end_visit),
                    activated,
                    weight: if activated { weight } else { ZERO_WEIGHT_SENTINEL },
                    time_between,
                });
            }
        }
    }

    debug!(
        "Extracted {} edges ({} activated)",
        edges.len(),
        edges.iter().filter(|e| e.activated).count()
    );
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn test_visit_span() {
        assert_eq!(visit_span(0), (0, 1));
        assert_eq!(visit_span(1), (1, 2));
        assert_eq!(visit_span(3), (3, 4));
    }

    #[test]
    fn test_build_edges_row_major_with_sentinel() {
        let graph = reference_patient();
        let act = graph_from_entries(VISITS, NODES, &[(2, 1, 1, 2.0)]);
        let edges = build_edges(&graph, &act).unwrap();

        let summary: Vec<(&str, &str, bool, f64, f64)> = edges
            .iter()
            .map(|e| {
                (
                    e.start_node.as_str(),
                    e.end_node.as_str(),
                    e.activated,
                    e.weight,
                    e.time_between,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1_v0", "2_v1", false, 0.5, 3.0),
                ("2_v1", "1_v2", false, 0.5, 4.0),
                ("2_v1", "2_v2", false, 0.5, 4.0),
                ("1_v2", "1_v3", true, 2.0, 2.0),
                ("2_v2", "1_v3", false, 0.5, 2.0),
                ("1_v3", "0_v4", false, 0.5, 5.0),
                ("1_v3", "2_v4", false, 0.5, 5.0),
            ]
        );
    }

    #[test]
    fn test_build_edges_keeps_negative_activation() {
        let graph = graph_from_entries(2, 2, &[(1, 0, 1, 4.0)]);
        let act = graph_from_entries(2, 2, &[(1, 0, 1, -0.04)]);
        let edges = build_edges(&graph, &act).unwrap();
        assert_eq!(edges.len(), 1);
        assert!(edges[0].activated);
        assert!((edges[0].weight + 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_build_edges_past_truncated_map_are_inactive() {
        let graph = graph_from_entries(3, 2, &[(0, 0, 1, 1.0), (2, 1, 0, 7.0)]);
        let act = graph_from_entries(2, 2, &[(0, 0, 1, 1.0)]);
        let edges = build_edges(&graph, &act).unwrap();
        assert_eq!(edges.len(), 2);
        assert!(edges[0].activated);
        assert!(!edges[1].activated);
        assert_eq!(edges[1].weight, ZERO_WEIGHT_SENTINEL);
        assert_eq!(edges[1].start_node, "1_v2");
        assert_eq!(edges[1].end_node, "0_v3");
    }

    #[test]
    fn test_build_edges_rejects_bad_shapes() {
        let graph = reference_patient();
        assert!(matches!(
            build_edges(&graph, &reference_population()),
            Err(ActGraphError::Dimension { .. })
        ));
        assert!(matches!(
            build_edges(&graph, &graph_from_entries(4, 2, &[])),
            Err(ActGraphError::ShapeMismatch { .. })
        ));
    }
}
