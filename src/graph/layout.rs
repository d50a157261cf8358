//! Deterministic 2D placement of patient graph nodes.
//!
//! Nodes are placed in columns by visit (`x`) and spread symmetrically
//! about `y = 0` within their column. A visit with a single node keeps it on
//! the `y = 0` spine; visits with more nodes skip 0 whenever the count is
//! even so the column stays balanced.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{ActGraphError, Result};

use super::models::{EdgeRecord, NodePosition};

/// Visit number encoded in a node id: `"5_v2"` → 2.
pub fn extract_visit_number(node_id: &str) -> Result<usize> {
    node_id
        .split_once('_')
        .and_then(|(_, visit)| visit.strip_prefix('v'))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| ActGraphError::MalformedNodeId(node_id.to_string()))
}

/// Distinct node ids of `edges`, in order of first appearance.
pub fn extract_nodes(edges: &[EdgeRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut nodes = Vec::new();
    for edge in edges {
        for id in [&edge.start_node, &edge.end_node] {
            if seen.insert(id.as_str()) {
                nodes.push(id.clone());
            }
        }
    }
    nodes
}

/// Candidate y offsets for visits of 1..=n nodes.
///
/// Entry `i` holds `i + 1` offsets: `-i/2..=i/2` for even `i`, and
/// `-(i/2 + 1)..=(i/2 + 1)` without 0 for odd `i`.
pub fn generate_sequence(n: usize) -> Vec<Vec<i64>> {
    (0..n as i64)
        .map(|i| {
            if i % 2 == 0 {
                (-i / 2..=i / 2).collect()
            } else {
                let half = i / 2 + 1;
                (-half..=half).filter(|&y| y != 0).collect()
            }
        })
        .collect()
}

/// Place every node of `edges`.
///
/// `x` is the visit number; `y` comes from [`generate_sequence`] indexed by
/// the visit's node count and the node's rank of appearance in that visit.
pub fn layout_nodes(edges: &[EdgeRecord]) -> Result<Vec<NodePosition>> {
    let nodes = extract_nodes(edges);

    let mut visit_counts: HashMap<usize, usize> = HashMap::new();
    let mut ranked = Vec::with_capacity(nodes.len());
    for node_id in nodes {
        let x = extract_visit_number(&node_id)?;
        let count = visit_counts.entry(x).or_insert(0);
        ranked.push((node_id, x, *count));
        *count += 1;
    }

    let widest = visit_counts.values().copied().max().unwrap_or(0);
    let sequence = generate_sequence(widest);
    debug!(
        "Laying out {} nodes over {} visits (widest visit has {})",
        ranked.len(),
        visit_counts.len(),
        widest
    );

    Ok(ranked
        .into_iter()
        .map(|(node_id, x, cumulative_count)| {
            let max_codes_per_visit = visit_counts[&x];
            NodePosition {
                node_id,
                x,
                y: sequence[max_codes_per_visit - 1][cumulative_count],
                cumulative_count,
                max_codes_per_visit,
            }
        })
        .collect())
}

/// Node id → (x, y) lookup for the renderer.
pub fn position_map(positions: &[NodePosition]) -> HashMap<String, (usize, i64)> {
    positions
        .iter()
        .map(|p| (p.node_id.clone(), (p.x, p.y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(start: &str, end: &str) -> EdgeRecord {
        EdgeRecord {
            start_node: start.to_string(),
            end_node: end.to_string(),
            activated: false,
            weight: 0.5,
            time_between: 1.0,
        }
    }

    fn reference_edges() -> Vec<EdgeRecord> {
        vec![
            edge("1_v0", "2_v1"),
            edge("2_v1", "1_v2"),
            edge("2_v1", "2_v2"),
            edge("1_v2", "1_v3"),
            edge("2_v2", "1_v3"),
            edge("1_v3", "0_v4"),
            edge("1_v3", "2_v4"),
        ]
    }

    #[test]
    fn test_extract_visit_number() {
        assert_eq!(extract_visit_number("5_v2").unwrap(), 2);
        assert_eq!(extract_visit_number("0_v13").unwrap(), 13);
        for bad in ["5v2", "5_x2", "5_v", "5_vx"] {
            assert!(matches!(
                extract_visit_number(bad),
                Err(ActGraphError::MalformedNodeId(_))
            ));
        }
    }

    #[test]
    fn test_generate_sequence_reference_rows() {
        let seq = generate_sequence(10);
        assert_eq!(seq.len(), 10);
        assert_eq!(seq[0], vec![0]);
        assert_eq!(seq[1], vec![-1, 1]);
        assert_eq!(seq[4], vec![-2, -1, 0, 1, 2]);
        assert_eq!(seq[7], vec![-4, -3, -2, -1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_generate_sequence_properties() {
        for (i, row) in generate_sequence(12).iter().enumerate() {
            assert_eq!(row.len(), i + 1);
            assert_eq!(row.contains(&0), i % 2 == 0);
            let mut mirrored: Vec<i64> = row.iter().map(|y| -y).collect();
            mirrored.sort();
            assert_eq!(&mirrored, row);
        }
        assert!(generate_sequence(0).is_empty());
    }

    #[test]
    fn test_extract_nodes_first_seen_order() {
        let nodes = extract_nodes(&reference_edges());
        assert_eq!(
            nodes,
            vec!["1_v0", "2_v1", "1_v2", "2_v2", "1_v3", "0_v4", "2_v4"]
        );
    }

    #[test]
    fn test_layout_nodes_reference_pathway() {
        let positions = layout_nodes(&reference_edges()).unwrap();
        let map = position_map(&positions);
        assert_eq!(map.len(), 7);
        assert_eq!(map["1_v0"], (0, 0));
        assert_eq!(map["2_v1"], (1, 0));
        assert_eq!(map["1_v2"], (2, -1));
        assert_eq!(map["2_v2"], (2, 1));
        assert_eq!(map["1_v3"], (3, 0));
        assert_eq!(map["0_v4"], (4, -1));
        assert_eq!(map["2_v4"], (4, 1));

        let v2 = positions.iter().find(|p| p.node_id == "2_v2").unwrap();
        assert_eq!(v2.cumulative_count, 1);
        assert_eq!(v2.max_codes_per_visit, 2);
    }

    #[test]
    fn test_layout_nodes_unique_y_within_visit() {
        let edges = vec![
            edge("0_v0", "1_v1"),
            edge("0_v0", "2_v1"),
            edge("0_v0", "3_v1"),
            edge("3_v1", "4_v2"),
            edge("2_v1", "4_v2"),
        ];
        let positions = layout_nodes(&edges).unwrap();
        let mut by_visit: HashMap<usize, Vec<i64>> = HashMap::new();
        for p in &positions {
            by_visit.entry(p.x).or_default().push(p.y);
        }
        let mut visit1 = by_visit[&1].clone();
        visit1.sort();
        assert_eq!(visit1, vec![-1, 0, 1]);
        assert_eq!(by_visit[&0], vec![0]);
        assert_eq!(by_visit[&2], vec![0]);
    }

    #[test]
    fn test_layout_nodes_empty_and_malformed() {
        assert!(layout_nodes(&[]).unwrap().is_empty());
        assert!(matches!(
            layout_nodes(&[edge("a", "b")]),
            Err(ActGraphError::MalformedNodeId(_))
        ));
    }
}
