//! Activated-graph data models.
//!
//! ## Tables
//! - [`EdgeRecord`]: one edge of a patient graph with its activation weight
//! - [`NodePosition`]: layout coordinates of one node
//!
//! ## Renderer hand-off
//! - [`ActivatedGraph`]: petgraph wrapper with ID ↔ NodeIndex mapping,
//!   exportable as Graphviz DOT

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::{EdgeRef, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Weight written over zero activations so the edge still shows up when drawn.
///
/// A genuine activation of exactly 0.5 cannot be told apart from it; use
/// [`EdgeRecord::activated`] to distinguish.
pub const ZERO_WEIGHT_SENTINEL: f64 = 0.5;

/// Node id for entity `index` at `visit`, e.g. `"2_v1"`.
pub fn node_id(index: usize, visit: usize) -> String {
    format!("{}_v{}", index, visit)
}

// ============================================================================
// Tables
// ============================================================================

/// One nonzero cell of a patient graph, as a directed edge between visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub start_node: String,
    pub end_node: String,
    /// True when the filter's activation on this cell was nonzero.
    pub activated: bool,
    /// Activation value, or [`ZERO_WEIGHT_SENTINEL`] when it was zero.
    pub weight: f64,
    /// Original cell value (time between the two visits).
    pub time_between: f64,
}

/// Layout coordinates of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePosition {
    pub node_id: String,
    /// Visit number parsed from the node id.
    pub x: usize,
    /// Symmetric offset about 0 within the visit column.
    pub y: i64,
    /// Rank of first appearance within the visit.
    pub cumulative_count: usize,
    /// Number of nodes sharing this visit.
    pub max_codes_per_visit: usize,
}

// ============================================================================
// ActivatedGraph: petgraph wrapper with ID mapping
// ============================================================================

/// Node payload: id plus its layout coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub x: usize,
    pub y: i64,
}

/// Edge payload carried into the directed graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub activated: bool,
    pub weight: f64,
    pub time_between: f64,
}

/// DOT label: the node id.
impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// DOT label: time between the two visits.
impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time_between)
    }
}

/// Directed patient graph ready for drawing.
///
/// Nodes are placed at their layout coordinates; activated edges are meant
/// to be emphasised, `weight` drives line width and `time_between` is the
/// edge label.
#[derive(Debug, Clone, Default)]
pub struct ActivatedGraph {
    pub graph: DiGraph<GraphNode, GraphEdge>,
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl ActivatedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an edge list and its layout. Edges whose endpoints have no
    /// position are skipped.
    pub fn from_layout(edges: &[EdgeRecord], positions: &[NodePosition]) -> Self {
        let mut g = Self::new();
        for pos in positions {
            g.add_node(GraphNode {
                id: pos.node_id.clone(),
                x: pos.x,
                y: pos.y,
            });
        }
        for edge in edges {
            g.add_edge(
                &edge.start_node,
                &edge.end_node,
                GraphEdge {
                    activated: edge.activated,
                    weight: edge.weight,
                    time_between: edge.time_between,
                },
            );
        }
        g
    }

    /// Add a node, returning the existing index if the id is already present.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_to_index.insert(id, idx);
        idx
    }

    /// Add an edge between two known node ids. Returns `None` if either is missing.
    pub fn add_edge(&mut self, from_id: &str, to_id: &str, edge: GraphEdge) -> Option<EdgeIndex> {
        let from_idx = self.id_to_index.get(from_id)?;
        let to_idx = self.id_to_index.get(to_id)?;
        Some(self.graph.add_edge(*from_idx, *to_idx, edge))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges flagged as activated, as (start id, end id, weight).
    pub fn activated_edges(&self) -> Vec<(&str, &str, f64)> {
        self.graph
            .edge_references()
            .filter(|e| e.weight().activated)
            .map(|e| {
                (
                    self.graph[e.source()].id.as_str(),
                    self.graph[e.target()].id.as_str(),
                    e.weight().weight,
                )
            })
            .collect()
    }

    /// Graphviz DOT text: activated edges red, others grey, `penwidth` is
    /// the weight and the label is `time_between`. Node positions are pinned,
    /// so render with `neato -n` to keep them.
    pub fn dot(&self) -> String {
        Dot::with_attr_getters(
            &self.graph,
            &[],
            &|_, edge| {
                let data = edge.weight();
                let color = if data.activated { "red" } else { "grey" };
                format!("color={} penwidth={}", color, data.weight)
            },
            &|_, node| {
                let data = node.weight();
                format!("shape=circle pos=\"{},{}!\"", data.x, data.y)
            },
        )
        .to_string()
    }
}
