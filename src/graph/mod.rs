//! Activated patient graph: edge list and layout.
//!
//! Turns one patient's adjacency tensor plus the activation map of the
//! chosen filter into something a renderer can draw directly.
//!
//! ## Architecture
//!
//! ```text
//! patient graph (T,N,N) + activation map ──► extraction ──► Vec<EdgeRecord>
//!                                                               │
//!                                                            layout
//!                                                               │
//!                                                      Vec<NodePosition>
//!                                                               │
//!                                          ActivatedGraph (petgraph) ──► DOT
//! ```
//!
//! ## Modules
//!
//! - [`models`]: EdgeRecord, NodePosition, ActivatedGraph
//! - [`extraction`]: nonzero cells → typed edge list
//! - [`layout`]: symmetric, overlap-free node coordinates

pub mod extraction;
pub mod layout;
pub mod models;

pub use extraction::build_edges;
pub use layout::{
    extract_nodes, extract_visit_number, generate_sequence, layout_nodes, position_map,
};
pub use models::{
    node_id, ActivatedGraph, EdgeRecord, GraphEdge, GraphNode, NodePosition, ZERO_WEIGHT_SENTINEL,
};
