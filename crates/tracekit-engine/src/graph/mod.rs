//! Flow graph: nodes are registry entries, edges are accepted transfers.

pub mod builder;
pub mod flow_graph;
pub mod temporal;

pub use builder::FlowGraphBuilder;
pub use flow_graph::{FlowEdge, FlowGraph, FlowNode};
