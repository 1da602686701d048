//! UI components.

pub mod kg_graph;
