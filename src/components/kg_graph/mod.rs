//! Knowledge graph visualization component.
//!
//! Renders an interactive node-link diagram of agents, capabilities, task
//! types, queries and routing decisions on an HTML canvas with:
//! - Force-directed layout that settles within a bounded number of frames
//! - Static circular and layered (hierarchical) layouts
//! - Hover highlighting and node dragging with pinning
//! - Selection and routing-path color overrides
//!
//! The engine ([`GraphEngine`]) is independent of the browser; the canvas and
//! `requestAnimationFrame` wiring live in [`KnowledgeGraphCanvas`].
//!
//! # Example
//!
//! ```ignore
//! use kg_graph::{GraphData, GraphEdge, GraphNode, KnowledgeGraphCanvas, NodeKind};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode::new("a", "Router", NodeKind::Agent),
//!         GraphNode::new("b", "search", NodeKind::Capability),
//!     ],
//!     edges: vec![GraphEdge::new("a", "b", "HAS_CAPABILITY")],
//! };
//!
//! view! { <KnowledgeGraphCanvas data=Signal::derive(move || Some(data.clone())) /> }
//! ```

mod component;
mod engine;
mod error;
mod force;
mod interaction;
pub mod layout;
mod positions;
mod render;
mod simulation;
pub mod theme;
mod types;

pub use component::KnowledgeGraphCanvas;
pub use engine::{EngineUpdate, GraphEngine, GraphStatus, PointerResponse};
pub use error::GraphError;
pub use force::ForceParams;
pub use interaction::Cursor;
pub use layout::{LayoutKind, Viewport};
pub use positions::{PositionRecord, PositionSnapshot, PositionStore};
pub use render::{Scene, Surface, TextBox, render, truncate_label};
pub use simulation::{FrameAction, FrameToken};
pub use theme::RenderStyle;
pub use types::{GraphData, GraphEdge, GraphNode, NodeKind};
