//! kg-graph: Interactive knowledge-graph visualization.
//!
//! This crate provides a WASM-based graph visualization component that renders
//! agent-routing knowledge graphs with force-directed, circular and layered
//! layouts, hover highlighting, and node dragging.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::kg_graph::{
	GraphData, GraphEdge, GraphEngine, GraphError, GraphNode, GraphStatus, KnowledgeGraphCanvas,
	LayoutKind, NodeKind,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("kg-graph: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], edges: [...] }
///
/// A missing element or an unparsable payload both mean "no data"; an empty
/// node list is passed through so the view can tell the two apart.
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match GraphData::from_json(&json_text) {
		Ok(data) => {
			info!(
				"kg-graph: loaded {} nodes, {} edges",
				data.nodes.len(),
				data.edges.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("kg-graph: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads graph data from DOM and renders the knowledge graph visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data();
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Knowledge Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<KnowledgeGraphCanvas data=graph_signal />
			<div class="graph-overlay">
				<p class="subtitle">"Hover to inspect. Drag nodes to reposition."</p>
			</div>
		</div>
	}
}
