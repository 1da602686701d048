//! Engine state for one knowledge-graph view.
//!
//! `GraphEngine` owns the loaded graph, the position store, the interaction
//! and simulation state. The host drives it through a handful of entry points
//! (load, layout switch, resize, frame, pointer events) and reads back
//! [`EngineUpdate`]s telling it whether to redraw or to start a frame loop.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::force::{self, ForceParams};
use super::interaction::{Cursor, InteractionState, PointerOutcome};
use super::layout::{LayoutKind, Viewport};
use super::positions::{PositionSnapshot, PositionStore};
use super::render::{self, Scene, Surface};
use super::simulation::{FrameAction, FrameToken, Simulation};
use super::theme::RenderStyle;
use super::types::GraphData;

/// What the view currently has to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphStatus {
	/// No payload was supplied.
	NoData,
	/// A payload arrived but contains no nodes.
	Empty,
	/// A graph with at least one node.
	Ready {
		/// Node count.
		nodes: usize,
		/// Edge count, dangling edges included.
		edges: usize,
	},
}

impl fmt::Display for GraphStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoData => {
				f.write_str("No graph data available. Please ensure the knowledge graph is seeded.")
			}
			Self::Empty => f.write_str("Knowledge graph is empty. Please seed it first."),
			Self::Ready { nodes, edges } => write!(f, "{nodes} nodes, {edges} relationships"),
		}
	}
}

/// What the host must do after an engine call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineUpdate {
	/// Nothing changed on screen.
	Idle,
	/// Draw one frame now.
	Redraw,
	/// Cancel any pending frame callback and schedule one carrying this token.
	Start(FrameToken),
}

/// Result of a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerResponse {
	/// Cursor to show over the surface.
	pub cursor: Cursor,
	/// Follow-up work for the host.
	pub update: EngineUpdate,
}

/// Browser-independent state of one graph view.
pub struct GraphEngine {
	graph: Option<GraphData>,
	/// Edges resolved to position slots; dangling edges are left out.
	links: Vec<(usize, usize)>,
	positions: PositionStore,
	interaction: InteractionState,
	simulation: Simulation,
	layout: LayoutKind,
	viewport: Viewport,
	params: ForceParams,
	style: RenderStyle,
	selected_agent: Option<String>,
	highlight: HashSet<String>,
	rng: SmallRng,
	/// Set while a load waits for the viewport to become measurable.
	pending: bool,
}

impl GraphEngine {
	/// Creates an engine with default physics and styling. `seed` drives the
	/// random force-layout scatter.
	pub fn new(seed: u64) -> Self {
		Self::with_config(seed, ForceParams::default(), RenderStyle::default())
	}

	/// Creates an engine with custom physics and styling.
	pub fn with_config(seed: u64, params: ForceParams, style: RenderStyle) -> Self {
		Self {
			graph: None,
			links: Vec::new(),
			positions: PositionStore::default(),
			interaction: InteractionState::default(),
			simulation: Simulation::new(&params),
			layout: LayoutKind::default(),
			viewport: Viewport::default(),
			params,
			style,
			selected_agent: None,
			highlight: HashSet::new(),
			rng: SmallRng::seed_from_u64(seed),
			pending: false,
		}
	}

	/// Which of no-data, empty and ready the view is in.
	pub fn status(&self) -> GraphStatus {
		match &self.graph {
			None => GraphStatus::NoData,
			Some(graph) if graph.is_empty() => GraphStatus::Empty,
			Some(graph) => GraphStatus::Ready {
				nodes: graph.nodes.len(),
				edges: graph.edges.len(),
			},
		}
	}

	/// Active layout.
	pub fn layout(&self) -> LayoutKind {
		self.layout
	}

	/// Last viewport passed to [`Self::resize`].
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Current positions.
	pub fn positions(&self) -> &PositionStore {
		&self.positions
	}

	/// Serializable copy of the current positions.
	pub fn snapshot(&self) -> Vec<PositionSnapshot> {
		self.positions.snapshot()
	}

	/// Whether the force loop still wants frames.
	pub fn is_running(&self) -> bool {
		self.simulation.is_running()
	}

	/// Whether a layout waits for a measurable viewport.
	pub fn is_pending(&self) -> bool {
		self.pending
	}

	/// Node under the pointer.
	pub fn hovered(&self) -> Option<&str> {
		self.interaction.hovered()
	}

	/// Replaces the graph and rebuilds all positions from scratch.
	pub fn load(&mut self, graph: Option<GraphData>) -> EngineUpdate {
		self.graph = graph;
		info!("kg-graph: {}", self.status());
		self.reinitialize()
	}

	/// Loads a graph under the given layout in a single rebuild.
	pub fn load_with_layout(&mut self, graph: Option<GraphData>, layout: LayoutKind) -> EngineUpdate {
		self.layout = layout;
		self.load(graph)
	}

	/// Switches layout; positions and pins are discarded.
	pub fn set_layout(&mut self, layout: LayoutKind) -> EngineUpdate {
		self.layout = layout;
		debug!("kg-graph: layout set to {layout}");
		self.reinitialize()
	}

	/// Adopts a new viewport size.
	///
	/// Shrinking to an unmeasurable size stops the loop and drops positions;
	/// the layout is rebuilt on the next measurable resize.
	pub fn resize(&mut self, viewport: Viewport) -> EngineUpdate {
		self.viewport = viewport;
		if self.pending || self.positions.is_empty() || !viewport.is_measurable() {
			return self.reinitialize();
		}
		if self.layout.is_iterative() {
			EngineUpdate::Start(self.simulation.arm())
		} else {
			EngineUpdate::Redraw
		}
	}

	/// Updates the selection inputs read by the renderer.
	pub fn set_selection(
		&mut self,
		selected_agent: Option<String>,
		highlight_path: impl IntoIterator<Item = String>,
	) -> EngineUpdate {
		self.selected_agent = selected_agent;
		self.highlight = highlight_path.into_iter().collect();
		EngineUpdate::Redraw
	}

	fn reinitialize(&mut self) -> EngineUpdate {
		self.simulation.cancel();
		self.interaction.reset();
		self.links.clear();
		self.positions = PositionStore::default();

		let Some(graph) = self.graph.as_ref().filter(|g| !g.is_empty()) else {
			self.pending = false;
			return EngineUpdate::Redraw;
		};
		if !self.viewport.is_measurable() {
			debug!("kg-graph: viewport not measurable yet, deferring layout");
			self.pending = true;
			return EngineUpdate::Idle;
		}
		self.pending = false;

		self.positions = PositionStore::initialize(
			&graph.nodes,
			&graph.edges,
			self.layout,
			self.viewport,
			&mut self.rng,
		);
		self.links = resolve_links(graph, &self.positions);

		if self.layout.is_iterative() {
			EngineUpdate::Start(self.simulation.arm())
		} else {
			EngineUpdate::Redraw
		}
	}

	/// Runs one display-refresh callback of the simulation loop.
	///
	/// Returns [`FrameAction::Skip`] for stale tokens; otherwise the force
	/// step has been applied and the caller should draw.
	pub fn frame(&mut self, token: FrameToken) -> FrameAction {
		if !self.viewport.is_measurable() {
			self.simulation.cancel();
			return FrameAction::Skip;
		}
		let action = self.simulation.on_frame(token);
		if action != FrameAction::Skip {
			force::step(&mut self.positions, &self.links, self.viewport, &self.params);
		}
		if action == FrameAction::Finish {
			debug!("kg-graph: simulation converged");
		}
		action
	}

	/// Pointer moved to `(x, y)` in surface coordinates.
	pub fn pointer_move(&mut self, x: f64, y: f64) -> PointerResponse {
		let outcome = self.interaction.pointer_move(&mut self.positions, x, y);
		self.respond(outcome)
	}

	/// Button pressed at `(x, y)`.
	pub fn pointer_down(&mut self, x: f64, y: f64) -> PointerResponse {
		let outcome = self.interaction.pointer_down(&mut self.positions, x, y);
		self.respond(outcome)
	}

	/// Button released anywhere.
	pub fn pointer_up(&mut self) -> PointerResponse {
		let outcome = self.interaction.pointer_up(&mut self.positions);
		self.respond(outcome)
	}

	/// Pointer left the surface.
	pub fn pointer_leave(&mut self) -> PointerResponse {
		let outcome = self.interaction.pointer_leave(&mut self.positions);
		self.respond(outcome)
	}

	/// Drag start and end re-arm the force loop so the graph reacts to the
	/// grabbed node and the released node settles back into the field.
	fn respond(&mut self, outcome: PointerOutcome) -> PointerResponse {
		let update = if outcome.drag_changed && self.layout.is_iterative() && !self.positions.is_empty() {
			EngineUpdate::Start(self.simulation.arm())
		} else if outcome.redraw {
			EngineUpdate::Redraw
		} else {
			EngineUpdate::Idle
		};
		PointerResponse {
			cursor: outcome.cursor,
			update,
		}
	}

	/// Draws the current frame.
	pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
		let (nodes, edges) = match &self.graph {
			Some(graph) => (graph.nodes.as_slice(), graph.edges.as_slice()),
			None => (&[][..], &[][..]),
		};
		let scene = Scene {
			nodes,
			edges,
			positions: &self.positions,
			viewport: self.viewport,
			hovered: self.interaction.displayed_hover(),
			selected_agent: self.selected_agent.as_deref(),
			highlight: &self.highlight,
		};
		render::render(surface, &scene, &self.style);
	}

	/// Stops the loop and releases the graph and positions.
	pub fn teardown(&mut self) {
		self.simulation.cancel();
		self.interaction.reset();
		self.positions = PositionStore::default();
		self.links.clear();
		self.graph = None;
		self.pending = false;
	}
}

fn resolve_links(graph: &GraphData, positions: &PositionStore) -> Vec<(usize, usize)> {
	let slots: HashMap<&str, usize> = graph
		.nodes
		.iter()
		.filter_map(|n| Some((n.id.as_str(), positions.slot(&n.id)?)))
		.collect();
	let links: Vec<(usize, usize)> = graph
		.edges
		.iter()
		.filter_map(|e| Some((*slots.get(e.source.as_str())?, *slots.get(e.target.as_str())?)))
		.collect();
	let dangling = graph.edges.len() - links.len();
	if dangling > 0 {
		debug!("kg-graph: {dangling} edges reference unknown nodes");
	}
	links
}
