//! Layout strategies: which initial placement a graph gets, and whether the
//! force simulation refines it afterwards.
//!
//! `Force` scatters nodes around the centre and lets the simulation settle
//! them. `Circular` and `Hierarchical` are closed-form and drawn once.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::types::{GraphEdge, GraphNode};

/// Nodes never get closer than this to the viewport border.
pub const NODE_RADIUS: f64 = 20.0;

/// Half-width of the square around the centre used for random scatter.
const SCATTER_SPREAD: f64 = 100.0;
/// Fraction of the smaller viewport side used as the circle radius.
const CIRCLE_RADIUS_FACTOR: f64 = 0.3;
/// Extra vertical margin above the first and below the last layer.
const LAYER_MARGIN: f64 = 40.0;

/// Size of the drawing surface in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
	/// Width in CSS pixels.
	pub width: f64,
	/// Height in CSS pixels.
	pub height: f64,
}

impl Viewport {
	/// Creates a viewport of the given size.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// A container that has not been laid out yet reports a zero size.
	pub fn is_measurable(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	/// Centre point of the surface.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// Surface area in square pixels.
	pub fn area(&self) -> f64 {
		self.width * self.height
	}

	/// Clamps a point so a node drawn there stays fully visible.
	pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
		(
			x.max(NODE_RADIUS).min(self.width - NODE_RADIUS),
			y.max(NODE_RADIUS).min(self.height - NODE_RADIUS),
		)
	}
}

/// Caller-selectable layout mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
	/// Random scatter refined by the force simulation.
	#[default]
	Force,
	/// Evenly spaced on a circle.
	Circular,
	/// Rows ordered along edge direction.
	Hierarchical,
}

impl LayoutKind {
	/// Every layout, in selector order.
	pub const ALL: [LayoutKind; 3] = [Self::Force, Self::Circular, Self::Hierarchical];

	/// Whether the simulation loop refines positions after initialization.
	pub fn is_iterative(self) -> bool {
		matches!(self, Self::Force)
	}

	/// Lowercase name, as accepted by `FromStr`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Force => "force",
			Self::Circular => "circular",
			Self::Hierarchical => "hierarchical",
		}
	}

	/// Human-readable name for the layout selector.
	pub fn title(self) -> &'static str {
		match self {
			Self::Force => "Force-based layout",
			Self::Circular => "Circular layout",
			Self::Hierarchical => "Hierarchical layout",
		}
	}

	/// Computes the starting position of every node, in input order.
	pub fn initial_positions<R: Rng>(
		self,
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		viewport: Viewport,
		rng: &mut R,
	) -> Vec<(f64, f64)> {
		match self {
			Self::Force => scatter_positions(nodes.len(), viewport, rng),
			Self::Circular => circular_positions(nodes.len(), viewport),
			Self::Hierarchical => layered_positions(nodes, edges, viewport),
		}
	}
}

impl fmt::Display for LayoutKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LayoutKind {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| GraphError::UnknownLayout(s.to_string()))
	}
}

/// Node `i` of `n` at angle `2πi/n` on a circle around the viewport centre.
pub fn circular_positions(n: usize, viewport: Viewport) -> Vec<(f64, f64)> {
	let (cx, cy) = viewport.center();
	let radius = viewport.width.min(viewport.height) * CIRCLE_RADIUS_FACTOR;
	(0..n)
		.map(|i| {
			let angle = (i as f64 / n as f64) * 2.0 * PI;
			(cx + angle.cos() * radius, cy + angle.sin() * radius)
		})
		.collect()
}

/// Uniform random points within ±100px of the viewport centre.
pub fn scatter_positions<R: Rng>(
	n: usize,
	viewport: Viewport,
	rng: &mut R,
) -> Vec<(f64, f64)> {
	let (cx, cy) = viewport.center();
	(0..n)
		.map(|_| {
			(
				cx + rng.gen_range(-SCATTER_SPREAD..=SCATTER_SPREAD),
				cy + rng.gen_range(-SCATTER_SPREAD..=SCATTER_SPREAD),
			)
		})
		.collect()
}

/// Longest-path layering along edge direction, one row per layer.
///
/// Roots (no incoming edges) sit on the top row. Cycles are cut off after `n`
/// relaxation passes, so every layer index stays below `n`.
pub fn layered_positions(
	nodes: &[GraphNode],
	edges: &[GraphEdge],
	viewport: Viewport,
) -> Vec<(f64, f64)> {
	let n = nodes.len();
	if n == 0 {
		return Vec::new();
	}

	let index: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.id.as_str(), i))
		.collect();
	let links: Vec<(usize, usize)> = edges
		.iter()
		.filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
		.filter(|(s, t)| s != t)
		.collect();

	let mut layer = vec![0usize; n];
	for _ in 0..n {
		let mut changed = false;
		for &(s, t) in &links {
			let candidate = layer[s] + 1;
			if candidate > layer[t] && candidate < n {
				layer[t] = candidate;
				changed = true;
			}
		}
		if !changed {
			break;
		}
	}

	let mut rows: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
	for (i, &l) in layer.iter().enumerate() {
		rows.entry(l).or_default().push(i);
	}

	let (_, cy) = viewport.center();
	let top = NODE_RADIUS + LAYER_MARGIN;
	let bottom = (viewport.height - NODE_RADIUS - LAYER_MARGIN).max(top);
	let row_count = rows.len();

	let mut positions = vec![(0.0, 0.0); n];
	for (rank, members) in rows.values().enumerate() {
		let y = if row_count == 1 {
			cy
		} else {
			top + (bottom - top) * rank as f64 / (row_count - 1) as f64
		};
		let m = members.len() as f64;
		for (j, &i) in members.iter().enumerate() {
			let x = viewport.width * (j as f64 + 1.0) / (m + 1.0);
			positions[i] = (x, y);
		}
	}
	positions
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::kg_graph::types::NodeKind;

	fn nodes(ids: &[&str]) -> Vec<GraphNode> {
		ids.iter()
			.map(|id| GraphNode::new(*id, *id, NodeKind::Capability))
			.collect()
	}

	#[test]
	fn parses_layout_names() {
		assert_eq!("force".parse::<LayoutKind>().unwrap(), LayoutKind::Force);
		assert_eq!(" Circular ".parse::<LayoutKind>().unwrap(), LayoutKind::Circular);
		assert_eq!(
			"hierarchical".parse::<LayoutKind>().unwrap(),
			LayoutKind::Hierarchical
		);
		assert!(matches!(
			"radial".parse::<LayoutKind>(),
			Err(GraphError::UnknownLayout(name)) if name == "radial"
		));
	}

	#[test]
	fn only_force_is_iterative() {
		assert!(LayoutKind::Force.is_iterative());
		assert!(!LayoutKind::Circular.is_iterative());
		assert!(!LayoutKind::Hierarchical.is_iterative());
	}

	#[test]
	fn two_node_circle_sits_on_horizontal_axis() {
		let viewport = Viewport::new(800.0, 600.0);
		let positions = circular_positions(2, viewport);
		let radius = 600.0 * 0.3;

		assert!((positions[0].0 - (400.0 + radius)).abs() < 1e-9);
		assert!((positions[0].1 - 300.0).abs() < 1e-9);
		assert!((positions[1].0 - (400.0 - radius)).abs() < 1e-9);
		assert!((positions[1].1 - 300.0).abs() < 1e-9);
	}

	#[test]
	fn scatter_stays_near_center() {
		let mut rng = SmallRng::seed_from_u64(7);
		let viewport = Viewport::new(1000.0, 800.0);
		for (x, y) in scatter_positions(200, viewport, &mut rng) {
			assert!((400.0..=600.0).contains(&x));
			assert!((300.0..=500.0).contains(&y));
		}
	}

	#[test]
	fn layers_follow_edge_direction() {
		let graph_nodes = nodes(&["query", "task", "cap1", "cap2", "agent"]);
		let edges = vec![
			GraphEdge::new("query", "task", "SOURCE_QUERY"),
			GraphEdge::new("task", "cap1", "REQUIRES_CAPABILITY"),
			GraphEdge::new("task", "cap2", "REQUIRES_CAPABILITY"),
			GraphEdge::new("agent", "cap1", "HAS_CAPABILITY"),
		];
		let viewport = Viewport::new(800.0, 600.0);

		let positions = layered_positions(&graph_nodes, &edges, viewport);

		// query and agent are roots
		assert_eq!(positions[0].1, positions[4].1);
		assert!(positions[0].1 < positions[1].1);
		assert!(positions[1].1 < positions[2].1);
		assert_eq!(positions[2].1, positions[3].1);
		assert_eq!(positions[0].1, NODE_RADIUS + LAYER_MARGIN);
		assert_eq!(positions[2].1, 600.0 - NODE_RADIUS - LAYER_MARGIN);
	}

	#[test]
	fn layering_survives_cycles_and_dangling_edges() {
		let graph_nodes = nodes(&["a", "b", "c"]);
		let edges = vec![
			GraphEdge::new("a", "b", "X"),
			GraphEdge::new("b", "c", "X"),
			GraphEdge::new("c", "a", "X"),
			GraphEdge::new("a", "ghost", "X"),
		];
		let viewport = Viewport::new(300.0, 300.0);

		let positions = layered_positions(&graph_nodes, &edges, viewport);

		assert_eq!(positions.len(), 3);
		for (x, y) in positions {
			assert!(x > 0.0 && x < 300.0);
			assert!(y >= NODE_RADIUS && y <= 300.0 - NODE_RADIUS);
		}
	}

	#[test]
	fn single_layer_is_centered_vertically() {
		let positions = layered_positions(&nodes(&["a", "b"]), &[], Viewport::new(300.0, 200.0));
		assert_eq!(positions, vec![(100.0, 100.0), (200.0, 100.0)]);
	}
}
