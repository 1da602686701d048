//! Two-force iterative layout: all-pairs repulsion plus edge attraction.
//!
//! Each step recomputes velocities from scratch, damps them, integrates, and
//! clamps nodes inside the viewport. Cost is O(n²) in the node count, fine for
//! the few hundred nodes a knowledge-graph view shows.

use super::layout::Viewport;
use super::positions::PositionStore;

/// Tunable constants of the force simulation.
#[derive(Clone, Debug)]
pub struct ForceParams {
	/// Scale applied to every force before it becomes a velocity impulse.
	pub impulse_scale: f64,
	/// Velocity multiplier applied once per step.
	pub friction: f64,
	/// Alpha decrement per step.
	pub alpha_decay: f64,
	/// The loop stops once alpha falls to this value.
	pub alpha_min: f64,
}

impl Default for ForceParams {
	fn default() -> Self {
		Self {
			impulse_scale: 0.01,
			friction: 0.6,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
		}
	}
}

/// Characteristic spacing: larger graphs in the same area sit closer.
pub fn ideal_distance(viewport: Viewport, node_count: usize) -> f64 {
	(viewport.area() / node_count.max(1) as f64).sqrt()
}

/// Advances every unpinned node by one step.
///
/// Does nothing when the viewport has no area to lay nodes out in.
///
/// `links` are resolved slot pairs (source, target) into the store; edges
/// whose endpoints are missing must already be filtered out.
pub fn step(
	store: &mut PositionStore,
	links: &[(usize, usize)],
	viewport: Viewport,
	params: &ForceParams,
) {
	let n = store.records.len();
	if n == 0 || !viewport.is_measurable() {
		return;
	}
	let k = ideal_distance(viewport, n);
	let scale = params.impulse_scale;
	let records = &mut store.records;

	for r in records.iter_mut().filter(|r| !r.is_pinned()) {
		r.vx = 0.0;
		r.vy = 0.0;
	}

	// Pinned nodes push others away but never move themselves.
	for i in 0..n {
		if records[i].is_pinned() {
			continue;
		}
		let (mut ax, mut ay) = (0.0, 0.0);
		for j in 0..n {
			if i == j {
				continue;
			}
			let (dx, dy) = (records[i].x - records[j].x, records[i].y - records[j].y);
			let len = (dx * dx + dy * dy).sqrt();
			let dist = len.max(1.0);
			let force = k * k / dist;
			ax += dx / dist * force * scale;
			ay += dy / dist * force * scale;
		}
		records[i].vx += ax;
		records[i].vy += ay;
	}

	for &(s, t) in links {
		if s == t || records[s].is_pinned() || records[t].is_pinned() {
			continue;
		}
		let (dx, dy) = (records[t].x - records[s].x, records[t].y - records[s].y);
		let dist = (dx * dx + dy * dy).sqrt().max(1.0);
		let force = dist * dist / k;
		let (fx, fy) = (dx / dist * force * scale, dy / dist * force * scale);
		records[s].vx += fx;
		records[s].vy += fy;
		records[t].vx -= fx;
		records[t].vy -= fy;
	}

	for r in records.iter_mut().filter(|r| !r.is_pinned()) {
		r.vx *= params.friction;
		r.vy *= params.friction;
		(r.x, r.y) = viewport.clamp(r.x + r.vx, r.y + r.vy);
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::kg_graph::layout::{LayoutKind, NODE_RADIUS};
	use crate::components::kg_graph::types::{GraphNode, NodeKind};

	fn force_store(n: usize, viewport: Viewport, seed: u64) -> PositionStore {
		let nodes: Vec<GraphNode> = (0..n)
			.map(|i| GraphNode::new(i.to_string(), format!("n{i}"), NodeKind::Capability))
			.collect();
		PositionStore::initialize(
			&nodes,
			&[],
			LayoutKind::Force,
			viewport,
			&mut SmallRng::seed_from_u64(seed),
		)
	}

	fn distance(store: &PositionStore, a: &str, b: &str) -> f64 {
		let (a, b) = (store.get(a).unwrap(), store.get(b).unwrap());
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn unpinned_nodes_stay_inside_viewport() {
		let viewport = Viewport::new(300.0, 200.0);
		let mut store = force_store(40, viewport, 3);
		let links: Vec<(usize, usize)> = (1..40).map(|i| (i, i / 2)).collect();

		for _ in 0..60 {
			step(&mut store, &links, viewport, &ForceParams::default());
			for (_, r) in store.iter() {
				assert!(r.x >= NODE_RADIUS && r.x <= viewport.width - NODE_RADIUS);
				assert!(r.y >= NODE_RADIUS && r.y <= viewport.height - NODE_RADIUS);
			}
		}
	}

	#[test]
	fn pinned_node_does_not_move() {
		let viewport = Viewport::new(800.0, 600.0);
		let mut store = force_store(10, viewport, 11);
		store.pin("4", 123.0, 456.0);
		let links = vec![(4, 0), (4, 1), (2, 4)];

		for _ in 0..50 {
			step(&mut store, &links, viewport, &ForceParams::default());
		}

		let record = store.get("4").unwrap();
		assert_eq!((record.x, record.y), (123.0, 456.0));
	}

	#[test]
	fn pinned_node_still_repels_neighbours() {
		let viewport = Viewport::new(800.0, 600.0);
		let mut store = force_store(2, viewport, 5);
		store.pin("0", 400.0, 300.0);
		store.set("1", 410.0, 300.0);

		step(&mut store, &[], viewport, &ForceParams::default());

		let (pinned, pushed) = (store.get("0").unwrap(), store.get("1").unwrap());
		assert_eq!((pinned.x, pinned.y), (400.0, 300.0));
		assert!(pushed.x > 410.0);
	}

	#[test]
	fn unmeasurable_viewport_leaves_positions_alone() {
		let mut store = force_store(3, Viewport::new(400.0, 400.0), 2);
		let before = store.snapshot();

		step(&mut store, &[(0, 1)], Viewport::new(0.0, 0.0), &ForceParams::default());

		assert_eq!(store.snapshot(), before);
	}

	#[test]
	fn disconnected_nodes_repel() {
		let viewport = Viewport::new(800.0, 600.0);
		let mut store = force_store(2, viewport, 5);
		store.set("0", 390.0, 300.0);
		store.set("1", 410.0, 300.0);

		step(&mut store, &[], viewport, &ForceParams::default());

		assert!(distance(&store, "0", "1") > 20.0);
	}

	#[test]
	fn long_edges_pull_endpoints_together() {
		let viewport = Viewport::new(2000.0, 2000.0);
		let mut store = force_store(2, viewport, 5);
		store.set("0", 100.0, 1000.0);
		store.set("1", 1900.0, 1000.0);

		step(&mut store, &[(0, 1)], viewport, &ForceParams::default());

		assert!(distance(&store, "0", "1") < 1800.0);
	}

	#[test]
	fn coincident_nodes_do_not_produce_nan() {
		let viewport = Viewport::new(400.0, 400.0);
		let mut store = force_store(3, viewport, 9);
		for id in ["0", "1", "2"] {
			store.set(id, 200.0, 200.0);
		}

		step(&mut store, &[(0, 1)], viewport, &ForceParams::default());

		for (_, r) in store.iter() {
			assert!(r.x.is_finite() && r.y.is_finite());
		}
	}

	#[test]
	fn empty_store_is_a_no_op() {
		let viewport = Viewport::new(400.0, 400.0);
		let mut store = force_store(0, viewport, 1);
		step(&mut store, &[], viewport, &ForceParams::default());
		assert!(store.is_empty());
	}
}
