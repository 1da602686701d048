//! Per-node simulated positions, keyed by node id.
//!
//! The store is an arena: records live in a `Vec` in graph order and a map
//! resolves node ids to slots. Everything outside the force step goes through
//! `set`/`pin`/`unpin`, which keep the pinned invariant (`x, y == fx, fy`).

use std::collections::HashMap;

use log::debug;
use rand::Rng;
use serde::Serialize;

use super::layout::{LayoutKind, Viewport};
use super::types::{GraphEdge, GraphNode};

/// Simulated state of a single node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionRecord {
	/// Horizontal position of the node centre.
	pub x: f64,
	/// Vertical position of the node centre.
	pub y: f64,
	/// Horizontal velocity from the last force step.
	pub vx: f64,
	/// Vertical velocity from the last force step.
	pub vy: f64,
	pinned: Option<(f64, f64)>,
}

impl PositionRecord {
	fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			..Self::default()
		}
	}

	/// Whether a drag currently holds this node in place.
	pub fn is_pinned(&self) -> bool {
		self.pinned.is_some()
	}

	/// The fixed point of a pinned node.
	pub fn pinned_at(&self) -> Option<(f64, f64)> {
		self.pinned
	}
}

/// Exported view of one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionSnapshot {
	/// Node id.
	pub id: String,
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Whether the node was pinned at snapshot time.
	pub pinned: bool,
}

/// Simulated positions of every node in the loaded graph.
#[derive(Clone, Debug, Default)]
pub struct PositionStore {
	ids: Vec<String>,
	pub(super) records: Vec<PositionRecord>,
	index: HashMap<String, usize>,
}

impl PositionStore {
	/// Creates one record per node, placed according to `layout`.
	///
	/// Duplicate ids keep their first occurrence.
	pub fn initialize<R: Rng>(
		nodes: &[GraphNode],
		edges: &[GraphEdge],
		layout: LayoutKind,
		viewport: Viewport,
		rng: &mut R,
	) -> Self {
		let placements = layout.initial_positions(nodes, edges, viewport, rng);
		let mut store = Self::default();

		for (node, (x, y)) in nodes.iter().zip(placements) {
			if store.index.contains_key(&node.id) {
				debug!("kg-graph: skipping duplicate node id {}", node.id);
				continue;
			}
			store.index.insert(node.id.clone(), store.records.len());
			store.ids.push(node.id.clone());
			store.records.push(PositionRecord::at(x, y));
		}
		store
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// True before any graph has been laid out.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Whether a record exists for `id`.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	pub(super) fn slot(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Looks up a record by node id.
	pub fn get(&self, id: &str) -> Option<&PositionRecord> {
		self.slot(id).map(|i| &self.records[i])
	}

	/// Moves an unpinned node. Pinned nodes only move through [`Self::pin`].
	pub fn set(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(record) = self.slot(id).map(|i| &mut self.records[i]) else {
			return false;
		};
		if record.is_pinned() {
			return false;
		}
		record.x = x;
		record.y = y;
		true
	}

	/// Fixes a node at `(x, y)` and zeroes its velocity.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(record) = self.slot(id).map(|i| &mut self.records[i]) else {
			return false;
		};
		record.pinned = Some((x, y));
		record.x = x;
		record.y = y;
		record.vx = 0.0;
		record.vy = 0.0;
		true
	}

	/// Releases a pin. The node keeps its current position.
	pub fn unpin(&mut self, id: &str) -> bool {
		match self.slot(id).map(|i| &mut self.records[i]) {
			Some(record) => record.pinned.take().is_some(),
			None => false,
		}
	}

	/// Records with their ids, in graph order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PositionRecord)> {
		self.ids
			.iter()
			.map(String::as_str)
			.zip(self.records.iter())
	}

	/// Serializable copy of every position.
	pub fn snapshot(&self) -> Vec<PositionSnapshot> {
		self.iter()
			.map(|(id, r)| PositionSnapshot {
				id: id.to_string(),
				x: r.x,
				y: r.y,
				pinned: r.is_pinned(),
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::kg_graph::types::NodeKind;

	fn store(ids: &[&str]) -> PositionStore {
		let nodes: Vec<GraphNode> = ids
			.iter()
			.map(|id| GraphNode::new(*id, *id, NodeKind::Agent))
			.collect();
		PositionStore::initialize(
			&nodes,
			&[],
			LayoutKind::Circular,
			Viewport::new(400.0, 400.0),
			&mut SmallRng::seed_from_u64(1),
		)
	}

	#[test]
	fn one_record_per_node() {
		let store = store(&["a", "b", "c", "a"]);
		assert_eq!(store.len(), 3);
		assert!(store.contains("c"));
		assert!(store.get("missing").is_none());
	}

	#[test]
	fn pin_forces_position_and_blocks_set() {
		let mut store = store(&["a", "b"]);

		assert!(store.pin("a", 10.0, 15.0));
		let record = store.get("a").unwrap();
		assert_eq!((record.x, record.y), (10.0, 15.0));
		assert_eq!(record.pinned_at(), Some((10.0, 15.0)));

		assert!(!store.set("a", 99.0, 99.0));
		assert_eq!(store.get("a").unwrap().x, 10.0);

		assert!(store.unpin("a"));
		assert!(!store.get("a").unwrap().is_pinned());
		assert!(store.set("a", 99.0, 98.0));
		assert_eq!(store.get("a").unwrap().y, 98.0);
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let mut store = store(&["a"]);
		assert!(!store.set("zz", 1.0, 1.0));
		assert!(!store.pin("zz", 1.0, 1.0));
		assert!(!store.unpin("zz"));
		assert!(!store.unpin("a"));
	}

	#[test]
	fn snapshot_lists_records_in_graph_order() {
		let mut store = store(&["a", "b"]);
		store.pin("b", 5.0, 6.0);

		let snapshot = store.snapshot();
		assert_eq!(snapshot[0].id, "a");
		assert_eq!(
			snapshot[1],
			PositionSnapshot {
				id: "b".into(),
				x: 5.0,
				y: 6.0,
				pinned: true,
			}
		);
		let json = serde_json::to_value(&snapshot).unwrap();
		assert_eq!(json[1]["pinned"], true);
	}
}
