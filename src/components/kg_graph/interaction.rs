//! Pointer interaction: hover tracking and node dragging.
//!
//! A drag pins the grabbed node in the position store for as long as the
//! button is held, so the force step leaves it alone. Releasing the button,
//! or leaving the canvas, always releases the pin.

use super::layout::NODE_RADIUS;
use super::positions::PositionStore;

/// Cursor shape hint for the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
	/// Over the background.
	#[default]
	Default,
	/// Over a node that can be dragged.
	Grab,
	/// While dragging.
	Grabbing,
}

impl Cursor {
	/// CSS `cursor` property value.
	pub fn as_css(self) -> &'static str {
		match self {
			Cursor::Default => "default",
			Cursor::Grab => "grab",
			Cursor::Grabbing => "grabbing",
		}
	}
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
	pub node_id: String,
	/// Pointer position minus node position at grab time.
	pub grab_offset: (f64, f64),
}

/// Result of handling one pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerOutcome {
	/// The frame must be redrawn now, regardless of the simulation loop.
	pub redraw: bool,
	/// A drag started or ended.
	pub drag_changed: bool,
	pub cursor: Cursor,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionState {
	hovered: Option<String>,
	drag: Option<DragState>,
}

impl InteractionState {
	pub fn hovered(&self) -> Option<&str> {
		self.hovered.as_deref()
	}

	pub fn drag(&self) -> Option<&DragState> {
		self.drag.as_ref()
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	/// Hover as it should be drawn: suppressed while a drag is active.
	pub fn displayed_hover(&self) -> Option<&str> {
		if self.is_dragging() {
			None
		} else {
			self.hovered()
		}
	}

	pub fn reset(&mut self) {
		self.hovered = None;
		self.drag = None;
	}

	pub fn pointer_move(&mut self, store: &mut PositionStore, x: f64, y: f64) -> PointerOutcome {
		if let Some(drag) = &self.drag {
			let (dx, dy) = drag.grab_offset;
			store.pin(&drag.node_id, x - dx, y - dy);
			return PointerOutcome {
				redraw: true,
				drag_changed: false,
				cursor: Cursor::Grabbing,
			};
		}

		let hit = node_at(store, x, y).map(str::to_string);
		let redraw = hit != self.hovered;
		let cursor = if hit.is_some() {
			Cursor::Grab
		} else {
			Cursor::Default
		};
		self.hovered = hit;
		PointerOutcome {
			redraw,
			drag_changed: false,
			cursor,
		}
	}

	pub fn pointer_down(&mut self, store: &mut PositionStore, x: f64, y: f64) -> PointerOutcome {
		// A second press without a release (e.g. another button) must not
		// leave the first node pinned.
		let mut released = self.release(store);

		let hit = node_at(store, x, y)
			.map(str::to_string)
			.and_then(|id| store.get(&id).copied().map(|record| (id, record)));
		if let Some((id, record)) = hit {
			store.pin(&id, record.x, record.y);
			self.drag = Some(DragState {
				node_id: id,
				grab_offset: (x - record.x, y - record.y),
			});
			return PointerOutcome {
				redraw: true,
				drag_changed: true,
				cursor: Cursor::Grabbing,
			};
		}

		released.cursor = Cursor::Default;
		released
	}

	pub fn pointer_up(&mut self, store: &mut PositionStore) -> PointerOutcome {
		self.release(store)
	}

	pub fn pointer_leave(&mut self, store: &mut PositionStore) -> PointerOutcome {
		let mut outcome = self.release(store);
		if self.hovered.take().is_some() {
			outcome.redraw = true;
		}
		outcome
	}

	fn release(&mut self, store: &mut PositionStore) -> PointerOutcome {
		match self.drag.take() {
			Some(drag) => {
				store.unpin(&drag.node_id);
				PointerOutcome {
					redraw: true,
					drag_changed: true,
					cursor: Cursor::Default,
				}
			}
			None => PointerOutcome::default(),
		}
	}
}

/// Returns the topmost node whose centre is within [`NODE_RADIUS`] of the point.
///
/// Nodes are drawn in store order, so later records win.
pub fn node_at(store: &PositionStore, x: f64, y: f64) -> Option<&str> {
	let mut found = None;
	for (id, record) in store.iter() {
		let (dx, dy) = (x - record.x, y - record.y);
		if (dx * dx + dy * dy).sqrt() <= NODE_RADIUS {
			found = Some(id);
		}
	}
	found
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::kg_graph::layout::{LayoutKind, Viewport};
	use crate::components::kg_graph::types::{GraphNode, NodeKind};

	/// Two nodes on a circle of radius 120 around (200, 200): a at (320, 200),
	/// b at (80, 200).
	fn store() -> PositionStore {
		let nodes = vec![
			GraphNode::new("a", "Alpha", NodeKind::Agent),
			GraphNode::new("b", "Beta", NodeKind::Capability),
		];
		PositionStore::initialize(
			&nodes,
			&[],
			LayoutKind::Circular,
			Viewport::new(400.0, 400.0),
			&mut SmallRng::seed_from_u64(0),
		)
	}

	#[test]
	fn hit_test_at_center_and_beyond_radius() {
		let store = store();
		assert_eq!(node_at(&store, 320.0, 200.0), Some("a"));
		assert_eq!(node_at(&store, 80.0, 200.0), Some("b"));
		assert_eq!(node_at(&store, 320.0, 220.0), Some("a"));
		assert_eq!(node_at(&store, 320.0, 220.5), None);
		assert_eq!(node_at(&store, 200.0, 200.0), None);
	}

	#[test]
	fn hover_follows_pointer() {
		let mut store = store();
		let mut state = InteractionState::default();

		let outcome = state.pointer_move(&mut store, 322.0, 199.0);
		assert_eq!(state.hovered(), Some("a"));
		assert_eq!(outcome.cursor, Cursor::Grab);
		assert!(outcome.redraw);

		let outcome = state.pointer_move(&mut store, 321.0, 199.0);
		assert!(!outcome.redraw);

		let outcome = state.pointer_move(&mut store, 10.0, 10.0);
		assert_eq!(state.hovered(), None);
		assert_eq!(outcome.cursor, Cursor::Default);
	}

	#[test]
	fn drag_pins_with_grab_offset_and_release_unpins() {
		let mut store = store();
		let mut state = InteractionState::default();
		state.pointer_move(&mut store, 325.0, 205.0);

		let outcome = state.pointer_down(&mut store, 325.0, 205.0);
		assert!(outcome.drag_changed);
		assert_eq!(outcome.cursor, Cursor::Grabbing);
		assert_eq!(state.drag().unwrap().grab_offset, (5.0, 5.0));
		assert!(store.get("a").unwrap().is_pinned());
		assert_eq!(state.displayed_hover(), None);

		let outcome = state.pointer_move(&mut store, 105.0, 55.0);
		assert!(outcome.redraw);
		assert_eq!(store.get("a").unwrap().pinned_at(), Some((100.0, 50.0)));
		assert_eq!(state.hovered(), Some("a"));

		let outcome = state.pointer_up(&mut store);
		assert!(outcome.drag_changed);
		assert!(!state.is_dragging());
		let record = store.get("a").unwrap();
		assert!(!record.is_pinned());
		assert_eq!((record.x, record.y), (100.0, 50.0));
	}

	#[test]
	fn leaving_the_surface_releases_the_pin() {
		let mut store = store();
		let mut state = InteractionState::default();
		state.pointer_down(&mut store, 80.0, 200.0);
		assert!(store.get("b").unwrap().is_pinned());

		let outcome = state.pointer_leave(&mut store);
		assert!(outcome.drag_changed);
		assert!(!store.get("b").unwrap().is_pinned());
		assert_eq!(state.hovered(), None);
	}

	#[test]
	fn press_on_background_does_not_drag() {
		let mut store = store();
		let mut state = InteractionState::default();

		let outcome = state.pointer_down(&mut store, 200.0, 200.0);
		assert!(!outcome.drag_changed);
		assert!(!state.is_dragging());
		assert!(store.iter().all(|(_, r)| !r.is_pinned()));
	}

	#[test]
	fn at_most_one_node_pinned_by_dragging() {
		let mut store = store();
		let mut state = InteractionState::default();
		state.pointer_down(&mut store, 320.0, 200.0);
		state.pointer_down(&mut store, 80.0, 200.0);

		assert!(!store.get("a").unwrap().is_pinned());
		assert!(store.get("b").unwrap().is_pinned());
		assert_eq!(state.drag().unwrap().node_id, "b");
	}
}
