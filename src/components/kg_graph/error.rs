//! Error type for the few fallible operations around the graph view.
//!
//! None of these are fatal to the page: callers log them and fall back to an
//! informational state.

use thiserror::Error;

/// Errors raised while loading a graph or preparing its canvas.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The JSON payload does not match `{ nodes, edges }`.
	#[error("invalid graph payload: {0}")]
	Payload(#[from] serde_json::Error),

	/// A layout name outside `force`, `circular` and `hierarchical`.
	#[error("unknown layout `{0}` (expected force, circular or hierarchical)")]
	UnknownLayout(String),

	/// The canvas refused to hand out a 2d rendering context.
	#[error("canvas 2d context unavailable: {0}")]
	Context(String),
}
