//! Graph data structures for input to the knowledge graph component.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::GraphError;

/// Kind of a knowledge-graph node. Drives fill color, never identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
	/// A routing-capable agent.
	Agent,
	/// An agent restricted to a narrow set of tasks.
	SpecializedAgent,
	/// Something an agent can do.
	Capability,
	/// A category of incoming task.
	TaskType,
	/// A user query that was routed.
	Query,
	/// The outcome of routing one query.
	RoutingDecision,
	/// Any type string the renderer has no dedicated color for.
	Other(String),
	/// Missing or empty type.
	#[default]
	Unknown,
}

impl From<String> for NodeKind {
	fn from(value: String) -> Self {
		match value.as_str() {
			"Agent" => Self::Agent,
			"SpecializedAgent" => Self::SpecializedAgent,
			"Capability" => Self::Capability,
			"TaskType" => Self::TaskType,
			"Query" => Self::Query,
			"RoutingDecision" => Self::RoutingDecision,
			"" => Self::Unknown,
			_ => Self::Other(value),
		}
	}
}

impl From<NodeKind> for String {
	fn from(kind: NodeKind) -> Self {
		kind.to_string()
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Agent => "Agent",
			Self::SpecializedAgent => "SpecializedAgent",
			Self::Capability => "Capability",
			Self::TaskType => "TaskType",
			Self::Query => "Query",
			Self::RoutingDecision => "RoutingDecision",
			Self::Other(name) => name,
			Self::Unknown => "",
		};
		f.write_str(name)
	}
}

/// A node in the graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Display label, also matched against the selected agent name.
	#[serde(default)]
	pub label: String,
	/// Node type, serialized as `type`.
	#[serde(rename = "type", default)]
	pub kind: NodeKind,
	/// Opaque properties carried through from the data source.
	#[serde(default)]
	pub properties: Map<String, Value>,
}

impl GraphNode {
	/// Creates a node with no properties.
	pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind,
			properties: Map::new(),
		}
	}
}

/// A directed, typed edge between two nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Edge identifier; informational only.
	#[serde(default)]
	pub id: String,
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Relationship type (e.g. "HAS_CAPABILITY"), used for color and label.
	#[serde(rename = "type", default)]
	pub kind: String,
	/// Opaque properties carried through from the data source.
	#[serde(default)]
	pub properties: Map<String, Value>,
}

impl GraphEdge {
	/// Creates an edge whose id is `source->target`.
	pub fn new(
		source: impl Into<String>,
		target: impl Into<String>,
		kind: impl Into<String>,
	) -> Self {
		let (source, target) = (source.into(), target.into());
		Self {
			id: format!("{source}->{target}"),
			source,
			target,
			kind: kind.into(),
			properties: Map::new(),
		}
	}
}

/// Complete graph data: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// All nodes in the graph.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// All edges; endpoints may reference missing nodes.
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	/// Parses the `{ nodes, edges }` JSON payload.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		Ok(serde_json::from_str(text)?)
	}

	/// A graph without nodes has nothing to show, whatever its edges say.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
