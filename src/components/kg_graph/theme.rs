//! Fixed color tables and visual constants for the knowledge graph.

use super::types::NodeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at a different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Hex for opaque colors, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Opaque white.
pub const WHITE: Color = Color::rgb(255, 255, 255);
/// Fill for a node whose label matches the selected agent.
pub const SELECTED: Color = Color::rgb(0x4c, 0xaf, 0x50);
/// Fill for a node on the highlighted routing path.
pub const HIGHLIGHTED: Color = Color::rgb(0xff, 0xc1, 0x07);
const NODE_FALLBACK: Color = Color::rgb(0xc0, 0xc0, 0xc0);
const EDGE_FALLBACK: Color = Color::rgba(192, 192, 192, 0.5);

/// Fill color keyed by node type; silver for anything unrecognized.
pub fn node_color(kind: &NodeKind) -> Color {
	match kind {
		NodeKind::Agent | NodeKind::SpecializedAgent => Color::rgb(0xff, 0xd7, 0x00),
		NodeKind::Capability => Color::rgb(0x90, 0xee, 0x90),
		NodeKind::TaskType => Color::rgb(0x87, 0xce, 0xeb),
		NodeKind::Query => Color::rgb(0xff, 0xb6, 0xc1),
		NodeKind::RoutingDecision => Color::rgb(0xdd, 0xa0, 0xdd),
		NodeKind::Other(_) | NodeKind::Unknown => NODE_FALLBACK,
	}
}

/// Node kinds listed in the on-screen legend, in display order.
pub const LEGEND_KINDS: [NodeKind; 4] = [
	NodeKind::Agent,
	NodeKind::Capability,
	NodeKind::TaskType,
	NodeKind::Query,
];

/// Legend entries as `(name, css color)`, taken from the node fill table.
pub fn legend() -> Vec<(String, String)> {
	LEGEND_KINDS
		.into_iter()
		.map(|kind| {
			let color = node_color(&kind).to_css();
			(kind.to_string(), color)
		})
		.collect()
}

/// Stroke color keyed by relationship type.
pub fn edge_color(kind: &str) -> Color {
	match kind {
		"HAS_CAPABILITY" => Color::rgba(144, 238, 144, 0.6),
		"REQUIRES_CAPABILITY" => Color::rgba(135, 206, 235, 0.6),
		"ROUTED_TO" => Color::rgba(221, 160, 221, 0.6),
		"SOURCE_QUERY" => Color::rgba(255, 182, 193, 0.6),
		"FALLBACK_AGENT" => Color::rgba(255, 215, 0, 0.6),
		_ => EDGE_FALLBACK,
	}
}

/// Sizes, fonts and label limits used by the renderer.
#[derive(Clone, Debug)]
pub struct RenderStyle {
	/// Surface fill behind everything.
	pub background: Color,
	/// Radius of an idle node.
	pub node_radius: f64,
	/// Radius of a hovered or selected node.
	pub node_radius_active: f64,
	/// Border width of an idle node.
	pub border_width: f64,
	/// Border width of a hovered or selected node.
	pub border_width_active: f64,
	/// Border color of an idle node.
	pub border_color: Color,
	/// Edge line width.
	pub edge_width: f64,
	/// Opacity of edges and their labels.
	pub edge_alpha: f64,
	/// Length of each arrowhead stroke.
	pub arrow_length: f64,
	/// Half-angle of the arrowhead, in radians.
	pub arrow_angle: f64,
	/// Distance from the target centre back to the arrow tip.
	pub arrow_inset: f64,
	/// Font of edge type labels.
	pub edge_font: &'static str,
	/// Height of the edge label backing.
	pub edge_label_height: f64,
	/// Horizontal padding on each side of an edge label.
	pub edge_label_padding: f64,
	/// Font of node labels.
	pub node_font: &'static str,
	/// Font of the hovered node's label.
	pub node_font_bold: &'static str,
	/// Height of the node label backing.
	pub label_height: f64,
	/// Horizontal padding on each side of a node label.
	pub label_padding: f64,
	/// Gap between the node's edge and the label centre.
	pub label_offset: f64,
	/// Node label backing fill.
	pub label_backing: Color,
	/// Edge label backing fill.
	pub edge_label_backing: Color,
	/// Labels longer than this are truncated.
	pub label_max_chars: usize,
	/// Characters kept before the ellipsis.
	pub label_keep_chars: usize,
}

impl Default for RenderStyle {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			node_radius: 18.0,
			node_radius_active: 22.0,
			border_width: 2.0,
			border_width_active: 3.0,
			border_color: Color::rgba(255, 255, 255, 0.5),
			edge_width: 1.5,
			edge_alpha: 0.6,
			arrow_length: 6.0,
			arrow_angle: std::f64::consts::PI / 6.0,
			arrow_inset: 18.0,
			edge_font: "10px -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif",
			edge_label_height: 14.0,
			edge_label_padding: 3.0,
			node_font: "11px -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif",
			node_font_bold: "bold 11px -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif",
			label_height: 16.0,
			label_padding: 4.0,
			label_offset: 12.0,
			label_backing: Color::rgba(0, 0, 0, 0.75),
			edge_label_backing: Color::rgba(0, 0, 0, 0.7),
			label_max_chars: 18,
			label_keep_chars: 15,
		}
	}
}
