//! Rendering of the knowledge graph.
//!
//! The renderer is a pure function of the scene: graph, positions, hover and
//! the selection inputs. It draws through the small [`Surface`] trait, which
//! the canvas 2d context implements. Passes, bottom to top:
//! 1. Background
//! 2. Edges, each with arrowhead and rotated type label
//! 3. Node circles
//! 4. Node labels

use std::collections::HashSet;

use web_sys::CanvasRenderingContext2d;

use super::layout::Viewport;
use super::positions::PositionStore;
use super::theme::{self, Color, RenderStyle};
use super::types::{GraphEdge, GraphNode};

type Point = (f64, f64);

/// Text drawn centred on an opaque backing rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBox<'a> {
	/// Text to draw.
	pub text: &'a str,
	/// CSS font shorthand.
	pub font: &'a str,
	/// Centre of the box.
	pub center: Point,
	/// Rotation around `center`, in radians.
	pub angle: f64,
	/// Backing rectangle width.
	pub width: f64,
	/// Backing rectangle height.
	pub height: f64,
	/// Backing rectangle fill.
	pub backing: Color,
	/// Text fill.
	pub color: Color,
	/// Opacity applied to backing and text alike.
	pub alpha: f64,
}

/// Minimal drawing backend used by [`render`].
pub trait Surface {
	/// Fills the whole viewport with `color`.
	fn clear(&mut self, viewport: Viewport, color: Color);
	/// Strokes a straight segment.
	fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64);
	/// Fills and outlines a circle.
	fn circle(&mut self, center: Point, radius: f64, fill: Color, border: Color, border_width: f64);
	/// Width of `text` in `font`, in pixels.
	fn measure_text(&mut self, text: &str, font: &str) -> f64;
	/// Draws a [`TextBox`].
	fn text_box(&mut self, text: &TextBox<'_>);
}

/// Everything the renderer reads for one frame.
pub struct Scene<'a> {
	/// Nodes in draw order; later nodes are drawn on top.
	pub nodes: &'a [GraphNode],
	/// Edges; those with unknown endpoints are skipped.
	pub edges: &'a [GraphEdge],
	/// Current positions, keyed by node id.
	pub positions: &'a PositionStore,
	/// Surface size.
	pub viewport: Viewport,
	/// Hovered node id, if it should be shown.
	pub hovered: Option<&'a str>,
	/// Nodes whose label equals this are drawn as selected.
	pub selected_agent: Option<&'a str>,
	/// Ids of nodes on the highlighted routing path.
	pub highlight: &'a HashSet<String>,
}

impl Scene<'_> {
	fn is_selected(&self, node: &GraphNode) -> bool {
		self.selected_agent.is_some_and(|label| label == node.label)
	}

	fn is_active(&self, node: &GraphNode) -> bool {
		self.is_selected(node) || self.hovered == Some(node.id.as_str())
	}

	/// Selected beats highlighted beats the type color.
	fn fill_color(&self, node: &GraphNode) -> Color {
		if self.is_selected(node) {
			theme::SELECTED
		} else if self.highlight.contains(&node.id) {
			theme::HIGHLIGHTED
		} else {
			theme::node_color(&node.kind)
		}
	}
}

/// Renders the complete graph to the surface.
pub fn render<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>, style: &RenderStyle) {
	surface.clear(scene.viewport, style.background);
	draw_edges(surface, scene, style);
	draw_nodes(surface, scene, style);
	draw_labels(surface, scene, style);
}

fn draw_edges<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>, style: &RenderStyle) {
	for edge in scene.edges {
		let (Some(source), Some(target)) = (
			scene.positions.get(&edge.source),
			scene.positions.get(&edge.target),
		) else {
			continue;
		};
		let (x1, y1, x2, y2) = (source.x, source.y, target.x, target.y);
		let angle = (y2 - y1).atan2(x2 - x1);
		let base = theme::edge_color(&edge.kind);
		let color = base.with_alpha(base.a * style.edge_alpha);

		surface.stroke_line((x1, y1), (x2, y2), color, style.edge_width);

		let tip = (
			x2 - style.arrow_inset * angle.cos(),
			y2 - style.arrow_inset * angle.sin(),
		);
		for side in [-style.arrow_angle, style.arrow_angle] {
			let barb = (
				tip.0 - style.arrow_length * (angle + side).cos(),
				tip.1 - style.arrow_length * (angle + side).sin(),
			);
			surface.stroke_line(tip, barb, color, style.edge_width);
		}

		let text_width = surface.measure_text(&edge.kind, style.edge_font);
		surface.text_box(&TextBox {
			text: &edge.kind,
			font: style.edge_font,
			center: ((x1 + x2) / 2.0, (y1 + y2) / 2.0),
			angle,
			width: text_width + 2.0 * style.edge_label_padding,
			height: style.edge_label_height,
			backing: style.edge_label_backing,
			color: theme::WHITE,
			alpha: style.edge_alpha,
		});
	}
}

fn node_radius(scene: &Scene<'_>, node: &GraphNode, style: &RenderStyle) -> f64 {
	if scene.is_active(node) {
		style.node_radius_active
	} else {
		style.node_radius
	}
}

fn draw_nodes<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>, style: &RenderStyle) {
	for node in scene.nodes {
		let Some(pos) = scene.positions.get(&node.id) else {
			continue;
		};
		let (border, border_width) = if scene.is_active(node) {
			(theme::WHITE, style.border_width_active)
		} else {
			(style.border_color, style.border_width)
		};
		surface.circle(
			(pos.x, pos.y),
			node_radius(scene, node, style),
			scene.fill_color(node),
			border,
			border_width,
		);
	}
}

fn draw_labels<S: Surface + ?Sized>(surface: &mut S, scene: &Scene<'_>, style: &RenderStyle) {
	for node in scene.nodes {
		let Some(pos) = scene.positions.get(&node.id) else {
			continue;
		};
		let text = truncate_label(&node.label, style.label_max_chars, style.label_keep_chars);
		let font = if scene.hovered == Some(node.id.as_str()) {
			style.node_font_bold
		} else {
			style.node_font
		};
		let text_width = surface.measure_text(&text, font);
		surface.text_box(&TextBox {
			text: &text,
			font,
			center: (
				pos.x,
				pos.y + node_radius(scene, node, style) + style.label_offset,
			),
			angle: 0.0,
			width: text_width + 2.0 * style.label_padding,
			height: style.label_height,
			backing: style.label_backing,
			color: theme::WHITE,
			alpha: 1.0,
		});
	}
}

/// Shortens labels longer than `max_chars` to `keep_chars` plus an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize, keep_chars: usize) -> String {
	if label.chars().count() > max_chars {
		let kept: String = label.chars().take(keep_chars).collect();
		format!("{kept}...")
	} else {
		label.to_string()
	}
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&mut self, viewport: Viewport, color: Color) {
		self.clear_rect(0.0, 0.0, viewport.width, viewport.height);
		self.set_fill_style_str(&color.to_css());
		self.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	}

	fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f64) {
		self.set_stroke_style_str(&color.to_css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn circle(&mut self, center: Point, radius: f64, fill: Color, border: Color, border_width: f64) {
		self.begin_path();
		let _ = self.arc(center.0, center.1, radius, 0.0, std::f64::consts::TAU);
		self.set_fill_style_str(&fill.to_css());
		self.fill();
		self.set_stroke_style_str(&border.to_css());
		self.set_line_width(border_width);
		self.stroke();
	}

	fn measure_text(&mut self, text: &str, font: &str) -> f64 {
		self.set_font(font);
		CanvasRenderingContext2d::measure_text(self, text)
			.map(|m| m.width())
			.unwrap_or(0.0)
	}

	fn text_box(&mut self, text: &TextBox<'_>) {
		self.save();
		self.set_global_alpha(text.alpha);
		let _ = self.translate(text.center.0, text.center.1);
		if text.angle != 0.0 {
			let _ = self.rotate(text.angle);
		}
		self.set_fill_style_str(&text.backing.to_css());
		self.fill_rect(-text.width / 2.0, -text.height / 2.0, text.width, text.height);
		self.set_font(text.font);
		self.set_text_align("center");
		self.set_text_baseline("middle");
		self.set_fill_style_str(&text.color.to_css());
		let _ = self.fill_text(text.text, 0.0, 0.0);
		self.restore();
	}
}

#[cfg(test)]
pub(crate) mod recording {
	//! A [`Surface`] that records draw calls for assertions.

	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	pub enum Shape {
		Line { from: Point, to: Point, color: Color },
		Circle { center: Point, radius: f64, fill: Color, border_width: f64 },
		Text { text: String, center: Point, font: String },
	}

	#[derive(Debug, Default)]
	pub struct Recorder {
		pub clears: usize,
		pub shapes: Vec<Shape>,
	}

	impl Recorder {
		pub fn lines(&self) -> usize {
			self.shapes
				.iter()
				.filter(|s| matches!(s, Shape::Line { .. }))
				.count()
		}

		pub fn circles(&self) -> Vec<(Point, f64, Color)> {
			self.shapes
				.iter()
				.filter_map(|s| match s {
					Shape::Circle {
						center,
						radius,
						fill,
						..
					} => Some((*center, *radius, *fill)),
					_ => None,
				})
				.collect()
		}

		pub fn texts(&self) -> Vec<&str> {
			self.shapes
				.iter()
				.filter_map(|s| match s {
					Shape::Text { text, .. } => Some(text.as_str()),
					_ => None,
				})
				.collect()
		}
	}

	impl Surface for Recorder {
		fn clear(&mut self, _viewport: Viewport, _color: Color) {
			self.clears += 1;
		}

		fn stroke_line(&mut self, from: Point, to: Point, color: Color, _width: f64) {
			self.shapes.push(Shape::Line { from, to, color });
		}

		fn circle(&mut self, center: Point, radius: f64, fill: Color, _border: Color, border_width: f64) {
			self.shapes.push(Shape::Circle {
				center,
				radius,
				fill,
				border_width,
			});
		}

		fn measure_text(&mut self, text: &str, _font: &str) -> f64 {
			text.chars().count() as f64 * 6.0
		}

		fn text_box(&mut self, text: &TextBox<'_>) {
			self.shapes.push(Shape::Text {
				text: text.text.to_string(),
				center: text.center,
				font: text.font.to_string(),
			});
		}
	}
}
