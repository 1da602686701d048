//! Leptos component wrapping the knowledge graph canvas.
//!
//! The component owns one [`GraphEngine`] behind an `Rc<RefCell<..>>`, wires
//! canvas mouse events and window resizes into it, and runs the force loop
//! with `requestAnimationFrame`. Frames are requested only while the engine
//! reports the simulation as running; a converged graph costs nothing until
//! something re-arms it. Unmounting cancels the pending frame, tears the
//! engine down and removes the resize listener.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::__reexports::send_wrapper::SendWrapper;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, Window};

use super::engine::{EngineUpdate, GraphEngine, GraphStatus, PointerResponse};
use super::error::GraphError;
use super::layout::{LayoutKind, Viewport};
use super::simulation::{FrameAction, FrameToken};
use super::theme;
use super::types::GraphData;

/// Canvases shorter than this grow to it, whatever the container says.
const MIN_HEIGHT: f64 = 600.0;

/// How the canvas derives its size.
#[derive(Clone, Copy, Debug)]
struct Sizing {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl Sizing {
	fn measure(self, canvas: &HtmlCanvasElement) -> Viewport {
		if self.fullscreen {
			let window = web_sys::window();
			let dim = |v: Option<Result<JsValue, JsValue>>| {
				v.and_then(Result::ok).and_then(|v| v.as_f64()).unwrap_or(0.0)
			};
			return Viewport::new(
				dim(window.as_ref().map(Window::inner_width)),
				dim(window.as_ref().map(Window::inner_height)),
			);
		}
		let parent = canvas.parent_element();
		let width = self.width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.unwrap_or(0.0)
		});
		let height = self.height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| (p.client_height() as f64).max(MIN_HEIGHT))
				.unwrap_or(MIN_HEIGHT)
		});
		Viewport::new(width, height)
	}
}

/// Engine plus the canvas it draws on.
struct GraphContext {
	engine: GraphEngine,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	sizing: Sizing,
	/// Pending `requestAnimationFrame` handle.
	frame_handle: Option<i32>,
	/// Window resize listener, removed on detach.
	on_resize: Closure<dyn FnMut()>,
}

impl GraphContext {
	fn draw(&mut self) {
		self.engine.draw(&mut self.ctx);
	}

	fn pointer_position(&self, ev: &MouseEvent) -> (f64, f64) {
		let rect = self.canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	}

	fn set_cursor(&self, response: &PointerResponse) {
		let _ = web_sys::HtmlElement::style(&self.canvas).set_property("cursor", response.cursor.as_css());
	}
}

type Shared = Rc<RefCell<Option<GraphContext>>>;

/// Creates the graph context on first use. Returns `Ok(false)` until the
/// canvas is mounted, and after the component has been unmounted.
fn attach(
	shared: &Shared,
	canvas: Option<HtmlCanvasElement>,
	sizing: Sizing,
	alive: &Arc<AtomicBool>,
) -> Result<bool, GraphError> {
	if !alive.load(Ordering::Relaxed) {
		return Ok(false);
	}
	if shared.borrow().is_some() {
		return Ok(true);
	}
	let Some(canvas) = canvas else {
		return Ok(false);
	};

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|e| GraphError::Context(format!("{e:?}")))?
		.ok_or_else(|| GraphError::Context("2d context not supported".into()))?
		.dyn_into()
		.map_err(|_| GraphError::Context("unexpected context type".into()))?;

	let viewport = sizing.measure(&canvas);
	canvas.set_width(viewport.width as u32);
	canvas.set_height(viewport.height as u32);

	let mut engine = GraphEngine::new(js_sys::Date::now() as u64);
	engine.resize(viewport);

	let on_resize = resize_listener(Rc::downgrade(shared));
	if let Some(window) = web_sys::window() {
		let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
	}

	*shared.borrow_mut() = Some(GraphContext {
		engine,
		canvas,
		ctx,
		sizing,
		frame_handle: None,
		on_resize,
	});

	Ok(true)
}

/// The listener holds a weak handle so it never keeps a detached context alive.
fn resize_listener(shared: Weak<RefCell<Option<GraphContext>>>) -> Closure<dyn FnMut()> {
	Closure::<dyn FnMut()>::new(move || {
		let Some(shared) = shared.upgrade() else {
			return;
		};
		let update = {
			let mut guard = shared.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			let viewport = c.sizing.measure(&c.canvas);
			c.canvas.set_width(viewport.width as u32);
			c.canvas.set_height(viewport.height as u32);
			c.engine.resize(viewport)
		};
		apply(&shared, update);
	})
}

/// Drops the graph context: cancels the pending frame, tears the engine down
/// and unregisters the resize listener.
fn detach(shared: &Shared) {
	let Some(mut c) = shared.borrow_mut().take() else {
		return;
	};
	cancel_frame(&mut c);
	c.engine.teardown();
	if let Some(window) = web_sys::window() {
		let _ = window.remove_event_listener_with_callback("resize", c.on_resize.as_ref().unchecked_ref());
	}
	debug!("kg-graph: detached");
}

/// Runs `f` against the engine, if attached, and applies its update.
fn with_engine(shared: &Shared, f: impl FnOnce(&mut GraphEngine) -> EngineUpdate) {
	let update = match shared.borrow_mut().as_mut() {
		Some(c) => f(&mut c.engine),
		None => return,
	};
	apply(shared, update);
}

fn apply(shared: &Shared, update: EngineUpdate) {
	match update {
		EngineUpdate::Idle => {}
		EngineUpdate::Redraw => {
			if let Some(c) = shared.borrow_mut().as_mut() {
				c.draw();
			}
		}
		EngineUpdate::Start(token) => {
			if let Some(c) = shared.borrow_mut().as_mut() {
				cancel_frame(c);
				c.draw();
			}
			schedule_frame(shared, token);
		}
	}
}

fn cancel_frame(c: &mut GraphContext) {
	if let (Some(handle), Some(window)) = (c.frame_handle.take(), web_sys::window()) {
		let _ = window.cancel_animation_frame(handle);
	}
}

fn schedule_frame(shared: &Shared, token: FrameToken) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let next = shared.clone();
	let callback = Closure::once_into_js(move || run_frame(&next, token));
	match window.request_animation_frame(callback.unchecked_ref()) {
		Ok(handle) => {
			if let Some(c) = shared.borrow_mut().as_mut() {
				c.frame_handle = Some(handle);
			}
		}
		Err(e) => warn!("kg-graph: requestAnimationFrame failed: {e:?}"),
	}
}

fn run_frame(shared: &Shared, token: FrameToken) {
	let action = {
		let mut guard = shared.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		c.frame_handle = None;
		let action = c.engine.frame(token);
		if action != FrameAction::Skip {
			c.draw();
		}
		action
	};
	if action == FrameAction::Step {
		schedule_frame(shared, token);
	}
}

/// Renders an interactive knowledge graph on a canvas element.
///
/// `data` is the decoded `{ nodes, edges }` payload; `None` shows the
/// "no data" state and an empty payload the "empty graph" state. Nodes whose
/// label equals `selected_agent` and nodes listed in `highlight_path` are
/// drawn with override colors. The layout can be switched from the built-in
/// selector.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] data: Signal<Option<GraphData>>,
	#[prop(optional, into)] selected_agent: MaybeProp<String>,
	#[prop(optional, into)] highlight_path: MaybeProp<Vec<String>>,
	#[prop(default = LayoutKind::Force)] initial_layout: LayoutKind,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let shared: Shared = Rc::new(RefCell::new(None));
	let sizing = Sizing {
		fullscreen,
		width,
		height,
	};
	let (layout, set_layout) = signal(initial_layout);
	let (status, set_status) = signal(GraphStatus::NoData);

	let alive = Arc::new(AtomicBool::new(true));
	let (alive_cleanup, shared_cleanup) = (alive.clone(), SendWrapper::new(shared.clone()));
	on_cleanup(move || {
		alive_cleanup.store(false, Ordering::Relaxed);
		detach(&shared_cleanup);
	});

	let (shared_load, alive_load) = (shared.clone(), alive.clone());
	Effect::new(move |_| {
		let graph = data.get();
		let layout = layout.get();
		match attach(&shared_load, canvas_ref.get(), sizing, &alive_load) {
			Ok(true) => {}
			Ok(false) => return,
			Err(e) => {
				warn!("kg-graph: {e}");
				return;
			}
		}
		with_engine(&shared_load, |engine| engine.load_with_layout(graph, layout));
		if let Some(c) = shared_load.borrow().as_ref() {
			set_status.set(c.engine.status());
		}
	});

	let (shared_select, alive_select) = (shared.clone(), alive.clone());
	Effect::new(move |_| {
		let selected = selected_agent.get();
		let path = highlight_path.get().unwrap_or_default();
		if let Ok(true) = attach(&shared_select, canvas_ref.get(), sizing, &alive_select) {
			with_engine(&shared_select, |engine| engine.set_selection(selected, path));
		}
	});

	let shared_md = shared.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let response = {
			let mut guard = shared_md.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			let (x, y) = c.pointer_position(&ev);
			let response = c.engine.pointer_down(x, y);
			c.set_cursor(&response);
			response
		};
		apply(&shared_md, response.update);
	};

	let shared_mm = shared.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let response = {
			let mut guard = shared_mm.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			let (x, y) = c.pointer_position(&ev);
			let response = c.engine.pointer_move(x, y);
			c.set_cursor(&response);
			response
		};
		apply(&shared_mm, response.update);
	};

	let shared_mu = shared.clone();
	let on_mouseup = move |_: MouseEvent| {
		let response = {
			let mut guard = shared_mu.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			let response = c.engine.pointer_up();
			c.set_cursor(&response);
			response
		};
		apply(&shared_mu, response.update);
	};

	let shared_ml = shared.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let response = {
			let mut guard = shared_ml.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			let response = c.engine.pointer_leave();
			c.set_cursor(&response);
			response
		};
		apply(&shared_ml, response.update);
	};

	let on_layout_change = move |ev: Event| match event_target_value(&ev).parse::<LayoutKind>() {
		Ok(kind) => set_layout.set(kind),
		Err(e) => warn!("kg-graph: {e}"),
	};

	view! {
		<div class="kg-visualization">
			<div class="visualization-header">
				<h3>"Knowledge Graph Visualization"</h3>
				<div class="layout-selector">
					<label for="layout-select">"Layout: "</label>
					<select id="layout-select" class="layout-dropdown" on:change=on_layout_change>
						{LayoutKind::ALL
							.into_iter()
							.map(|kind| {
								view! {
									<option value=kind.as_str() selected=move || layout.get() == kind>
										{kind.title()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</div>
			</div>
			<div class="visualization-legend">
				{theme::legend()
					.into_iter()
					.map(|(name, color)| {
						view! {
							<div class="legend-item">
								<span class="legend-color" style=format!("background-color: {color}")></span>
								<span>{name}</span>
							</div>
						}
					})
					.collect_view()}
			</div>
			<div class="kg-canvas-container">
				<canvas
					node_ref=canvas_ref
					class="kg-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					style="display: block; cursor: default;"
				/>
				{move || match status.get() {
					GraphStatus::Ready { .. } => {
						view! {
							<div class="visualization-info">
								<p class="muted small">{status.get().to_string()}</p>
							</div>
						}
							.into_any()
					}
					other => {
						view! {
							<div class="visualization-error">
								<p>{other.to_string()}</p>
							</div>
						}
							.into_any()
					}
				}}
			</div>
		</div>
	}
}
