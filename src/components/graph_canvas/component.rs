//! Leptos component wrapping the argument graph canvas.
//!
//! The component creates an HTML canvas sized to its parent and wires mouse and
//! wheel handlers for selecting, dragging, panning, zooming and drawing new
//! relations. An animation loop runs via `requestAnimationFrame`, settling
//! newly placed claims and redrawing each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::scale::ScaleConfig;
use super::state::CanvasState;
use super::theme::Theme;
use crate::projector::Elements;
use crate::state::Selection;

/// Bundles canvas state with visual configuration.
struct CanvasContext {
	state: CanvasState,
	scale: ScaleConfig,
	theme: Theme,
}

type Shared<T> = Rc<RefCell<Option<T>>>;

/// What a mouse press landed on.
enum Press {
	Node(String),
	Edge(String),
	Background,
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Renders the argument graph and reports user intent through callbacks.
///
/// The canvas never mutates the graph itself: selecting, clearing and
/// connecting are forwarded to the owner, which feeds the outcome back through
/// `elements` and `selection`.
#[component]
pub fn GraphCanvas(
	#[prop(into)] elements: Signal<Elements>,
	#[prop(into)] selection: Signal<Selection>,
	/// When set, dragging from one claim to another proposes a relation.
	#[prop(into)]
	edge_mode: Signal<bool>,
	#[prop(into)] zoom_sensitivity: Signal<f64>,
	#[prop(into)] pan_sensitivity: Signal<f64>,
	#[prop(into)] on_node_select: Callback<String>,
	#[prop(into)] on_edge_select: Callback<String>,
	#[prop(into)] on_connect: Callback<(String, String)>,
	#[prop(into)] on_clear: Callback<()>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Shared<CanvasContext> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas: 2d context unavailable");
			return;
		};

		let theme = Theme::default();
		let mut state = CanvasState::new(w, h);
		elements.with_untracked(|els| state.sync(els, &theme));
		state.selected = selection.with_untracked(|s| s.id().map(str::to_string));
		*context_init.borrow_mut() = Some(CanvasContext {
			state,
			scale: ScaleConfig::default(),
			theme,
		});

		let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.state.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick(0.016);
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_sync = context.clone();
	Effect::new(move |_| {
		let selected = selection.with(|s| s.id().map(str::to_string));
		elements.with(|els| {
			if let Some(ref mut c) = *context_sync.borrow_mut() {
				if c.state.sync(els, &c.theme) {
					log::debug!(
						"canvas: synced {} claims, {} relations",
						els.nodes.len(),
						els.edges.len()
					);
				}
				c.state.selected = selected;
			}
		});
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let connecting = edge_mode.get_untracked();
		// The borrow must end before callbacks run: they update signals that
		// re-enter the sync effect.
		let press = {
			let mut guard = context_md.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			if let Some(id) = c.state.node_at_position(x, y) {
				if connecting {
					c.state.begin_draft(&id, x, y);
				} else {
					c.state.begin_drag(&id, x, y);
				}
				Press::Node(id)
			} else if let Some(id) = c.state.edge_at_position(x, y, &c.scale) {
				Press::Edge(id)
			} else {
				c.state.begin_pan(x, y);
				Press::Background
			}
		};
		match press {
			Press::Node(id) if !connecting => on_node_select.run(id),
			Press::Edge(id) => on_edge_select.run(id),
			_ => {}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.draft.is_some() {
				c.state.draft_to(x, y);
			} else if c.state.drag.node_id.is_some() {
				c.state.drag_to(x, y);
			} else if c.state.pan.active {
				c.state.pan_to(x, y, pan_sensitivity.get_untracked());
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let (connect, clicked) = {
			let mut guard = context_mu.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			let connect = c.state.finish_draft(x, y);
			(connect, c.state.release())
		};
		if let Some(pair) = connect {
			on_connect.run(pair);
		} else if clicked {
			on_clear.run(());
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.release();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = pointer(mouse) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let zoom_in = ev.delta_y() < 0.0;
			c.state
				.zoom_at(x, y, zoom_in, zoom_sensitivity.get_untracked(), &c.scale);
		}
	};

	let cursor = move || {
		if edge_mode.get() {
			"display: block; cursor: crosshair;"
		} else {
			"display: block; cursor: grab;"
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=cursor
		/>
	}
}
