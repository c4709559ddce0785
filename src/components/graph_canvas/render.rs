//! Canvas rendering for the argument graph.
//!
//! Passes, in z-order:
//! 1. Background (screen space)
//! 2. Relations with arrow heads, then their labels (world space)
//! 3. Claim boxes with wrapped text and score badges
//! 4. The draft line while a relation is being drawn

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{CanvasState, EdgeInfo, NodeBox, NodeInfo};
use super::theme::Theme;

const TEXT_PADDING: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;

/// Renders the complete graph to the canvas.
pub fn render(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	let boxes = state.boxes();
	draw_edges(state, ctx, &boxes, &scale, theme);
	draw_nodes(state, ctx, config, &scale, theme);
	draw_draft(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(state: &CanvasState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				state.width.max(state.height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	boxes: &HashMap<DefaultNodeIdx, NodeBox>,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let mut labels = Vec::with_capacity(state.edges.len());

	for edge in &state.edges {
		let (Some(a), Some(b)) = (boxes.get(&edge.source), boxes.get(&edge.target)) else {
			continue;
		};
		let selected = state.selected.as_deref() == Some(edge.id.as_str());
		let color = if selected {
			theme.edge.selected
		} else {
			edge.color
		};
		let width = if selected {
			scale.line_width + scale.selected_width
		} else {
			scale.line_width
		};

		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_fill_style_str(&color.to_css());
		ctx.set_line_width(width);

		let anchor = if edge.source == edge.target {
			draw_self_loop(ctx, a, scale)
		} else {
			let (x1, y1) = a.border_point(b.x, b.y);
			let (x2, y2) = b.border_point(a.x, a.y);
			ctx.begin_path();
			ctx.move_to(x1, y1);
			ctx.line_to(x2, y2);
			ctx.stroke();
			draw_arrow_head(ctx, (x1, y1), (x2, y2), scale.arrow_size);
			((x1 + x2) / 2.0, (y1 + y2) / 2.0)
		};
		labels.push((edge, anchor));
	}

	if scale.edge_label_alpha > 0.0 {
		ctx.set_font(&scale.edge_label_font);
		ctx.set_global_alpha(scale.edge_label_alpha);
		for (edge, (x, y)) in labels {
			draw_edge_label(ctx, edge, x, y, scale, theme);
		}
		ctx.set_global_alpha(1.0);
	}
}

/// Draws a loop above the box and returns its label anchor.
fn draw_self_loop(ctx: &CanvasRenderingContext2d, b: &NodeBox, scale: &ScaledValues) -> (f64, f64) {
	let (cx, cy, r) = b.loop_circle();
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, 0.0, 2.0 * PI);
	ctx.stroke();
	let tip = (cx + r, cy);
	draw_arrow_head(ctx, (tip.0, tip.1 - 1.0), tip, scale.arrow_size);
	(cx, cy - r)
}

fn draw_arrow_head(ctx: &CanvasRenderingContext2d, from: (f64, f64), tip: (f64, f64), size: f64) {
	let angle = (tip.1 - from.1).atan2(tip.0 - from.0);
	let spread = PI / 7.0;
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(
		tip.0 - size * (angle - spread).cos(),
		tip.1 - size * (angle - spread).sin(),
	);
	ctx.line_to(
		tip.0 - size * (angle + spread).cos(),
		tip.1 - size * (angle + spread).sin(),
	);
	ctx.close_path();
	ctx.fill();
}

fn draw_edge_label(
	ctx: &CanvasRenderingContext2d,
	edge: &EdgeInfo,
	x: f64,
	y: f64,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let text_width = ctx
		.measure_text(&edge.label)
		.map(|m| m.width())
		.unwrap_or(edge.label.len() as f64 * 6.0 / scale.k);
	let pad = 3.0 / scale.k;
	let height = 14.0 / scale.k;

	ctx.set_fill_style_str(&theme.edge.label_background.to_css());
	ctx.fill_rect(
		x - text_width / 2.0 - pad,
		y - height / 2.0,
		text_width + 2.0 * pad,
		height,
	);
	ctx.set_fill_style_str(&theme.edge.label.to_css());
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&edge.label, x, y);
}

fn draw_nodes(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let mut selected = None;
	state.graph.visit_nodes(|node| {
		if state.selected.as_deref() == Some(node.data.user_data.id.as_str()) {
			selected = Some(node.index());
		} else {
			draw_node(ctx, node, config, scale, theme, false);
		}
	});
	if let Some(idx) = selected {
		state.graph.visit_nodes(|node| {
			if node.index() == idx {
				draw_node(ctx, node, config, scale, theme, true);
			}
		});
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	node: &force_graph::Node<NodeInfo>,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
	selected: bool,
) {
	let info = &node.data.user_data;
	let (x, y) = (node.x() as f64, node.y() as f64);
	let (left, top) = (x - info.width / 2.0, y - info.height / 2.0);

	rounded_rect(ctx, left, top, info.width, info.height, theme.node.corner_radius);
	let gradient = ctx.create_linear_gradient(left, top, left, top + info.height);
	let _ = gradient.add_color_stop(0.0, &info.color.lighten(0.15).to_css());
	let _ = gradient.add_color_stop(1.0, &info.color.darken(0.1).to_css());
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();

	if selected {
		ctx.set_stroke_style_str(&theme.node.selected.to_css());
		ctx.set_line_width(scale.line_width + scale.selected_width);
	} else {
		ctx.set_stroke_style_str(&theme.node.border.to_css());
		ctx.set_line_width(scale.line_width);
	}
	ctx.stroke();

	ctx.set_font(&scale.label_font);
	ctx.set_fill_style_str(&theme.node.text.to_css());
	ctx.set_text_align("left");
	ctx.set_text_baseline("middle");
	for (i, line) in info.lines.iter().enumerate() {
		let ly = top + TEXT_PADDING + LINE_HEIGHT * (i as f64 + 0.5);
		let _ = ctx.fill_text(line, left + TEXT_PADDING, ly);
	}

	if let Some(badge) = &info.badge {
		draw_badge(ctx, badge, left + info.width, top, config, theme);
	}
}

/// Score pill straddling the top-right corner of a claim box.
fn draw_badge(
	ctx: &CanvasRenderingContext2d,
	text: &str,
	right: f64,
	top: f64,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let size = config.label_size * 0.85;
	ctx.set_font(&format!("bold {size}px sans-serif"));
	let text_width = ctx
		.measure_text(text)
		.map(|m| m.width())
		.unwrap_or(text.len() as f64 * size * 0.6);
	let (w, h) = (text_width + 10.0, size + 6.0);
	let (bx, by) = (right - w + 4.0, top - h / 2.0);

	rounded_rect(ctx, bx, by, w, h, h / 2.0);
	ctx.set_fill_style_str(&theme.node.badge_fill.to_css());
	ctx.fill();
	ctx.set_fill_style_str(&theme.node.badge_text.to_css());
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(text, bx + w / 2.0, by + h / 2.0);
}

fn draw_draft(
	state: &CanvasState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let Some(draft) = &state.draft else {
		return;
	};
	let Some(source) = state.node_box(&draft.source_id) else {
		return;
	};
	let (x1, y1) = source.border_point(draft.x, draft.y);

	ctx.set_stroke_style_str(&theme.edge.draft.to_css());
	ctx.set_fill_style_str(&theme.edge.draft.to_css());
	ctx.set_line_width(scale.line_width);
	let dash = js_sys::Array::of2(&(6.0 / scale.k).into(), &(4.0 / scale.k).into());
	let _ = ctx.set_line_dash(&dash);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(draft.x, draft.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	draw_arrow_head(ctx, (x1, y1), (draft.x, draft.y), scale.arrow_size);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	ctx.line_to(x + w - r, y);
	ctx.quadratic_curve_to(x + w, y, x + w, y + r);
	ctx.line_to(x + w, y + h - r);
	ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
	ctx.line_to(x + r, y + h);
	ctx.quadratic_curve_to(x, y + h, x, y + h - r);
	ctx.line_to(x, y + r);
	ctx.quadratic_curve_to(x, y, x + r, y);
	ctx.close_path();
}
