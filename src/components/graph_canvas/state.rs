//! Canvas simulation state and interaction tracking.
//!
//! Wraps the `force_graph` simulation with per-claim box metadata, the pan/zoom
//! transform, and in-progress gestures (dragging a claim, panning, drawing a
//! new relation). Nodes are addressed by claim id at the API boundary; the
//! simulation's indices are rebuilt on every [`CanvasState::sync`].

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::layout::layered_positions;
use super::scale::{ScaleConfig, ScaledValues};
use super::theme::{Color, Theme};
use crate::projector::Elements;

/// Seconds the simulation keeps running after new claims arrive.
const SETTLE_SECONDS: f64 = 1.5;
/// Pointer travel (px) below which a pan gesture still counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Per-claim display metadata attached to each simulation node.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: String,
	pub lines: Vec<String>,
	pub width: f64,
	pub height: f64,
	pub badge: Option<String>,
	pub color: Color,
}

/// A relation resolved to simulation indices.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub id: String,
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: String,
	pub color: Color,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

/// Tracks an in-progress claim drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	/// Set once the pointer travels further than a click would.
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Rubber-band line from a source claim to the pointer while connecting.
#[derive(Clone, Debug)]
pub struct EdgeDraft {
	pub source_id: String,
	/// Pointer position in world space.
	pub x: f64,
	pub y: f64,
}

/// Core canvas state, created when the component mounts and mutated by the
/// event handlers and the animation loop.
pub struct CanvasState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub draft: Option<EdgeDraft>,
	/// Id of the highlighted claim or relation.
	pub selected: Option<String>,
	pub width: f64,
	pub height: f64,
	index: HashMap<String, DefaultNodeIdx>,
	elements: Elements,
	settle: f64,
}

fn simulation() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 400.0,
		force_spring: 0.02,
		force_max: 60.0,
		node_speed: 2000.0,
		damping_factor: 0.8,
	})
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: simulation(),
			edges: Vec::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			draft: None,
			selected: None,
			width,
			height,
			index: HashMap::new(),
			elements: Elements::default(),
			settle: 0.0,
		}
	}

	/// Replaces the drawn element set. Claims already on the canvas keep their
	/// position; new claims are placed by [`layered_positions`]. Returns `false`
	/// when `elements` is unchanged.
	pub fn sync(&mut self, elements: &Elements, theme: &Theme) -> bool {
		if *elements == self.elements {
			return false;
		}

		let mut previous: HashMap<String, (f32, f32, bool)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(
				node.data.user_data.id.clone(),
				(node.x(), node.y(), node.data.is_anchor),
			);
		});
		let layout = if elements.nodes.iter().all(|n| previous.contains_key(&n.id)) {
			HashMap::new()
		} else {
			layered_positions(elements)
		};

		let mut graph = simulation();
		let mut index = HashMap::with_capacity(elements.nodes.len());
		let mut placed_new = false;
		for node in &elements.nodes {
			let (x, y, is_anchor) = match previous.get(&node.id) {
				Some(&known) => known,
				None => {
					placed_new = true;
					let (x, y) = layout.get(&node.id).copied().unwrap_or_default();
					(x as f32, y as f32, false)
				}
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo {
					id: node.id.clone(),
					lines: node.lines.clone(),
					width: node.width,
					height: node.height,
					badge: node.badge.clone(),
					color: theme.unit_color(node.unit_type),
				},
			});
			index.insert(node.id.clone(), idx);
		}

		let mut edges = Vec::with_capacity(elements.edges.len());
		for edge in &elements.edges {
			let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target))
			else {
				log::debug!("skipping relation {} with a missing endpoint", edge.id);
				continue;
			};
			if source != target {
				graph.add_edge(source, target, EdgeData::default());
			}
			edges.push(EdgeInfo {
				id: edge.id.clone(),
				source,
				target,
				label: edge.label.clone(),
				color: theme.relation_color(edge.kind),
			});
		}

		self.graph = graph;
		self.edges = edges;
		self.index = index;
		self.elements = elements.clone();
		if placed_new {
			self.settle = SETTLE_SECONDS;
		}
		if self.drag.node_id.as_ref().is_some_and(|id| !self.index.contains_key(id)) {
			self.drag = DragState::default();
		}
		if self
			.draft
			.as_ref()
			.is_some_and(|d| !self.index.contains_key(&d.source_id))
		{
			self.draft = None;
		}
		true
	}

	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// World-space centre of a claim.
	pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn node_box(&self, id: &str) -> Option<NodeBox> {
		let idx = self.index.get(id)?;
		self.boxes().remove(idx)
	}

	/// Centre and half extents of every node, keyed by simulation index.
	pub fn boxes(&self) -> HashMap<DefaultNodeIdx, NodeBox> {
		let mut boxes = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			boxes.insert(
				node.index(),
				NodeBox {
					x: node.x() as f64,
					y: node.y() as f64,
					half_w: info.width / 2.0,
					half_h: info.height / 2.0,
				},
			);
		});
		boxes
	}

	/// Topmost claim under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			let (dx, dy) = ((node.x() as f64 - gx).abs(), (node.y() as f64 - gy).abs());
			if dx <= info.width / 2.0 && dy <= info.height / 2.0 {
				found = Some(info.id.clone());
			}
		});
		found
	}

	/// Relation closest to a screen position, within the hit tolerance.
	pub fn edge_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let tolerance = ScaledValues::new(config, self.transform.k).edge_hit_tolerance;
		let boxes = self.boxes();

		let mut best: Option<(f64, &str)> = None;
		for edge in &self.edges {
			let (Some(a), Some(b)) = (boxes.get(&edge.source), boxes.get(&edge.target)) else {
				continue;
			};
			let d = if edge.source == edge.target {
				let (cx, cy, r) = a.loop_circle();
				((gx - cx).hypot(gy - cy) - r).abs()
			} else {
				segment_distance((gx, gy), (a.x, a.y), (b.x, b.y))
			};
			if d <= tolerance && best.is_none_or(|(bd, _)| d < bd) {
				best = Some((d, &edge.id));
			}
		}
		best.map(|(_, id)| id.to_string())
	}

	pub fn begin_drag(&mut self, id: &str, sx: f64, sy: f64) {
		let Some((x, y)) = self.node_position(id) else {
			return;
		};
		self.drag = DragState {
			node_id: Some(id.to_string()),
			start_x: sx,
			start_y: sy,
			node_start_x: x as f32,
			node_start_y: y as f32,
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_id.as_ref().and_then(|id| self.index.get(id)).copied() else {
			return;
		};
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		let (nx, ny) = (
			self.drag.node_start_x + dx as f32,
			self.drag.node_start_y + dy as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
				node.data.is_anchor = true;
			}
		});
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			moved: false,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Moves the view with the pointer, scaled by `sensitivity`. The view
	/// stays put until the pointer leaves the click slop.
	pub fn pan_to(&mut self, sx: f64, sy: f64, sensitivity: f64) {
		let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
		if !self.pan.moved {
			if dx.hypot(dy) <= CLICK_SLOP {
				return;
			}
			self.pan.moved = true;
		}
		self.transform.x = self.pan.transform_start_x + dx * sensitivity;
		self.transform.y = self.pan.transform_start_y + dy * sensitivity;
	}

	pub fn begin_draft(&mut self, source_id: &str, sx: f64, sy: f64) {
		let (x, y) = self.screen_to_graph(sx, sy);
		self.draft = Some(EdgeDraft {
			source_id: source_id.to_string(),
			x,
			y,
		});
	}

	pub fn draft_to(&mut self, sx: f64, sy: f64) {
		let (x, y) = self.screen_to_graph(sx, sy);
		if let Some(draft) = self.draft.as_mut() {
			draft.x = x;
			draft.y = y;
		}
	}

	/// Completes a draft over a claim, yielding `(source, target)`. Releasing
	/// over empty space or over the source itself yields nothing.
	pub fn finish_draft(&mut self, sx: f64, sy: f64) -> Option<(String, String)> {
		let draft = self.draft.take()?;
		let target = self.node_at_position(sx, sy)?;
		(target != draft.source_id).then_some((draft.source_id, target))
	}

	/// Ends every gesture. Returns `true` when a pan ended without moving.
	pub fn release(&mut self) -> bool {
		let clicked = self.pan.active && !self.pan.moved;
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.draft = None;
		clicked
	}

	/// Zooms around a screen position.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, zoom_in: bool, sensitivity: f64, config: &ScaleConfig) {
		let new_k = config.clamp_zoom(self.transform.k * config.wheel_factor(zoom_in, sensitivity));
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.settle > 0.0 {
			self.graph.update(dt);
			self.settle -= dt as f64;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

/// Axis-aligned claim box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBox {
	pub x: f64,
	pub y: f64,
	pub half_w: f64,
	pub half_h: f64,
}

impl NodeBox {
	/// Point where the ray from the centre towards `(tx, ty)` leaves the box.
	pub fn border_point(&self, tx: f64, ty: f64) -> (f64, f64) {
		let (dx, dy) = (tx - self.x, ty - self.y);
		if dx == 0.0 && dy == 0.0 {
			return (self.x, self.y);
		}
		let sx = if dx == 0.0 { f64::INFINITY } else { self.half_w / dx.abs() };
		let sy = if dy == 0.0 { f64::INFINITY } else { self.half_h / dy.abs() };
		let s = sx.min(sy).min(1.0);
		(self.x + dx * s, self.y + dy * s)
	}

	/// Circle used to draw a self-relation above the box.
	pub fn loop_circle(&self) -> (f64, f64, f64) {
		let r = (self.half_h * 0.8).max(12.0);
		(self.x + self.half_w * 0.6, self.y - self.half_h, r)
	}
}

/// Distance from point `p` to the segment `a`-`b`.
pub fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (vx, vy) = (b.0 - a.0, b.1 - a.1);
	let len2 = vx * vx + vy * vy;
	if len2 == 0.0 {
		return (p.0 - a.0).hypot(p.1 - a.1);
	}
	let t = (((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len2).clamp(0.0, 1.0);
	(p.0 - (a.0 + t * vx)).hypot(p.1 - (a.1 + t * vy))
}
