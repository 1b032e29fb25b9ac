use std::collections::HashMap;

use super::config::{GraphViewConfig, RenderStyle};
use super::controller::LoadedGraph;
use super::hit_test::{HitKey, HitLayer, HitPaintable, HitStamp};
use super::images::ImageCache;
use super::render::NodeSprite;
use super::simulation::Simulation;
use super::types::{GraphLink, GraphNode, NodeId};

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Pan/zoom mapping from graph space to screen space: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	pub fn apply(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything one live graph view owns: layout, images, hit buffer and view state.
///
/// Node `i` in [`nodes`](Self::nodes) is body `i` in the simulation.
pub struct ForceGraphState<I> {
	pub simulation: Simulation,
	nodes: Vec<GraphNode>,
	index: HashMap<NodeId, usize>,
	links: Vec<GraphLink>,
	images: ImageCache<I>,
	hit: HitLayer,
	pub style: RenderStyle,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
}

impl<I> ForceGraphState<I> {
	pub fn new(graph: LoadedGraph<I>, config: &GraphViewConfig, width: f64, height: f64) -> Self {
		let LoadedGraph { data, images } = graph;
		let mut simulation = Simulation::new(config.simulation.clone(), (0.0, 0.0));
		let mut index = HashMap::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			let body = simulation.add_body_on_ring(i, data.nodes.len());
			index.entry(node.id.clone()).or_insert(body);
		}
		for link in &data.links {
			if let (Some(&src), Some(&tgt)) = (index.get(&link.source), index.get(&link.target)) {
				simulation.add_spring(src, tgt);
			}
		}

		Self {
			simulation,
			nodes: data.nodes,
			index,
			links: data.links,
			images,
			hit: HitLayer::default(),
			style: config.style.clone(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
			animation_running: true,
		}
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[GraphLink] {
		&self.links
	}

	pub fn images(&self) -> &ImageCache<I> {
		&self.images
	}

	pub fn index_of(&self, id: &NodeId) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Links whose endpoints both exist, as arena index pairs. Others are skipped.
	pub fn resolved_links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.links.iter().filter_map(|link| {
			Some((self.index_of(&link.source)?, self.index_of(&link.target)?))
		})
	}

	pub fn sprite(&self, index: usize) -> NodeSprite<'_, I> {
		NodeSprite::pick(
			self.nodes
				.get(index)
				.and_then(|node| self.images.get(&node.id)),
		)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		self.transform.invert(sx, sy)
	}

	/// Id of the node under a screen point, via the color-keyed hit buffer.
	pub fn resolve(&mut self, sx: f64, sy: f64) -> Option<&NodeId> {
		let index = self.node_at_position(sx, sy)?;
		self.nodes.get(index).map(|node| &node.id)
	}

	pub fn node_at_position(&mut self, sx: f64, sy: f64) -> Option<usize> {
		self.refresh_hit_layer();
		self.hit.resolve(sx, sy)
	}

	/// Repaint the hit buffer if positions, transform or viewport changed since the last paint.
	fn refresh_hit_layer(&mut self) {
		let stamp = HitStamp {
			generation: self.simulation.generation(),
			node_count: self.nodes.len(),
			transform: self.transform,
			width: self.width.max(0.0) as usize,
			height: self.height.max(0.0) as usize,
		};
		if self.hit.is_fresh(&stamp) {
			return;
		}

		let radius = self.style.node_radius() * self.transform.k;
		let canvas = self.hit.begin(stamp);
		for (i, node) in self.nodes.iter().enumerate() {
			let (Some(key), Some((x, y))) = (HitKey::for_index(i), self.simulation.position(i))
			else {
				continue;
			};
			let sprite = NodeSprite::pick(self.images.get(&node.id));
			sprite.paint_hit(canvas, key, self.transform.apply(x, y), radius);
		}
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover = node.filter(|&i| i < self.nodes.len());
	}

	pub fn hovered_node(&self) -> Option<&GraphNode> {
		self.hover.and_then(|i| self.nodes.get(i))
	}

	/// Start dragging whatever node is under the pointer. Returns `false` on empty space.
	pub fn begin_drag(&mut self, sx: f64, sy: f64) -> bool {
		let Some(idx) = self.node_at_position(sx, sy) else {
			return false;
		};
		let Some((nx, ny)) = self.simulation.position(idx) else {
			return false;
		};
		self.drag = DragState {
			active: true,
			node_idx: Some(idx),
			start_x: sx,
			start_y: sy,
			node_start_x: nx,
			node_start_y: ny,
		};
		self.simulation.set_position(idx, nx, ny);
		true
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node_idx.filter(|_| self.drag.active) else {
			return;
		};
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		self.simulation.set_position(
			idx,
			self.drag.node_start_x + dx,
			self.drag.node_start_y + dy,
		);
	}

	pub fn end_drag(&mut self) {
		if let Some(idx) = self.drag.node_idx.take() {
			self.simulation.release(idx);
		}
		self.drag.active = false;
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Zoom by one wheel notch around a screen point, keeping that point fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f64) {
		if self.animation_running {
			self.simulation.tick(dt);
		}
	}

	/// Resize the viewport, keeping the graph where it was relative to the center.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
		self.hit.invalidate();
	}
}
