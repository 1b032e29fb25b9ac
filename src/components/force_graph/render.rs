use super::config::RenderStyle;
use super::hit_test::{HitCanvas, HitKey, HitPaintable};
use super::state::ForceGraphState;
use super::surface::Surface;

/// Width-to-length ratio of arrowheads.
const ARROW_WH_RATIO: f64 = 1.6;

/// Something that can draw itself as a node on a [`Surface`].
pub trait Renderable<S: Surface> {
	fn draw(&self, surface: &S, center: (f64, f64), radius: f64, style: &RenderStyle);
}

/// How a node is drawn: its cached image, or a plain disc when the image is absent.
#[derive(Debug)]
pub enum NodeSprite<'a, I> {
	Image(&'a I),
	Fallback,
}

impl<'a, I> NodeSprite<'a, I> {
	pub fn pick(image: Option<&'a I>) -> Self {
		image.map_or(Self::Fallback, Self::Image)
	}
}

impl<S: Surface> Renderable<S> for NodeSprite<'_, S::Image> {
	fn draw(&self, surface: &S, (x, y): (f64, f64), radius: f64, style: &RenderStyle) {
		match self {
			Self::Image(image) => {
				surface.save();
				surface.begin_path();
				if surface.arc(x, y, radius) {
					surface.clip();
					let size = radius * 2.0;
					surface.draw_image(image, x - radius, y - radius, size, size);
				}
				surface.restore();
			}
			Self::Fallback => {
				surface.begin_path();
				if surface.arc(x, y, radius) {
					surface.set_fill_style(&style.fallback_color);
					surface.fill();
				}
			}
		}
	}
}

impl<I> HitPaintable for NodeSprite<'_, I> {
	fn paint_hit(&self, canvas: &mut HitCanvas, key: HitKey, (x, y): (f64, f64), radius: f64) {
		match self {
			// Transparent image pixels still count as the node.
			Self::Image(_) | Self::Fallback => canvas.fill_circle(key, x, y, radius),
		}
	}
}

/// What one frame drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
	pub nodes: usize,
	pub links: usize,
}

/// Draw one frame from the current graph state. Never mutates node positions.
pub fn render<S: Surface>(state: &ForceGraphState<S::Image>, surface: &S) -> FrameStats {
	let style = &state.style;
	surface.set_fill_style(&style.background);
	surface.fill_rect(0.0, 0.0, state.width, state.height);

	surface.save();
	surface.translate(state.transform.x, state.transform.y);
	surface.scale(state.transform.k);
	let links = draw_links(state, surface);
	let nodes = draw_nodes(state, surface);
	surface.restore();

	draw_label(state, surface);
	FrameStats { nodes, links }
}

fn draw_links<S: Surface>(state: &ForceGraphState<S::Image>, surface: &S) -> usize {
	let style = &state.style;
	let radius = style.node_radius();
	let half_width = style.arrow_length / ARROW_WH_RATIO / 2.0;
	surface.set_stroke_style(&style.link_color);
	surface.set_fill_style(&style.link_color);
	surface.set_line_width(style.link_width / state.transform.k);

	let mut drawn = 0;
	for (source, target) in state.resolved_links() {
		let (Some((x1, y1)), Some((x2, y2))) = (
			state.simulation.position(source),
			state.simulation.position(target),
		) else {
			continue;
		};

		surface.begin_path();
		surface.move_to(x1, y1);
		surface.line_to(x2, y2);
		surface.stroke();
		drawn += 1;

		let (dx, dy) = (x2 - x1, y2 - y1);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 0.001 || style.arrow_length <= 0.0 {
			continue;
		}
		let (ux, uy) = (dx / len, dy / len);
		let along = radius
			+ style.arrow_length
			+ (len - 2.0 * radius - style.arrow_length) * style.arrow_rel_pos;
		let (tip_x, tip_y) = (x1 + ux * along, y1 + uy * along);
		let (back_x, back_y) = (
			tip_x - ux * style.arrow_length,
			tip_y - uy * style.arrow_length,
		);
		let (px, py) = (-uy * half_width, ux * half_width);

		surface.begin_path();
		surface.move_to(tip_x, tip_y);
		surface.line_to(back_x + px, back_y + py);
		surface.line_to(back_x - px, back_y - py);
		surface.close_path();
		surface.fill();
	}
	drawn
}

fn draw_nodes<S: Surface>(state: &ForceGraphState<S::Image>, surface: &S) -> usize {
	let radius = state.style.node_radius();
	let mut drawn = 0;
	for index in 0..state.nodes().len() {
		let Some(center) = state.simulation.position(index) else {
			continue;
		};
		if !(center.0.is_finite() && center.1.is_finite()) {
			continue;
		}
		state.sprite(index).draw(surface, center, radius, &state.style);
		drawn += 1;
	}
	drawn
}

/// Tooltip with the hovered node's label, drawn in screen space.
fn draw_label<S: Surface>(state: &ForceGraphState<S::Image>, surface: &S) {
	let Some(index) = state.hover else {
		return;
	};
	let (Some(node), Some((x, y))) = (state.nodes().get(index), state.simulation.position(index))
	else {
		return;
	};
	if node.label.is_empty() {
		return;
	}

	let style = &state.style;
	let (sx, sy) = state.transform.apply(x, y);
	let offset = style.node_radius() * state.transform.k + 6.0;
	surface.set_font(&style.label_font);
	let width = surface.measure_text(&node.label);
	let (bx, by) = (sx - width / 2.0 - 4.0, sy - offset - 18.0);

	surface.set_fill_style(&style.label_background);
	surface.fill_rect(bx, by, width + 8.0, 18.0);
	surface.set_fill_style(&style.label_color);
	surface.fill_text(&node.label, bx + 4.0, by + 13.0);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::config::GraphViewConfig;
	use crate::components::force_graph::controller::LoadedGraph;
	use crate::components::force_graph::images::ImageCache;
	use crate::components::force_graph::surface::recording::{Op, RecordingSurface};
	use crate::components::force_graph::types::{GraphData, GraphLink, GraphNode, NodeId};

	fn node(id: i64, label: &str) -> GraphNode {
		GraphNode {
			id: NodeId::from(id),
			label: label.into(),
			image: format!("/assets/{label}.png"),
		}
	}

	fn link(source: i64, target: i64) -> GraphLink {
		GraphLink {
			source: NodeId::from(source),
			target: NodeId::from(target),
		}
	}

	fn state(
		nodes: Vec<GraphNode>,
		links: Vec<GraphLink>,
		images: &[(i64, Option<&'static str>)],
	) -> ForceGraphState<&'static str> {
		let images = ImageCache::from_settled(
			images
				.iter()
				.map(|&(id, image)| (NodeId::from(id), image)),
		);
		ForceGraphState::new(
			LoadedGraph {
				data: GraphData { nodes, links },
				images,
			},
			&GraphViewConfig::default(),
			800.0,
			600.0,
		)
	}

	#[test]
	fn dangling_link_is_not_drawn() {
		let state = state(vec![node(1, "Thor")], vec![link(1, 2)], &[(1, None)]);
		let surface = RecordingSurface::default();

		let stats = render(&state, &surface);
		assert_eq!(stats, FrameStats { nodes: 1, links: 0 });
		assert_eq!(surface.strokes(), 0);
	}

	#[test]
	fn each_valid_link_is_drawn_once() {
		let state = state(
			vec![node(1, "a"), node(2, "b"), node(3, "c")],
			vec![link(1, 2), link(2, 3), link(3, 9), link(7, 1), link(1, 1)],
			&[],
		);
		let surface = RecordingSurface::default();

		let stats = render(&state, &surface);
		assert_eq!(stats.links, 3);
		assert_eq!(surface.strokes(), 3);
		assert!(
			surface
				.ops()
				.iter()
				.all(|op| !matches!(op, Op::Stroke(c) if c != "#ff1a1a"))
		);
	}

	#[test]
	fn cached_image_is_clipped_and_absent_one_falls_back() {
		let mut state = state(
			vec![node(1, "Thor"), node(2, "Loki")],
			vec![],
			&[(1, Some("thor-bitmap")), (2, None)],
		);
		state.simulation.set_position(0, 0.0, 0.0);
		let surface = RecordingSurface::default();

		render(&state, &surface);
		let ops = surface.ops();
		assert_eq!(surface.images(), vec!["thor-bitmap"]);
		assert!(ops.contains(&Op::Image("thor-bitmap", -5.0, -5.0, 10.0, 10.0)));
		let clip = ops.iter().position(|op| *op == Op::Clip).unwrap();
		let image = ops.iter().position(|op| matches!(op, Op::Image(..))).unwrap();
		assert!(clip < image);
		assert!(ops.contains(&Op::Fill("gray".into())));
	}

	#[test]
	fn arrow_tip_touches_target_rim() {
		let mut state = state(vec![node(1, "a"), node(2, "b")], vec![link(1, 2)], &[]);
		state.simulation.set_position(0, 0.0, 0.0);
		state.simulation.set_position(1, 100.0, 0.0);
		let surface = RecordingSurface::default();

		render(&state, &surface);
		let ops = surface.ops();
		let close = ops.iter().position(|op| *op == Op::ClosePath).unwrap();
		assert_eq!(ops[close - 3], Op::MoveTo(95.0, 0.0));
	}

	#[test]
	fn hover_label_is_drawn() {
		let mut state = state(vec![node(1, "Thor")], vec![], &[]);
		state.set_hover(Some(0));
		let surface = RecordingSurface::default();

		render(&state, &surface);
		assert!(surface.ops().contains(&Op::Text("Thor".into())));
	}

	#[test]
	fn frame_survives_a_non_finite_node() {
		let mut state = state(vec![node(1, "a"), node(2, "b")], vec![link(1, 2)], &[]);
		state.simulation.set_position(0, f64::NAN, 0.0);

		let stats = render(&state, &RecordingSurface::default());
		assert_eq!(stats.nodes, 1);
	}

	#[test]
	fn sprite_selection_follows_cache() {
		let image = "bitmap";
		assert!(matches!(NodeSprite::pick(Some(&image)), NodeSprite::Image(_)));
		assert!(matches!(NodeSprite::<&str>::pick(None), NodeSprite::Fallback));
	}
}
