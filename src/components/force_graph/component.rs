use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, WheelEvent, Window,
};

use super::config::GraphViewConfig;
use super::controller::{HttpGraphSource, LoadOutcome, LoadState, LoadedGraph, load_graph};
use super::images::HtmlImageLoader;
use super::liveness::{ListenerGuard, Liveness};
use super::render;
use super::state::ForceGraphState;

const FRAME_DT: f64 = 0.016;

type Shared<T> = Rc<RefCell<Option<T>>>;

fn advance(status: RwSignal<LoadState>, next: LoadState) {
	status.update(|current| {
		if current.can_advance_to(&next) {
			*current = next;
		} else {
			warn!("Ignoring load state change {current:?} -> {next:?}");
		}
	});
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer(ev: &MouseEvent, canvas: Option<HtmlCanvasElement>) -> Option<(f64, f64)> {
	let rect = canvas?.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Graph view: loads the graph from `config.endpoint`, waits for every node
/// image to settle, then runs the layout and draws it every frame.
#[component]
pub fn ForceGraphCanvas(
	#[prop(optional)] config: GraphViewConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let status = RwSignal::new(LoadState::Idle);
	let liveness = Liveness::new();
	let loaded: Shared<LoadedGraph<HtmlImageElement>> = Rc::new(RefCell::new(None));
	let state: Shared<ForceGraphState<HtmlImageElement>> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_listener: Shared<ListenerGuard<Closure<dyn FnMut()>>> = Rc::new(RefCell::new(None));

	on_cleanup({
		let liveness = liveness.clone();
		move || liveness.revoke()
	});

	{
		let (liveness, loaded, config) = (liveness.clone(), loaded.clone(), config.clone());
		spawn_local(async move {
			let source = HttpGraphSource::new(config.endpoint.clone());
			let outcome = load_graph(
				&source,
				&HtmlImageLoader,
				&config.images,
				&liveness,
				|next| advance(status, next),
			)
			.await;
			if let LoadOutcome::Ready(graph) = outcome {
				if liveness.is_live() {
					*loaded.borrow_mut() = Some(graph);
					advance(status, LoadState::Ready);
				}
			}
		});
	}

	let (state_init, animate_init, resize_listener_init) =
		(state.clone(), animate.clone(), resize_listener.clone());
	let frame_liveness = liveness.clone();
	Effect::new(move |_| {
		if !status.get().is_ready() {
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(graph) = loaded.borrow_mut().take() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("No window available for the graph view");
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("Canvas context is not a 2D context");
					return;
				}
			},
			_ => {
				error!("Failed to get a 2D canvas context");
				return;
			}
		};
		*state_init.borrow_mut() = Some(ForceGraphState::new(graph, &config, w, h));

		if fullscreen {
			let (state_resize, canvas_resize, live) =
				(state_init.clone(), canvas.clone(), frame_liveness.clone());
			let on_resize: Closure<dyn FnMut()> = Closure::new(move || {
				if !live.is_live() {
					return;
				}
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			});
			match window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
			{
				Ok(()) => {
					let host = window.clone();
					*resize_listener_init.borrow_mut() =
						Some(ListenerGuard::new(on_resize, move |cb: &Closure<dyn FnMut()>| {
							if let Err(err) = host.remove_event_listener_with_callback(
								"resize",
								cb.as_ref().unchecked_ref(),
							) {
								warn!("Failed to remove resize listener: {err:?}");
							}
						}));
				}
				Err(err) => error!("Failed to add resize listener: {err:?}"),
			}
		}

		let (state_anim, animate_inner, live) =
			(state_init.clone(), animate_init.clone(), frame_liveness.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !live.is_live() {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_DT);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev, canvas_ref.get().map(Into::into)) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if !s.begin_drag(x, y) {
				s.begin_pan(x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev, canvas_ref.get().map(Into::into)) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
			} else {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
				s.pan_to(x, y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.end_drag();
			s.end_pan();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_drag();
			s.end_pan();
			s.set_hover(None);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(&ev, canvas_ref.get().map(Into::into)) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	let indicator = move || status.get().indicator();
	let canvas_style = move || {
		if status.get().is_ready() {
			"display: block; cursor: grab;"
		} else {
			"display: none;"
		}
	};

	view! {
		<Show when=move || indicator().is_some()>
			<div class="graph-loading">{move || indicator().unwrap_or_default()}</div>
		</Show>
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style=canvas_style
		/>
	}
}
