use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{LocalBoxFuture, join_all};
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use super::error::ImageError;
use super::liveness::Liveness;
use super::types::{GraphData, NodeId};

/// Source of decoded images for node locators.
pub trait ImageLoader {
	type Image;

	fn load(&self, src: &str) -> LocalBoxFuture<'static, Result<Self::Image, ImageError>>;
}

/// Decoded images for the current graph, keyed by node id.
///
/// A node whose image failed to load maps to `None` ("absent").
#[derive(Debug)]
pub struct ImageCache<I> {
	images: HashMap<NodeId, Option<I>>,
	issued: usize,
	settled: usize,
}

impl<I> Default for ImageCache<I> {
	fn default() -> Self {
		Self {
			images: HashMap::new(),
			issued: 0,
			settled: 0,
		}
	}
}

impl<I> ImageCache<I> {
	/// Build a cache from already-settled loads, one entry per issued load.
	///
	/// With duplicate ids the first load is kept, matching link resolution.
	pub fn from_settled(loads: impl IntoIterator<Item = (NodeId, Option<I>)>) -> Self {
		let mut cache = Self::default();
		for (id, image) in loads {
			cache.issued += 1;
			cache.settled += 1;
			cache.images.entry(id).or_insert(image);
		}
		cache
	}

	pub fn get(&self, id: &NodeId) -> Option<&I> {
		self.images.get(id).and_then(Option::as_ref)
	}

	/// Number of loads started for this graph.
	pub fn issued(&self) -> usize {
		self.issued
	}

	/// Number of loads that reached success or failure.
	pub fn settled(&self) -> usize {
		self.settled
	}

	pub fn loaded(&self) -> usize {
		self.images.values().filter(|image| image.is_some()).count()
	}
}

/// Load one image per node and wait until every load has settled.
///
/// Failed loads are logged and stored as absent. Returns `None` when the
/// owning view went away while loads were in flight.
pub async fn preload<L: ImageLoader>(
	data: &GraphData,
	loader: &L,
	liveness: &Liveness,
) -> Option<ImageCache<L::Image>> {
	let loads = data.nodes.iter().map(|node| {
		let pending = loader.load(&node.image);
		async move {
			match pending.await {
				Ok(image) => (node, Some(image)),
				Err(err) => {
					error!("Failed to load image for {}: {} ({err})", node.label, node.image);
					(node, None)
				}
			}
		}
	});
	let results = join_all(loads).await;

	if !liveness.is_live() {
		debug!("Discarding {} image loads for a torn down view", results.len());
		return None;
	}

	let cache = ImageCache::from_settled(
		results
			.into_iter()
			.map(|(node, image)| (node.id.clone(), image)),
	);
	debug!(
		"Images settled: {}/{} loaded",
		cache.loaded(),
		cache.settled
	);
	Some(cache)
}

/// Loads images through `<img>` elements, resolving on `load` or `error`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlImageLoader;

impl ImageLoader for HtmlImageLoader {
	type Image = HtmlImageElement;

	fn load(&self, src: &str) -> LocalBoxFuture<'static, Result<HtmlImageElement, ImageError>> {
		let src = src.to_owned();
		async move {
			let img = HtmlImageElement::new().map_err(|e| ImageError::Create(format!("{e:?}")))?;
			let (tx, rx) = oneshot::channel::<bool>();
			let tx = Rc::new(RefCell::new(Some(tx)));

			let settle = |ok: bool| {
				let tx = tx.clone();
				Closure::<dyn FnMut()>::new(move || {
					if let Some(tx) = tx.borrow_mut().take() {
						let _ = tx.send(ok);
					}
				})
			};
			let (on_load, on_error) = (settle(true), settle(false));
			img.set_onload(Some(on_load.as_ref().unchecked_ref()));
			img.set_onerror(Some(on_error.as_ref().unchecked_ref()));
			img.set_src(&src);

			let ok = rx.await.unwrap_or(false);
			img.set_onload(None);
			img.set_onerror(None);
			drop((on_load, on_error));

			if ok && img.natural_width() > 0 {
				Ok(img)
			} else {
				Err(ImageError::Load { src })
			}
		}
		.boxed_local()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::collections::HashSet;

	use futures::executor::block_on;

	use super::*;
	use crate::components::force_graph::types::GraphNode;

	#[derive(Default)]
	struct FakeLoader {
		missing: HashSet<&'static str>,
		calls: Rc<Cell<usize>>,
		teardown_on: Option<(&'static str, Liveness)>,
	}

	impl ImageLoader for FakeLoader {
		type Image = String;

		fn load(&self, src: &str) -> LocalBoxFuture<'static, Result<String, ImageError>> {
			self.calls.set(self.calls.get() + 1);
			if let Some((trigger, token)) = &self.teardown_on {
				if *trigger == src {
					token.revoke();
				}
			}
			let result = if self.missing.contains(src) {
				Err(ImageError::Load { src: src.to_owned() })
			} else {
				Ok(src.to_owned())
			};
			futures::future::ready(result).boxed_local()
		}
	}

	fn graph(nodes: &[(i64, &str, &str)]) -> GraphData {
		GraphData {
			nodes: nodes
				.iter()
				.map(|&(id, label, image)| GraphNode {
					id: NodeId::from(id),
					label: label.into(),
					image: image.into(),
				})
				.collect(),
			links: Vec::new(),
		}
	}

	#[test]
	fn failed_load_still_reaches_readiness() {
		let data = graph(&[(1, "Thor", "/assets/thor.png")]);
		let loader = FakeLoader {
			missing: HashSet::from(["/assets/thor.png"]),
			..Default::default()
		};

		let cache = block_on(preload(&data, &loader, &Liveness::new())).unwrap();
		assert_eq!(cache.issued(), 1);
		assert_eq!(cache.settled(), 1);
		assert!(cache.get(&NodeId::from(1)).is_none());
	}

	#[test]
	fn settled_matches_issued_for_mixed_outcomes() {
		let data = graph(&[
			(1, "Thor", "/assets/thor.png"),
			(2, "Hulk", "/assets/hulk.png"),
			(3, "Loki", "/assets/no-image.png"),
		]);
		let loader = FakeLoader {
			missing: HashSet::from(["/assets/hulk.png"]),
			..Default::default()
		};

		let cache = block_on(preload(&data, &loader, &Liveness::new())).unwrap();
		assert_eq!(cache.settled(), cache.issued());
		assert_eq!(cache.loaded(), 2);
		assert_eq!(
			cache.get(&NodeId::from(1)).map(String::as_str),
			Some("/assets/thor.png")
		);
		assert!(cache.get(&NodeId::from(2)).is_none());
	}

	#[test]
	fn shared_locators_load_per_node() {
		let data = graph(&[
			(1, "Nobody", "/assets/no-image.png"),
			(2, "Somebody", "/assets/no-image.png"),
		]);
		let loader = FakeLoader::default();
		let calls = loader.calls.clone();

		let cache = block_on(preload(&data, &loader, &Liveness::new())).unwrap();
		assert_eq!(calls.get(), 2);
		assert!(cache.get(&NodeId::from(1)).is_some());
		assert!(cache.get(&NodeId::from(2)).is_some());
	}

	#[test]
	fn duplicate_ids_keep_the_first_image() {
		let data = graph(&[
			(7, "Thor", "/assets/thor.png"),
			(7, "Hulk", "/assets/hulk.png"),
		]);

		let cache = block_on(preload(&data, &FakeLoader::default(), &Liveness::new())).unwrap();
		assert_eq!(cache.issued(), 2);
		assert_eq!(cache.settled(), 2);
		assert_eq!(
			cache.get(&NodeId::from(7)).map(String::as_str),
			Some("/assets/thor.png")
		);
	}

	#[test]
	fn teardown_mid_flight_discards_results() {
		let data = graph(&[
			(1, "Thor", "/assets/thor.png"),
			(2, "Hulk", "/assets/hulk.png"),
		]);
		let token = Liveness::new();
		let loader = FakeLoader {
			teardown_on: Some(("/assets/hulk.png", token.clone())),
			..Default::default()
		};

		assert!(block_on(preload(&data, &loader, &token)).is_none());
	}

	#[test]
	fn empty_graph_is_ready_immediately() {
		let cache = block_on(preload(
			&GraphData::default(),
			&FakeLoader::default(),
			&Liveness::new(),
		))
		.unwrap();
		assert_eq!(cache.issued(), 0);
		assert_eq!(cache.settled(), 0);
	}
}
