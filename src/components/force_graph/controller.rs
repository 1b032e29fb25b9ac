//! Fetch, adapt and preload sequencing for one graph view.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use gloo_net::http::Request;
use log::{debug, error, info};

use super::adapter::adapt;
use super::config::ImageTable;
use super::error::FetchError;
use super::images::{ImageCache, ImageLoader, preload};
use super::liveness::Liveness;
use super::types::{GraphData, RawGraph};

/// Where a view is in its one-shot load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
	#[default]
	Idle,
	Fetching,
	Adapting,
	PreloadingImages,
	Ready,
	/// Fetch or decode failed; the message is shown to the user. No retry.
	Failed(String),
}

impl LoadState {
	pub fn can_advance_to(&self, next: &LoadState) -> bool {
		matches!(
			(self, next),
			(Self::Idle, Self::Fetching)
				| (Self::Fetching, Self::Adapting)
				| (Self::Fetching, Self::Failed(_))
				| (Self::Adapting, Self::PreloadingImages)
				| (Self::PreloadingImages, Self::Ready)
		)
	}

	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready)
	}

	/// Text shown instead of the canvas, if any.
	pub fn indicator(&self) -> Option<String> {
		match self {
			Self::Ready => None,
			Self::Failed(message) => Some(format!("Failed to load graph: {message}")),
			_ => Some("Loading images...".to_owned()),
		}
	}
}

/// Provider of the raw graph payload.
pub trait GraphSource {
	fn fetch(&self) -> LocalBoxFuture<'_, Result<RawGraph, FetchError>>;
}

/// Fetches the graph with a plain HTTP GET.
#[derive(Clone, Debug)]
pub struct HttpGraphSource {
	url: String,
}

impl HttpGraphSource {
	pub fn new(url: impl Into<String>) -> Self {
		Self { url: url.into() }
	}
}

impl GraphSource for HttpGraphSource {
	fn fetch(&self) -> LocalBoxFuture<'_, Result<RawGraph, FetchError>> {
		async move {
			let response = Request::get(&self.url)
				.send()
				.await
				.map_err(|e| FetchError::Network(e.to_string()))?;
			if !response.ok() {
				return Err(FetchError::Status {
					code: response.status(),
					text: response.status_text(),
				});
			}
			response
				.json::<RawGraph>()
				.await
				.map_err(|e| FetchError::Decode(e.to_string()))
		}
		.boxed_local()
	}
}

/// Adapted graph plus its settled images; what a view needs to start drawing.
#[derive(Debug)]
pub struct LoadedGraph<I> {
	pub data: GraphData,
	pub images: ImageCache<I>,
}

#[derive(Debug)]
pub enum LoadOutcome<I> {
	Ready(LoadedGraph<I>),
	Failed(FetchError),
	/// The view was torn down before the load finished; nothing was applied.
	Superseded,
}

/// Run fetch, adapt and image preload, publishing each state through `on_state`.
///
/// `on_state` sees `Fetching`, `Adapting`, `PreloadingImages` and possibly
/// `Failed`; the caller publishes `Ready` once it has stored the graph.
/// Nothing is published after `liveness` is revoked.
pub async fn load_graph<S, L>(
	source: &S,
	loader: &L,
	table: &ImageTable,
	liveness: &Liveness,
	mut on_state: impl FnMut(LoadState),
) -> LoadOutcome<L::Image>
where
	S: GraphSource,
	L: ImageLoader,
{
	let mut publish = |state: LoadState| {
		if liveness.is_live() {
			on_state(state);
			true
		} else {
			debug!("Dropping {state:?} for a torn down view");
			false
		}
	};

	if !publish(LoadState::Fetching) {
		return LoadOutcome::Superseded;
	}
	let raw = match source.fetch().await {
		Ok(raw) => raw,
		Err(err) => {
			if !publish(LoadState::Failed(err.to_string())) {
				return LoadOutcome::Superseded;
			}
			error!("Failed to fetch graph data: {err}");
			return LoadOutcome::Failed(err);
		}
	};

	if !publish(LoadState::Adapting) {
		return LoadOutcome::Superseded;
	}
	let data = adapt(&raw, table);
	info!(
		"Graph fetched: {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);

	if !publish(LoadState::PreloadingImages) {
		return LoadOutcome::Superseded;
	}
	match preload(&data, loader, liveness).await {
		Some(images) if liveness.is_live() => LoadOutcome::Ready(LoadedGraph { data, images }),
		_ => LoadOutcome::Superseded,
	}
}
