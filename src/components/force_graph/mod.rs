//! Force-directed graph view: data adapter, image cache, layout solver,
//! canvas renderer, hit-test layer and the load controller tying them together.

mod adapter;
mod component;
mod config;
mod controller;
mod error;
mod images;
mod liveness;
mod render;
mod simulation;
mod state;
mod surface;
mod types;

pub use adapter::adapt;
pub use component::ForceGraphCanvas;
pub use config::{GraphViewConfig, ImageTable, RenderStyle};
pub use controller::{GraphSource, HttpGraphSource, LoadOutcome, LoadState, LoadedGraph, load_graph};
pub use error::{FetchError, ImageError};
pub use hit_test::{HitKey, HitPaintable, PixelRect};
pub use images::{HtmlImageLoader, ImageCache, ImageLoader, preload};
pub use liveness::{ListenerGuard, Liveness};
pub use render::{FrameStats, NodeSprite, Renderable, render};
pub use simulation::{Simulation, SimulationParameters};
pub use state::{ForceGraphState, ViewTransform};
pub use surface::Surface;
pub use types::{GraphData, GraphLink, GraphNode, NodeId, RawGraph};
