use std::collections::HashMap;

use log::{info, warn};
use serde::Deserialize;

use super::simulation::SimulationParameters;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/graph-data";
pub const NO_IMAGE: &str = "/assets/no-image.png";

const BUILTIN_IMAGES: &[(&str, &str)] = &[
	("Spider-Man", "/assets/spider.png"),
	("Iron Man", "/assets/iron.png"),
	("Thor", "/assets/thor.png"),
	("Hulk", "/assets/hulk.png"),
	("Captain America", "/assets/captain.png"),
	("Black Widow", "/assets/black.png"),
	("Doctor Strange", "/assets/doctor.png"),
	("Black Panther", "/assets/panther.png"),
	("Scarlet Witch", "/assets/witch.png"),
	("Ant-Man", "/assets/ant.png"),
	("dataiskole", "/assets/DI.webp"),
];

/// Static label to image locator lookup with a fallback entry.
///
/// Lookups are total: unknown labels (and empty configured locators) resolve
/// to the fallback.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageTable {
	pub entries: HashMap<String, String>,
	pub fallback: String,
}

impl Default for ImageTable {
	fn default() -> Self {
		Self {
			entries: BUILTIN_IMAGES
				.iter()
				.map(|&(label, path)| (label.to_owned(), path.to_owned()))
				.collect(),
			fallback: NO_IMAGE.to_owned(),
		}
	}
}

impl ImageTable {
	pub fn resolve(&self, label: &str) -> &str {
		match self.entries.get(label) {
			Some(path) if !path.is_empty() => path,
			_ if !self.fallback.is_empty() => &self.fallback,
			_ => NO_IMAGE,
		}
	}
}

/// Fixed drawing constants, in graph units unless noted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
	pub node_size: f64,
	pub arrow_length: f64,
	/// Arrowhead position along the rim-to-rim segment; 1.0 puts the tip on the target.
	pub arrow_rel_pos: f64,
	pub link_color: String,
	pub link_width: f64,
	pub fallback_color: String,
	pub background: String,
	/// Tooltip font, in screen pixels.
	pub label_font: String,
	pub label_color: String,
	pub label_background: String,
}

impl Default for RenderStyle {
	fn default() -> Self {
		Self {
			node_size: 10.0,
			arrow_length: 3.0,
			arrow_rel_pos: 1.0,
			link_color: "#ff1a1a".into(),
			link_width: 1.0,
			fallback_color: "gray".into(),
			background: "#ffffff".into(),
			label_font: "12px sans-serif".into(),
			label_color: "#ffffff".into(),
			label_background: "rgba(0, 0, 0, 0.75)".into(),
		}
	}
}

impl RenderStyle {
	pub fn node_radius(&self) -> f64 {
		self.node_size / 2.0
	}
}

/// Everything the graph view can be tuned with.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphViewConfig {
	pub endpoint: String,
	pub style: RenderStyle,
	pub simulation: SimulationParameters,
	pub images: ImageTable,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_owned(),
			style: RenderStyle::default(),
			simulation: SimulationParameters::default(),
			images: ImageTable::default(),
		}
	}
}

impl GraphViewConfig {
	/// Parse a (possibly partial) JSON configuration; missing keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Configuration embedded in the host page, if any. Blank or invalid JSON
	/// is logged and replaced by the defaults.
	pub fn from_embedded(json: Option<&str>) -> Self {
		let Some(json) = json.map(str::trim).filter(|json| !json.is_empty()) else {
			return Self::default();
		};
		match Self::from_json(json) {
			Ok(config) => {
				info!("Using embedded graph view config (endpoint {})", config.endpoint);
				config
			}
			Err(err) => {
				warn!("Ignoring invalid graph view config: {err}");
				Self::default()
			}
		}
	}
}
