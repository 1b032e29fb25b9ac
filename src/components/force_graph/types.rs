use std::fmt;

use serde::Deserialize;
use serde_json::Number;

/// Node identity as delivered by the data feed: either a JSON string or a number.
///
/// Any JSON number is accepted. Integral floats are folded into their integer
/// form, so `1` and `1.0` name the same node; strings never equal numbers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "WireId")]
pub enum NodeId {
	/// Numeric id, e.g. `1` or `2.5`.
	Number(Number),
	/// String id, e.g. `"thor"`.
	Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
	Number(Number),
	Text(String),
}

impl From<WireId> for NodeId {
	fn from(wire: WireId) -> Self {
		match wire {
			WireId::Number(n) => Self::Number(normalize(n)),
			WireId::Text(s) => Self::Text(s),
		}
	}
}

const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn normalize(n: Number) -> Number {
	match n.as_f64() {
		Some(f) if n.is_f64() && f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) => {
			Number::from(f as i64)
		}
		_ => n,
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(n) => write!(f, "{n}"),
			Self::Text(s) => f.write_str(s),
		}
	}
}

impl From<i64> for NodeId {
	fn from(value: i64) -> Self {
		Self::Number(Number::from(value))
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}

/// A node record as it arrives from the data feed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawNode {
	pub id: NodeId,
	pub label: String,
}

/// An edge record as it arrives from the data feed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawEdge {
	pub source: NodeId,
	pub target: NodeId,
}

/// The payload of the graph endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawGraph {
	pub nodes: Vec<RawNode>,
	pub edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub label: String,
	/// Image locator, always non-empty after adaptation.
	pub image: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: NodeId,
	pub target: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raw_graph_accepts_mixed_ids() {
		let raw: RawGraph = serde_json::from_str(
			r#"{"nodes":[{"id":1,"label":"Thor"},{"id":"hulk","label":"Hulk","extra":true}],
			    "edges":[{"source":1,"target":"hulk"}]}"#,
		)
		.unwrap();

		assert_eq!(raw.nodes[0].id, NodeId::from(1));
		assert_eq!(raw.nodes[1].id, NodeId::from("hulk"));
		assert_eq!(raw.edges[0].target, NodeId::from("hulk"));
	}

	#[test]
	fn raw_graph_accepts_any_json_number_as_id() {
		let raw: RawGraph = serde_json::from_str(
			r#"{"nodes":[{"id":1.5,"label":"a"},{"id":18446744073709551615,"label":"b"},
			             {"id":-7,"label":"c"},{"id":2.0,"label":"d"}],
			    "edges":[{"source":1.5,"target":18446744073709551615},{"source":2,"target":-7}]}"#,
		)
		.unwrap();

		assert_eq!(raw.nodes[0].id.to_string(), "1.5");
		assert_eq!(raw.nodes[1].id.to_string(), "18446744073709551615");
		assert_eq!(raw.nodes[2].id, NodeId::from(-7));
		assert_eq!(raw.nodes[3].id, NodeId::from(2));
		assert_eq!(raw.edges[0].source, raw.nodes[0].id);
		assert_eq!(raw.edges[0].target, raw.nodes[1].id);
		assert_eq!(raw.edges[1].source, raw.nodes[3].id);
	}

	#[test]
	fn numeric_and_string_ids_are_distinct() {
		assert_ne!(NodeId::from(1), NodeId::from("1"));
		assert_eq!(NodeId::from(1).to_string(), NodeId::from("1").to_string());
	}

	#[test]
	fn missing_edges_field_is_an_error() {
		let parsed = serde_json::from_str::<RawGraph>(r#"{"nodes":[]}"#);
		assert!(parsed.is_err());
	}
}
