use super::config::ImageTable;
use super::types::{GraphData, GraphLink, GraphNode, RawGraph};

/// Turn the raw feed records into the internal node/link model.
///
/// Every node gets an image locator from `table`. Edges are copied as-is;
/// dangling endpoints are dealt with at render time.
pub fn adapt(raw: &RawGraph, table: &ImageTable) -> GraphData {
	let nodes = raw
		.nodes
		.iter()
		.map(|node| GraphNode {
			id: node.id.clone(),
			label: node.label.clone(),
			image: table.resolve(&node.label).to_owned(),
		})
		.collect();

	let links = raw
		.edges
		.iter()
		.map(|edge| GraphLink {
			source: edge.source.clone(),
			target: edge.target.clone(),
		})
		.collect();

	GraphData { nodes, links }
}
