use crate::graph::FocusResult;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Contact id.
	pub id: i64,
	pub label: String,
	/// Colour bucket, derived from the category.
	pub group: Option<u32>,
	/// False for neighbours pulled in around a search match.
	pub matched: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: i64,
	pub target: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl From<&FocusResult> for GraphData {
	fn from(focus: &FocusResult) -> Self {
		let nodes = focus
			.nodes
			.iter()
			.map(|visible| {
				let node = &visible.node;
				GraphNode {
					id: node.id,
					label: if node.name.is_empty() {
						node.id.to_string()
					} else {
						node.name.clone()
					},
					group: category_group(&node.category),
					matched: visible.matched,
				}
			})
			.collect();
		let links = focus
			.edges
			.iter()
			.map(|edge| GraphLink {
				source: edge.source_id,
				target: edge.target_id,
			})
			.collect();
		GraphData { nodes, links }
	}
}

/// Stable bucket per category so colours don't shift while filtering.
fn category_group(category: &str) -> Option<u32> {
	if category.is_empty() {
		return None;
	}
	Some(
		category
			.to_lowercase()
			.bytes()
			.fold(2166136261u32, |hash, b| (hash ^ b as u32).wrapping_mul(16777619)),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{ConnectionEdge, ContactNode, GraphModel, focus};

	#[test]
	fn converts_focus_result() {
		let model = GraphModel::new(
			vec![
				ContactNode {
					id: 1,
					name: "Alice".into(),
					category: "Academic".into(),
					relationship_stage: String::new(),
				},
				ContactNode {
					id: 2,
					name: String::new(),
					category: "academic".into(),
					relationship_stage: String::new(),
				},
			],
			vec![ConnectionEdge {
				source_id: 1,
				target_id: 2,
				relationship_type: "same_org".into(),
			}],
		);
		let data = GraphData::from(&focus(&model, "alice"));

		assert_eq!(data.nodes.len(), 2);
		assert!(data.nodes[0].matched);
		assert!(!data.nodes[1].matched);
		assert_eq!(data.nodes[1].label, "2");
		assert_eq!(data.nodes[0].group, data.nodes[1].group);
		assert_eq!(data.links, vec![GraphLink { source: 1, target: 2 }]);
	}

	#[test]
	fn uncategorised_nodes_have_no_group() {
		assert_eq!(category_group(""), None);
		assert!(category_group("Industry").is_some());
	}
}
