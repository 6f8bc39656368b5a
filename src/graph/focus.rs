use std::collections::HashSet;

use super::model::{ConnectionEdge, ContactNode, GraphModel};

/// A node kept by [`focus`], tagged with whether it matched the query itself
/// or was pulled in as a neighbour of a match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleNode {
	/// The contact itself.
	pub node: ContactNode,
	/// Matched the query rather than neighbouring a match.
	pub matched: bool,
}

/// The subgraph shown for one search query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusResult {
	/// Visible contacts in model order.
	pub nodes: Vec<VisibleNode>,
	/// Connections with both ends visible.
	pub edges: Vec<ConnectionEdge>,
	/// Trimmed query, empty when unfiltered.
	pub query: String,
}

impl FocusResult {
	/// A non-blank query was applied.
	pub fn is_filtered(&self) -> bool {
		!self.query.is_empty()
	}

	/// Contacts that matched directly.
	pub fn match_count(&self) -> usize {
		self.nodes.iter().filter(|v| v.matched).count()
	}

	/// A filtered result with nothing to show.
	pub fn is_no_results(&self) -> bool {
		self.is_filtered() && self.nodes.is_empty()
	}

	/// `id` is on screen.
	pub fn contains(&self, id: i64) -> bool {
		self.nodes.iter().any(|v| v.node.id == id)
	}

	/// Caption shown under the map.
	pub fn summary(&self, model: &GraphModel) -> String {
		if self.is_filtered() {
			format!(
				"Showing {} contacts ({} matching \"{}\" + their connections). Clear search to show all.",
				self.nodes.len(),
				self.match_count(),
				self.query
			)
		} else {
			format!(
				"{} contacts, {} connections.",
				model.nodes().len(),
				model.edges().len()
			)
		}
	}
}

/// Case-insensitive substring match on name or category. `needle` must
/// already be lowercase.
pub fn matches(node: &ContactNode, needle: &str) -> bool {
	node.name.to_lowercase().contains(needle) || node.category.to_lowercase().contains(needle)
}

/// Reduce `model` to the contacts matching `query` plus their direct
/// neighbours.
///
/// A blank query shows everything, all marked matched. Expansion is a single
/// hop: neighbours of neighbours are never added. Edges survive only when
/// both endpoints are visible. Output order follows the model.
pub fn focus(model: &GraphModel, query: &str) -> FocusResult {
	let query = query.trim();
	if query.is_empty() {
		let ids: HashSet<i64> = model.nodes().iter().map(|n| n.id).collect();
		return FocusResult {
			nodes: model
				.nodes()
				.iter()
				.map(|node| VisibleNode {
					node: node.clone(),
					matched: true,
				})
				.collect(),
			edges: edges_within(model, &ids),
			query: String::new(),
		};
	}

	let needle = query.to_lowercase();
	let matched: HashSet<i64> = model
		.nodes()
		.iter()
		.filter(|n| matches(n, &needle))
		.map(|n| n.id)
		.collect();

	let mut visible = matched.clone();
	for edge in model.edges() {
		match (
			matched.contains(&edge.source_id),
			matched.contains(&edge.target_id),
		) {
			(true, false) => {
				visible.insert(edge.target_id);
			}
			(false, true) => {
				visible.insert(edge.source_id);
			}
			_ => {}
		}
	}

	let nodes: Vec<VisibleNode> = model
		.nodes()
		.iter()
		.filter(|n| visible.contains(&n.id))
		.map(|node| VisibleNode {
			node: node.clone(),
			matched: matched.contains(&node.id),
		})
		.collect();
	// Neighbour ids missing from the snapshot never become visible nodes, so
	// edges are checked against the nodes actually kept.
	let shown: HashSet<i64> = nodes.iter().map(|v| v.node.id).collect();

	FocusResult {
		nodes,
		edges: edges_within(model, &shown),
		query: query.to_string(),
	}
}

fn edges_within(model: &GraphModel, ids: &HashSet<i64>) -> Vec<ConnectionEdge> {
	model
		.edges()
		.iter()
		.filter(|e| ids.contains(&e.source_id) && ids.contains(&e.target_id))
		.cloned()
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: i64, name: &str, category: &str) -> ContactNode {
		ContactNode {
			id,
			name: name.into(),
			category: category.into(),
			relationship_stage: String::new(),
		}
	}

	fn edge(source_id: i64, target_id: i64) -> ConnectionEdge {
		ConnectionEdge {
			source_id,
			target_id,
			relationship_type: "first_degree".into(),
		}
	}

	fn roster() -> GraphModel {
		GraphModel::new(
			vec![
				node(1, "Alice", "Academic"),
				node(2, "Bob", "Industry"),
				node(3, "Cara", "Academic"),
			],
			vec![edge(1, 2)],
		)
	}

	fn visible(result: &FocusResult) -> Vec<(i64, bool)> {
		result
			.nodes
			.iter()
			.map(|v| (v.node.id, v.matched))
			.collect()
	}

	#[test]
	fn blank_query_shows_everything_matched() {
		let model = roster();
		for query in ["", "   ", "\t\n"] {
			let result = focus(&model, query);
			assert!(!result.is_filtered());
			assert_eq!(visible(&result), vec![(1, true), (2, true), (3, true)]);
			assert_eq!(result.edges, model.edges());
		}
	}

	#[test]
	fn name_match_pulls_in_neighbour() {
		let result = focus(&roster(), "alice");
		assert_eq!(visible(&result), vec![(1, true), (2, false)]);
		assert_eq!(result.edges, vec![edge(1, 2)]);
		assert_eq!(result.match_count(), 1);
	}

	#[test]
	fn category_match_is_case_insensitive_and_expands_one_hop() {
		let result = focus(&roster(), "  ACADEMIC ");
		// Bob is a direct neighbour of Alice, so he stays in unmatched.
		assert_eq!(visible(&result), vec![(1, true), (2, false), (3, true)]);
		assert_eq!(result.edges, vec![edge(1, 2)]);
		assert_eq!(result.query, "ACADEMIC");
	}

	#[test]
	fn expansion_stops_after_one_hop() {
		let model = GraphModel::new(
			vec![
				node(1, "Alice", ""),
				node(2, "Bob", ""),
				node(3, "Cara", ""),
				node(4, "Dev", ""),
			],
			vec![edge(1, 2), edge(2, 3), edge(3, 4)],
		);
		let result = focus(&model, "alice");
		assert_eq!(visible(&result), vec![(1, true), (2, false)]);
		assert_eq!(result.edges, vec![edge(1, 2)]);
	}

	#[test]
	fn edges_between_two_neighbours_are_kept() {
		let model = GraphModel::new(
			vec![node(1, "Hub", ""), node(2, "Left", ""), node(3, "Right", "")],
			vec![edge(1, 2), edge(1, 3), edge(2, 3)],
		);
		let result = focus(&model, "hub");
		assert_eq!(result.edges.len(), 3);
	}

	#[test]
	fn no_match_means_no_results() {
		let result = focus(&roster(), "zed");
		assert!(result.nodes.is_empty());
		assert!(result.edges.is_empty());
		assert!(result.is_no_results());
	}

	#[test]
	fn dangling_edges_never_surface() {
		let model = GraphModel::new(vec![node(1, "Alice", "")], vec![edge(1, 42)]);
		assert!(focus(&model, "").edges.is_empty());
		let result = focus(&model, "alice");
		assert_eq!(visible(&result), vec![(1, true)]);
		assert!(result.edges.is_empty());
	}

	#[test]
	fn summary_reports_counts() {
		let model = roster();
		assert_eq!(focus(&model, "").summary(&model), "3 contacts, 1 connections.");
		assert_eq!(
			focus(&model, "alice").summary(&model),
			"Showing 2 contacts (1 matching \"alice\" + their connections). Clear search to show all."
		);
	}
}
