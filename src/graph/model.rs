use std::collections::HashSet;

use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// A contact as drawn on the relationship map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactNode {
	/// Backend contact id, unique within a model.
	pub id: i64,
	/// Display name, as received.
	pub name: String,
	/// Empty when the contact has no category.
	pub category: String,
	/// Empty when no stage has been recorded.
	pub relationship_stage: String,
}

/// A recorded relationship between two contacts.
///
/// Stored with a source and target, but matching and expansion treat it as
/// undirected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionEdge {
	/// One endpoint.
	pub source_id: i64,
	/// The other endpoint.
	pub target_id: i64,
	/// Free-form label such as `co_author` or `same_org`.
	pub relationship_type: String,
}

impl ConnectionEdge {
	/// The endpoint opposite `id`, if `id` is one of the endpoints.
	pub fn other_end(&self, id: i64) -> Option<i64> {
		if self.source_id == id {
			Some(self.target_id)
		} else if self.target_id == id {
			Some(self.source_id)
		} else {
			None
		}
	}
}

/// Node and edge snapshot of the relationship map at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphModel {
	nodes: Vec<ContactNode>,
	edges: Vec<ConnectionEdge>,
}

impl GraphModel {
	/// Assemble a model from already typed parts. Later nodes repeating an
	/// earlier id are dropped.
	pub fn new(nodes: Vec<ContactNode>, edges: Vec<ConnectionEdge>) -> Self {
		let mut seen = HashSet::new();
		let nodes = nodes.into_iter().filter(|n| seen.insert(n.id)).collect();
		Self { nodes, edges }
	}

	/// Contacts in backend order.
	pub fn nodes(&self) -> &[ContactNode] {
		&self.nodes
	}

	/// Every connection, including ones whose endpoint is missing.
	pub fn edges(&self) -> &[ConnectionEdge] {
		&self.edges
	}

	/// At least one connection exists, dangling or not.
	pub fn has_connections(&self) -> bool {
		!self.edges.is_empty()
	}
}

/// Wire shape of the relationship map endpoint. Records stay untyped until
/// [`build`] so one corrupt entry cannot fail the whole response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
	/// Contact records.
	#[serde(default)]
	pub nodes: Vec<Value>,
	/// Connection records.
	#[serde(default)]
	pub links: Vec<Value>,
}

/// Counts of records the builder could not use as-is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
	/// Nodes without a usable id, or repeating an earlier id.
	pub skipped_nodes: usize,
	/// Edges with a missing or non-numeric endpoint.
	pub skipped_edges: usize,
	/// Edges kept in the model whose endpoints are not in the node snapshot.
	pub dangling_edges: usize,
}

impl BuildReport {
	/// Nothing was skipped or left dangling.
	pub fn is_clean(&self) -> bool {
		*self == Self::default()
	}
}

/// Normalize raw node and edge records into a [`GraphModel`].
pub fn build(raw_nodes: &[Value], raw_edges: &[Value]) -> (GraphModel, BuildReport) {
	let mut report = BuildReport::default();
	let mut ids = HashSet::new();
	let mut nodes = Vec::with_capacity(raw_nodes.len());

	for raw in raw_nodes {
		match parse_node(raw) {
			Some(node) if ids.insert(node.id) => nodes.push(node),
			_ => report.skipped_nodes += 1,
		}
	}

	let mut edges = Vec::with_capacity(raw_edges.len());
	for raw in raw_edges {
		let Some(edge) = parse_edge(raw) else {
			report.skipped_edges += 1;
			continue;
		};
		if !ids.contains(&edge.source_id) || !ids.contains(&edge.target_id) {
			report.dangling_edges += 1;
		}
		edges.push(edge);
	}

	if !report.is_clean() {
		warn!(
			"relationship map: skipped {} nodes and {} edges, {} edges reference unknown contacts",
			report.skipped_nodes, report.skipped_edges, report.dangling_edges
		);
	}

	(GraphModel { nodes, edges }, report)
}

impl RawGraph {
	/// See [`build`].
	pub fn build(&self) -> (GraphModel, BuildReport) {
		build(&self.nodes, &self.links)
	}
}

fn parse_node(raw: &Value) -> Option<ContactNode> {
	let record = raw.as_object()?;
	Some(ContactNode {
		id: parse_id(record.get("id")?)?,
		name: text(record.get("name")),
		category: text(record.get("category")),
		relationship_stage: text(record.get("relationship_stage")),
	})
}

fn parse_edge(raw: &Value) -> Option<ConnectionEdge> {
	let record = raw.as_object()?;
	Some(ConnectionEdge {
		source_id: parse_id(record.get("source_id")?)?,
		target_id: parse_id(record.get("target_id")?)?,
		relationship_type: text(record.get("relationship_type")),
	})
}

/// Integer ids, also accepting integers sent as strings.
fn parse_id(value: &Value) -> Option<i64> {
	match value {
		Value::Number(n) => n.as_i64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Text fields pass through untouched; null or missing becomes empty.
fn text(value: Option<&Value>) -> String {
	match value {
		Some(Value::String(s)) => s.clone(),
		Some(Value::Number(n)) => n.to_string(),
		Some(Value::Bool(b)) => b.to_string(),
		_ => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn nulls_become_empty_text() {
		let (model, report) = build(
			&[json!({"id": 7, "name": "Ada", "category": null})],
			&[],
		);
		assert!(report.is_clean());
		let node = &model.nodes()[0];
		assert_eq!(node.id, 7);
		assert_eq!(node.name, "Ada");
		assert_eq!(node.category, "");
		assert_eq!(node.relationship_stage, "");
	}

	#[test]
	fn corrupt_records_are_counted_not_fatal() {
		let nodes = [
			json!({"id": 1, "name": "Alice"}),
			json!({"name": "no id"}),
			json!({"id": "x", "name": "bad id"}),
			json!("not an object"),
			json!({"id": 1, "name": "duplicate"}),
			json!({"id": "2", "name": "Bob"}),
		];
		let edges = [
			json!({"source_id": 1, "target_id": 2, "relationship_type": "same_org"}),
			json!({"source_id": "one", "target_id": 2}),
			json!({"target_id": 2}),
			json!({"source_id": 1, "target_id": 99}),
		];
		let (model, report) = build(&nodes, &edges);

		assert_eq!(model.nodes().len(), 2);
		let names: Vec<_> = model.nodes().iter().map(|n| (n.id, n.name.as_str())).collect();
		assert_eq!(names, [(1, "Alice"), (2, "Bob")]);
		assert_eq!(model.edges().len(), 2);
		assert_eq!(
			report,
			BuildReport {
				skipped_nodes: 4,
				skipped_edges: 2,
				dangling_edges: 1,
			}
		);
	}

	#[test]
	fn parallel_edges_are_kept() {
		let nodes = [json!({"id": 1}), json!({"id": 2})];
		let edges = [
			json!({"source_id": 1, "target_id": 2, "relationship_type": "co_author"}),
			json!({"source_id": 2, "target_id": 1, "relationship_type": "same_org"}),
		];
		let (model, _) = build(&nodes, &edges);
		assert_eq!(model.edges().len(), 2);
	}

	#[test]
	fn raw_graph_decodes_missing_arrays() {
		let raw: RawGraph = serde_json::from_str("{}").unwrap();
		let (model, report) = raw.build();
		assert!(model.nodes().is_empty());
		assert!(!model.has_connections());
		assert!(report.is_clean());
	}

	#[test]
	fn other_end_is_undirected() {
		let edge = ConnectionEdge {
			source_id: 1,
			target_id: 2,
			relationship_type: String::new(),
		};
		assert_eq!(edge.other_end(1), Some(2));
		assert_eq!(edge.other_end(2), Some(1));
		assert_eq!(edge.other_end(3), None);
	}

	#[test]
	fn text_fields_are_kept_as_received() {
		let (model, _) = build(
			&[json!({"id": 1, "name": "  Dr. Ada Lovelace ", "category": "Category 2: Academic\n"})],
			&[],
		);
		assert_eq!(model.nodes()[0].name, "  Dr. Ada Lovelace ");
		assert_eq!(model.nodes()[0].category, "Category 2: Academic\n");
	}
}
