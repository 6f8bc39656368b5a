use std::collections::HashSet;

use outreach_map::graph::{ConnectionEdge, ContactNode, GraphModel, focus, matches};
use outreach_map::rotation::parse_ids;
use proptest::prelude::*;

const NAMES: &[&str] = &["Alice", "Bob", "Carol", "Dan", "Erin", "Frank"];
const CATEGORIES: &[&str] = &["academic", "journalist", "founder", "", "Policy"];

fn contact(id: i64, name: usize, category: usize) -> ContactNode {
	ContactNode {
		id,
		name: format!("{} {id}", NAMES[name]),
		category: CATEGORIES[category].to_string(),
		relationship_stage: String::new(),
	}
}

fn model() -> impl Strategy<Value = GraphModel> {
	prop::collection::vec((0..NAMES.len(), 0..CATEGORIES.len()), 0..12).prop_flat_map(|people| {
		let count = people.len() as i64;
		let nodes: Vec<ContactNode> = people
			.iter()
			.enumerate()
			.map(|(i, &(name, category))| contact(i as i64 + 1, name, category))
			.collect();
		// Endpoints may point one past the last node so dangling edges show up.
		prop::collection::vec((1..=count + 1, 1..=count + 1), 0..20).prop_map(move |pairs| {
			let edges = pairs
				.into_iter()
				.filter(|(a, b)| a != b)
				.map(|(source_id, target_id)| ConnectionEdge {
					source_id,
					target_id,
					relationship_type: "knows".to_string(),
				})
				.collect();
			GraphModel::new(nodes.clone(), edges)
		})
	})
}

fn query() -> impl Strategy<Value = String> {
	prop_oneof![
		Just(String::new()),
		Just("   ".to_string()),
		Just("alice".to_string()),
		Just("ACADEMIC".to_string()),
		Just(" bo ".to_string()),
		Just("zzz".to_string()),
		"[a-z]{1,3}",
	]
}

proptest! {
	#[test]
	fn blank_query_shows_every_contact_as_matched(model in model(), spaces in " {0,4}") {
		let result = focus(&model, &spaces);
		prop_assert!(!result.is_filtered());
		prop_assert_eq!(result.nodes.len(), model.nodes().len());
		prop_assert!(result.nodes.iter().all(|v| v.matched));
	}

	#[test]
	fn visible_edges_join_visible_contacts(model in model(), q in query()) {
		let result = focus(&model, &q);
		for edge in &result.edges {
			prop_assert!(result.contains(edge.source_id));
			prop_assert!(result.contains(edge.target_id));
		}
	}

	#[test]
	fn visible_means_matched_or_one_hop_away(model in model(), q in query()) {
		let needle = q.trim().to_lowercase();
		prop_assume!(!needle.is_empty());
		let result = focus(&model, &q);
		let matched: HashSet<i64> = model
			.nodes()
			.iter()
			.filter(|n| matches(n, &needle))
			.map(|n| n.id)
			.collect();
		for node in model.nodes() {
			let adjacent = model
				.edges()
				.iter()
				.filter_map(|e| e.other_end(node.id))
				.any(|other| matched.contains(&other));
			let expected = matched.contains(&node.id) || adjacent;
			prop_assert_eq!(result.contains(node.id), expected, "contact {}", node.id);
		}
		for visible in &result.nodes {
			prop_assert_eq!(visible.matched, matched.contains(&visible.node.id));
		}
	}

	#[test]
	fn focus_is_deterministic(model in model(), q in query()) {
		prop_assert_eq!(focus(&model, &q), focus(&model, &q));
	}

	#[test]
	fn parsed_ids_are_positive_sorted_and_unique(text in "[0-9 ,;a-z\\-]{0,40}") {
		let ids = parse_ids(&text).to_vec();
		prop_assert!(ids.iter().all(|&id| id > 0));
		prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn listed_ids_are_all_kept(ids in prop::collection::vec(1u64..100_000, 0..20)) {
		let text = ids.iter().map(u64::to_string).collect::<Vec<_>>().join(", ");
		let parsed = parse_ids(&text);
		prop_assert!(ids.iter().all(|&id| parsed.contains(id)));
	}
}
