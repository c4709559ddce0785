//! Derives renderable node and edge descriptors from a [`Graph`].
//!
//! The projection is rebuilt from scratch whenever the graph changes. Edge
//! identity is the relation's durable id, never its position in the list.

use crate::model::{Graph, Metadata, Relation, RelationKind, Unit, UnitType};

/// Approximate advance of one label character, in world units.
const CHAR_WIDTH: f64 = 7.0;
const PADDING: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;
const MIN_WIDTH: f64 = 80.0;
const MAX_WIDTH: f64 = 240.0;
/// Labels longer than this are cut with an ellipsis.
const MAX_LABEL_CHARS: usize = 160;

/// Metadata keys consulted, in order, for a node's score badge.
const BADGE_KEYS: [&str; 3] = ["credibility", "llm_confidence", "score"];

/// A claim as the canvas draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
	pub id: String,
	pub label: String,
	/// `label` wrapped to fit `width`.
	pub lines: Vec<String>,
	pub width: f64,
	pub height: f64,
	pub badge: Option<String>,
	pub unit_type: UnitType,
}

/// A relation as the canvas draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeElement {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: RelationKind,
	pub label: String,
}

/// Full element set for one graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Elements {
	pub nodes: Vec<NodeElement>,
	pub edges: Vec<EdgeElement>,
}

pub fn project(graph: &Graph) -> Elements {
	Elements {
		nodes: graph.units.values().map(node_element).collect(),
		edges: graph.relations.iter().map(edge_element).collect(),
	}
}

fn node_element(unit: &Unit) -> NodeElement {
	let label = truncate(unit.content.trim(), MAX_LABEL_CHARS);
	let chars = label.chars().count().max(1) as f64;
	let width = (chars * CHAR_WIDTH + 2.0 * PADDING).clamp(MIN_WIDTH, MAX_WIDTH);
	let per_line = (((width - 2.0 * PADDING) / CHAR_WIDTH).floor() as usize).max(1);
	let lines = wrap(&label, per_line);
	let height = lines.len().max(1) as f64 * LINE_HEIGHT + 2.0 * PADDING;

	NodeElement {
		id: unit.id.clone(),
		lines,
		width,
		height,
		badge: badge(&unit.metadata),
		unit_type: unit.unit_type,
		label,
	}
}

fn edge_element(relation: &Relation) -> EdgeElement {
	let label = match validation_score(&relation.metadata) {
		Some(score) => format!("{} ({score:.2})", relation.kind),
		None => relation.kind.to_string(),
	};
	EdgeElement {
		id: relation.id.clone(),
		source: relation.source.clone(),
		target: relation.target.clone(),
		kind: relation.kind,
		label,
	}
}

/// Score shown in a node's corner, if any analysis produced one.
pub fn badge(metadata: &Metadata) -> Option<String> {
	BADGE_KEYS
		.iter()
		.find_map(|key| metadata.get(*key).and_then(|v| v.as_f64()))
		.map(|score| format!("{score:.2}"))
}

fn validation_score(metadata: &Metadata) -> Option<f64> {
	metadata.get("validation")?.get("score")?.as_f64()
}

fn truncate(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_string();
	}
	let mut cut: String = text.chars().take(max - 1).collect();
	cut.push('…');
	cut
}

/// Greedy word wrap. Words longer than a line are split.
fn wrap(text: &str, per_line: usize) -> Vec<String> {
	let mut lines = Vec::new();
	let mut current = String::new();
	let mut current_len = 0;

	for word in text.split_whitespace() {
		let mut word: Vec<char> = word.chars().collect();
		while word.len() > per_line {
			if current_len > 0 {
				lines.push(std::mem::take(&mut current));
				current_len = 0;
			}
			let rest = word.split_off(per_line);
			lines.push(word.into_iter().collect());
			word = rest;
		}
		let needed = if current_len == 0 {
			word.len()
		} else {
			current_len + 1 + word.len()
		};
		if needed > per_line && current_len > 0 {
			lines.push(std::mem::take(&mut current));
			current_len = 0;
		}
		if current_len > 0 {
			current.push(' ');
			current_len += 1;
		}
		current.extend(word.iter());
		current_len += word.len();
	}
	if current_len > 0 || lines.is_empty() {
		lines.push(current);
	}
	lines
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;
	use serde_json::json;

	use super::*;
	use crate::model::Graph;

	#[test]
	fn short_labels_get_minimum_width() {
		let mut g = Graph::default();
		g.add_unit("A", UnitType::Fact);
		let elements = project(&g);
		let node = &elements.nodes[0];
		assert_eq!(node.width, MIN_WIDTH);
		assert_eq!(node.lines, vec!["A".to_string()]);
		assert_eq!(node.height, LINE_HEIGHT + 2.0 * PADDING);
	}

	#[test]
	fn long_labels_wrap_within_maximum_width() {
		let mut g = Graph::default();
		g.add_unit(
			"Raising the minimum wage reduces poverty without measurably increasing unemployment",
			UnitType::Policy,
		);
		let node = &project(&g).nodes[0];
		assert_eq!(node.width, MAX_WIDTH);
		let per_line = ((MAX_WIDTH - 2.0 * PADDING) / CHAR_WIDTH).floor() as usize;
		assert!(node.lines.len() > 1);
		assert!(node.lines.iter().all(|l| l.chars().count() <= per_line));
		assert_eq!(node.lines.join(" "), node.label);
	}

	#[test]
	fn badge_prefers_credibility() {
		let mut g = Graph::default();
		let id = g.add_unit("A", UnitType::Fact);
		let unit = g.units.get_mut(&id).unwrap();
		unit.metadata.insert("llm_confidence".into(), json!(0.5));
		unit.metadata.insert("credibility".into(), json!(0.8125));
		assert_eq!(project(&g).nodes[0].badge.as_deref(), Some("0.81"));
	}

	#[test]
	fn edge_labels_carry_validation_score() {
		let mut g = Graph::default();
		g.add_relation("u1", "u2", RelationKind::Attack, None);
		g.add_relation("u2", "u1", RelationKind::Support, None);
		g.relations[0]
			.metadata
			.insert("validation".into(), json!({"score": 0.25, "reason": "weak"}));
		let edges = project(&g).edges;
		assert_eq!(edges[0].label, "attack (0.25)");
		assert_eq!(edges[1].label, "support");
		assert_eq!(edges[1].id, "r2");
	}

	#[test]
	fn oversized_words_are_split() {
		assert_eq!(wrap("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
		assert_eq!(wrap("", 5), vec![String::new()]);
	}

	proptest! {
		#[test]
		fn projection_preserves_counts(
			contents in proptest::collection::vec("[a-z ]{0,60}", 0..12),
			links in proptest::collection::vec((0usize..16, 0usize..16, 0usize..4), 0..24),
		) {
			let mut g = Graph::default();
			for content in &contents {
				g.add_unit(content.clone(), UnitType::Fact);
			}
			for (s, t, k) in links {
				g.add_relation(format!("u{}", s + 1), format!("u{}", t + 1), RelationKind::ALL[k], None);
			}
			let elements = project(&g);
			prop_assert_eq!(elements.nodes.len(), g.units.len());
			prop_assert_eq!(elements.edges.len(), g.relations.len());
			for node in &elements.nodes {
				prop_assert!(node.width >= MIN_WIDTH && node.width <= MAX_WIDTH);
			}
		}
	}
}
