//! Argument graph domain types as exchanged with the analysis server.
//!
//! The server owns every entity. The client keeps a transient copy of one
//! [`Graph`] and replaces it wholesale whenever a mutating call succeeds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Identifier of a [`Unit`] within its graph.
pub type UnitId = String;
/// Durable identifier of a [`Relation`], assigned when the relation is created.
pub type RelationId = String;
/// Identifier of an [`EvidenceCard`].
pub type CardId = String;
/// Identifier of a [`SupportingDocument`].
pub type DocumentId = String;
/// Free-form metadata bag populated by server-side analyses.
pub type Metadata = Map<String, Value>;

/// Claim category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnitType {
	#[default]
	Fact,
	Value,
	Policy,
	Other,
}

impl UnitType {
	/// All claim categories in display order.
	pub const ALL: [UnitType; 4] = [Self::Fact, Self::Value, Self::Policy, Self::Other];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Fact => "fact",
			Self::Value => "value",
			Self::Policy => "policy",
			Self::Other => "other",
		}
	}

	/// Lenient parse: anything unrecognised is [`UnitType::Other`].
	pub fn parse(s: &str) -> Self {
		match s.trim().to_ascii_lowercase().as_str() {
			"fact" => Self::Fact,
			"value" => Self::Value,
			"policy" => Self::Policy,
			_ => Self::Other,
		}
	}
}

impl fmt::Display for UnitType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for UnitType {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for UnitType {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(Self::parse(&raw))
	}
}

/// Kind of a directed relation between two units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
	#[default]
	Support,
	Attack,
	Undercut,
	Rebut,
}

impl RelationKind {
	/// All relation kinds in display order.
	pub const ALL: [RelationKind; 4] = [Self::Support, Self::Attack, Self::Undercut, Self::Rebut];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Support => "support",
			Self::Attack => "attack",
			Self::Undercut => "undercut",
			Self::Rebut => "rebut",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
	}
}

impl fmt::Display for RelationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A claim node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
	pub id: UnitId,
	pub content: String,
	#[serde(rename = "type", default)]
	pub unit_type: UnitType,
	/// Attached evidence card ids.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub evidence: Vec<CardId>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub metadata: Metadata,
}

/// A directed, typed edge between two units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relation {
	/// Empty on payloads that predate durable ids; see [`Graph::ensure_relation_ids`].
	#[serde(default)]
	pub id: RelationId,
	#[serde(alias = "src")]
	pub source: UnitId,
	#[serde(alias = "dst")]
	pub target: UnitId,
	pub kind: RelationKind,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub weight: Option<f64>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub metadata: Metadata,
}

impl Relation {
	pub fn touches(&self, unit: &str) -> bool {
		self.source == unit || self.target == unit
	}
}

/// A citation linking units to an excerpt of a supporting document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvidenceCard {
	pub id: CardId,
	pub title: String,
	#[serde(alias = "doc_id")]
	pub document_id: DocumentId,
	#[serde(default)]
	pub excerpt: String,
	#[serde(default)]
	pub confidence: f64,
}

/// A source document evidence cards quote from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportingDocument {
	pub id: DocumentId,
	pub name: String,
	#[serde(rename = "type", default)]
	pub doc_type: String,
	#[serde(default)]
	pub url: String,
}

/// An argument graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
	/// Server-assigned id. Empty until the graph has been created remotely.
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub units: BTreeMap<UnitId, Unit>,
	#[serde(default)]
	pub relations: Vec<Relation>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub evidence_cards: BTreeMap<CardId, EvidenceCard>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub supporting_documents: BTreeMap<DocumentId, SupportingDocument>,
}

/// Body of `POST /graphs`: a graph without its id.
#[derive(Debug, Serialize)]
pub struct GraphPayload<'a> {
	pub units: &'a BTreeMap<UnitId, Unit>,
	pub relations: &'a [Relation],
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub evidence_cards: &'a BTreeMap<CardId, EvidenceCard>,
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub supporting_documents: &'a BTreeMap<DocumentId, SupportingDocument>,
}

/// Returns `<prefix><n>` where `n` is one past the largest numeric suffix among `existing`.
fn next_id<'a>(prefix: &str, existing: impl Iterator<Item = &'a str>) -> String {
	let max = existing
		.filter_map(|id| id.strip_prefix(prefix))
		.filter_map(|suffix| suffix.parse::<u64>().ok())
		.max()
		.unwrap_or(0);
	format!("{prefix}{}", max + 1)
}

impl Graph {
	pub fn unit(&self, id: &str) -> Option<&Unit> {
		self.units.get(id)
	}

	pub fn relation(&self, id: &str) -> Option<&Relation> {
		self.relations.iter().find(|r| r.id == id)
	}

	pub fn next_unit_id(&self) -> UnitId {
		next_id("u", self.units.keys().map(String::as_str))
	}

	pub fn next_relation_id(&self) -> RelationId {
		next_id("r", self.relations.iter().map(|r| r.id.as_str()))
	}

	/// Adds a claim and returns its freshly assigned id.
	pub fn add_unit(&mut self, content: impl Into<String>, unit_type: UnitType) -> UnitId {
		let id = self.next_unit_id();
		self.units.insert(
			id.clone(),
			Unit {
				id: id.clone(),
				content: content.into(),
				unit_type,
				evidence: Vec::new(),
				metadata: Metadata::new(),
			},
		);
		id
	}

	/// Appends a relation with a durable id. Endpoints are not checked.
	pub fn add_relation(
		&mut self,
		source: impl Into<UnitId>,
		target: impl Into<UnitId>,
		kind: RelationKind,
		weight: Option<f64>,
	) -> RelationId {
		let id = self.next_relation_id();
		self.relations.push(Relation {
			id: id.clone(),
			source: source.into(),
			target: target.into(),
			kind,
			weight,
			metadata: Metadata::new(),
		});
		id
	}

	/// Removes a unit together with every relation that references it.
	/// Returns the unit and the number of relations dropped.
	pub fn remove_unit(&mut self, id: &str) -> Option<(Unit, usize)> {
		let unit = self.units.remove(id)?;
		let before = self.relations.len();
		self.relations.retain(|r| !r.touches(id));
		Some((unit, before - self.relations.len()))
	}

	pub fn remove_relation(&mut self, id: &str) -> Option<Relation> {
		let pos = self.relations.iter().position(|r| r.id == id)?;
		Some(self.relations.remove(pos))
	}

	/// Gives every relation without an id a fresh one, preserving order.
	pub fn ensure_relation_ids(&mut self) {
		for i in 0..self.relations.len() {
			if self.relations[i].id.is_empty() {
				self.relations[i].id = self.next_relation_id();
			}
		}
	}

	pub fn payload(&self) -> GraphPayload<'_> {
		GraphPayload {
			units: &self.units,
			relations: &self.relations,
			evidence_cards: &self.evidence_cards,
			supporting_documents: &self.supporting_documents,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Graph {
		let mut g = Graph {
			id: "g1".into(),
			..Graph::default()
		};
		let a = g.add_unit("A", UnitType::Fact);
		let b = g.add_unit("B", UnitType::Fact);
		let c = g.add_unit("C", UnitType::Policy);
		g.add_relation(&a, &b, RelationKind::Support, None);
		g.add_relation(&c, &a, RelationKind::Attack, Some(0.5));
		g.add_relation(&b, &c, RelationKind::Rebut, None);
		g
	}

	#[test]
	fn ids_follow_largest_suffix() {
		let mut g = sample();
		assert_eq!(g.next_unit_id(), "u4");
		g.remove_unit("u2");
		assert_eq!(g.next_unit_id(), "u4");
		g.units.clear();
		assert_eq!(g.next_unit_id(), "u1");
	}

	#[test]
	fn removing_a_unit_drops_incident_relations() {
		let mut g = sample();
		let (unit, dropped) = g.remove_unit("u1").unwrap();
		assert_eq!(unit.content, "A");
		assert_eq!(dropped, 2);
		assert!(g.relations.iter().all(|r| !r.touches("u1")));
		assert_eq!(g.relations.len(), 1);
		assert!(g.remove_unit("u1").is_none());
	}

	#[test]
	fn relation_ids_survive_removal_of_earlier_relations() {
		let mut g = sample();
		let last = g.relations[2].id.clone();
		g.remove_relation("r1").unwrap();
		assert_eq!(g.relation(&last).unwrap().kind, RelationKind::Rebut);
		assert_eq!(g.next_relation_id(), "r4");
	}

	#[test]
	fn legacy_relations_get_ids_on_load() {
		let raw = r#"{
			"id": "g7",
			"units": {"a": {"id": "a", "content": "A", "type": "claim"}},
			"relations": [
				{"src": "a", "dst": "b", "kind": "support"},
				{"id": "r4", "source": "b", "target": "a", "kind": "undercut"},
				{"src": "b", "dst": "a", "kind": "attack"}
			]
		}"#;
		let mut g: Graph = serde_json::from_str(raw).unwrap();
		assert_eq!(g.units["a"].unit_type, UnitType::Other);
		g.ensure_relation_ids();
		let ids: Vec<_> = g.relations.iter().map(|r| r.id.as_str()).collect();
		assert_eq!(ids, ["r5", "r4", "r6"]);
	}

	#[test]
	fn create_payload_omits_id_and_empty_collections() {
		let g = sample();
		let json = serde_json::to_value(g.payload()).unwrap();
		assert!(json.get("id").is_none());
		assert!(json.get("evidence_cards").is_none());
		assert_eq!(json["relations"].as_array().unwrap().len(), 3);
		assert_eq!(json["units"]["u3"]["type"], "policy");
	}

	#[test]
	fn relation_kind_parse_is_case_insensitive() {
		assert_eq!(RelationKind::parse(" Attack "), Some(RelationKind::Attack));
		assert_eq!(RelationKind::parse("supports"), None);
	}
}
