//! Application state and the reducer that mutates it.
//!
//! The whole UI reads from one [`AppState`]. It changes only through
//! [`AppState::apply`], one [`Action`] at a time, so every command's effect
//! on the state is the ordered list of actions it produced.
//!
//! Consistency model: the server copy is authoritative and edits are sent as
//! full-graph replacements. Two commands in flight at once race, and whichever
//! response is applied last wins. Analysis results are tagged with the graph
//! they were computed for and dropped if another graph became current first.

use std::collections::{BTreeMap, VecDeque};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::DiagnosticsReport;
use crate::config::AppConfig;
use crate::model::{EvidenceCard, Graph, RelationId, SupportingDocument, UnitId};

/// Console history is capped to this many lines.
pub const CONSOLE_CAPACITY: usize = 200;

/// What the user has selected on the canvas or in a list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	None,
	Node(UnitId),
	Edge(RelationId),
}

impl Selection {
	/// Id of the selected element, if any.
	pub fn id(&self) -> Option<&str> {
		match self {
			Selection::None => None,
			Selection::Node(id) | Selection::Edge(id) => Some(id),
		}
	}
}

/// UI panel an error message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Panel {
	Graph,
	Claims,
	Relations,
	Evidence,
	Diagnostics,
	Credibility,
	Reasoning,
	Inspector,
	Dataset,
	Import,
}

impl Panel {
	pub fn label(self) -> &'static str {
		match self {
			Panel::Graph => "graph",
			Panel::Claims => "claims",
			Panel::Relations => "relations",
			Panel::Evidence => "evidence",
			Panel::Diagnostics => "diagnostics",
			Panel::Credibility => "credibility",
			Panel::Reasoning => "reasoning",
			Panel::Inspector => "inspector",
			Panel::Dataset => "dataset",
			Panel::Import => "import",
		}
	}
}

/// Editable form inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
	GraphId,
	ClaimContent,
	ClaimType,
	EditContent,
	EditType,
	RelationSource,
	RelationTarget,
	RelationKind,
	RelationWeight,
	DocumentName,
	DocumentType,
	DocumentUrl,
	CardTitle,
	CardDocument,
	CardExcerpt,
	CardConfidence,
	AttachUnit,
	AttachCard,
	Semantics,
	Provider,
	Model,
	DatasetPath,
}

/// Current text of every form input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Forms {
	pub graph_id: String,
	pub claim_content: String,
	pub claim_type: String,
	pub edit_content: String,
	pub edit_type: String,
	pub relation_source: String,
	pub relation_target: String,
	pub relation_kind: String,
	pub relation_weight: String,
	pub document_name: String,
	pub document_type: String,
	pub document_url: String,
	pub card_title: String,
	pub card_document: String,
	pub card_excerpt: String,
	pub card_confidence: String,
	pub attach_unit: String,
	pub attach_card: String,
	pub semantics: String,
	pub provider: String,
	pub model: String,
	pub dataset_path: String,
}

impl Forms {
	fn slot(&mut self, field: FormField) -> &mut String {
		match field {
			FormField::GraphId => &mut self.graph_id,
			FormField::ClaimContent => &mut self.claim_content,
			FormField::ClaimType => &mut self.claim_type,
			FormField::EditContent => &mut self.edit_content,
			FormField::EditType => &mut self.edit_type,
			FormField::RelationSource => &mut self.relation_source,
			FormField::RelationTarget => &mut self.relation_target,
			FormField::RelationKind => &mut self.relation_kind,
			FormField::RelationWeight => &mut self.relation_weight,
			FormField::DocumentName => &mut self.document_name,
			FormField::DocumentType => &mut self.document_type,
			FormField::DocumentUrl => &mut self.document_url,
			FormField::CardTitle => &mut self.card_title,
			FormField::CardDocument => &mut self.card_document,
			FormField::CardExcerpt => &mut self.card_excerpt,
			FormField::CardConfidence => &mut self.card_confidence,
			FormField::AttachUnit => &mut self.attach_unit,
			FormField::AttachCard => &mut self.attach_card,
			FormField::Semantics => &mut self.semantics,
			FormField::Provider => &mut self.provider,
			FormField::Model => &mut self.model,
			FormField::DatasetPath => &mut self.dataset_path,
		}
	}

	pub fn get(&self, field: FormField) -> &str {
		match field {
			FormField::GraphId => &self.graph_id,
			FormField::ClaimContent => &self.claim_content,
			FormField::ClaimType => &self.claim_type,
			FormField::EditContent => &self.edit_content,
			FormField::EditType => &self.edit_type,
			FormField::RelationSource => &self.relation_source,
			FormField::RelationTarget => &self.relation_target,
			FormField::RelationKind => &self.relation_kind,
			FormField::RelationWeight => &self.relation_weight,
			FormField::DocumentName => &self.document_name,
			FormField::DocumentType => &self.document_type,
			FormField::DocumentUrl => &self.document_url,
			FormField::CardTitle => &self.card_title,
			FormField::CardDocument => &self.card_document,
			FormField::CardExcerpt => &self.card_excerpt,
			FormField::CardConfidence => &self.card_confidence,
			FormField::AttachUnit => &self.attach_unit,
			FormField::AttachCard => &self.attach_card,
			FormField::Semantics => &self.semantics,
			FormField::Provider => &self.provider,
			FormField::Model => &self.model,
			FormField::DatasetPath => &self.dataset_path,
		}
	}

	pub fn set(&mut self, field: FormField, value: String) {
		*self.slot(field) = value;
	}
}

/// Analysis results cached client-side and carried in exported bundles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCache {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub diagnostics: Option<DiagnosticsReport>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub credibility: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoning: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reasoner: Option<Value>,
}

impl AnalysisCache {
	pub fn is_empty(&self) -> bool {
		self.diagnostics.is_none()
			&& self.credibility.is_none()
			&& self.reasoning.is_none()
			&& self.reasoner.is_none()
	}
}

/// Transient results shown for the selected edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inspector {
	pub validation: Option<Value>,
	pub assumptions: Option<Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineLevel {
	Info,
	Error,
}

/// One line of the in-app console.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsoleLine {
	pub seq: u64,
	pub level: LineLevel,
	pub text: String,
}

/// A discrete state transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	EditForm(FormField, String),
	Select(Selection),
	SetEdgeMode(bool),
	SetZoomSensitivity(f64),
	SetPanSensitivity(f64),
	HealthChecked(String),
	/// Replaces the current graph with a server copy.
	GraphLoaded(Graph),
	/// A server copy fetched as part of a command on `graph_id`. Dropped when
	/// another graph has become current.
	GraphRefreshed {
		graph_id: String,
		graph: Graph,
	},
	/// Replaces the current graph and restores cached analysis from a bundle.
	Imported {
		graph: Graph,
		analysis: AnalysisCache,
	},
	DiagnosticsComputed {
		graph_id: String,
		report: DiagnosticsReport,
	},
	CredibilityComputed {
		graph_id: String,
		result: Value,
	},
	ReasoningComputed {
		graph_id: String,
		result: Value,
	},
	ReasonerComputed {
		graph_id: String,
		result: Value,
	},
	EdgeValidated {
		graph_id: String,
		edge_id: RelationId,
		result: Value,
	},
	AssumptionsChecked {
		graph_id: String,
		edge_id: RelationId,
		result: Value,
	},
	EvidenceLoaded {
		graph_id: String,
		cards: Vec<EvidenceCard>,
		documents: Vec<SupportingDocument>,
	},
	/// A command finished; clears its panel's error.
	Succeeded(Panel),
	Failed {
		panel: Panel,
		message: String,
	},
	Log(String),
	ClearConsole,
}

/// Everything the views render.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
	pub graph: Option<Graph>,
	pub selection: Selection,
	pub forms: Forms,
	pub analysis: AnalysisCache,
	pub inspector: Inspector,
	pub evidence_cards: Vec<EvidenceCard>,
	pub documents: Vec<SupportingDocument>,
	pub errors: BTreeMap<Panel, String>,
	pub console: VecDeque<ConsoleLine>,
	pub server_status: Option<String>,
	pub edge_mode: bool,
	pub zoom_sensitivity: f64,
	pub pan_sensitivity: f64,
	next_seq: u64,
}

impl Default for AppState {
	fn default() -> Self {
		Self::new(&AppConfig::default())
	}
}

impl AppState {
	pub fn new(config: &AppConfig) -> Self {
		let forms = Forms {
			claim_type: "fact".to_string(),
			edit_type: "fact".to_string(),
			relation_kind: "support".to_string(),
			document_type: "web".to_string(),
			card_confidence: "0.8".to_string(),
			semantics: "grounded".to_string(),
			provider: config.default_provider.as_str().to_string(),
			model: config.model(),
			dataset_path: config.default_dataset_path.clone(),
			..Forms::default()
		};
		Self {
			graph: None,
			selection: Selection::None,
			forms,
			analysis: AnalysisCache::default(),
			inspector: Inspector::default(),
			evidence_cards: Vec::new(),
			documents: Vec::new(),
			errors: BTreeMap::new(),
			console: VecDeque::new(),
			server_status: None,
			edge_mode: false,
			zoom_sensitivity: config.zoom_sensitivity,
			pan_sensitivity: config.pan_sensitivity,
			next_seq: 0,
		}
	}

	pub fn graph_id(&self) -> Option<&str> {
		self.graph.as_ref().map(|g| g.id.as_str())
	}

	pub fn error(&self, panel: Panel) -> Option<&str> {
		self.errors.get(&panel).map(String::as_str)
	}

	pub fn apply_all(&mut self, actions: impl IntoIterator<Item = Action>) {
		for action in actions {
			self.apply(action);
		}
	}

	pub fn apply(&mut self, action: Action) {
		match action {
			Action::EditForm(field, value) => self.forms.set(field, value),
			Action::Select(selection) => self.select(selection),
			Action::SetEdgeMode(on) => self.edge_mode = on,
			Action::SetZoomSensitivity(v) => self.zoom_sensitivity = v.clamp(0.1, 5.0),
			Action::SetPanSensitivity(v) => self.pan_sensitivity = v.clamp(0.1, 5.0),
			Action::HealthChecked(status) => self.server_status = Some(status),
			Action::GraphLoaded(graph) => self.replace_graph(graph, None),
			Action::GraphRefreshed { graph_id, graph } => {
				if self.is_current(&graph_id) {
					self.replace_graph(graph, None);
				}
			}
			Action::Imported { graph, analysis } => self.replace_graph(graph, Some(analysis)),
			Action::DiagnosticsComputed { graph_id, report } => {
				if self.is_current(&graph_id) {
					self.analysis.diagnostics = Some(report);
				}
			}
			Action::CredibilityComputed { graph_id, result } => {
				if self.is_current(&graph_id) {
					self.analysis.credibility = Some(result);
				}
			}
			Action::ReasoningComputed { graph_id, result } => {
				if self.is_current(&graph_id) {
					self.analysis.reasoning = Some(result);
				}
			}
			Action::ReasonerComputed { graph_id, result } => {
				if self.is_current(&graph_id) {
					self.analysis.reasoner = Some(result);
				}
			}
			Action::EdgeValidated {
				graph_id,
				edge_id,
				result,
			} => {
				if self.is_current(&graph_id) && self.selection == Selection::Edge(edge_id) {
					self.inspector.validation = Some(result);
				}
			}
			Action::AssumptionsChecked {
				graph_id,
				edge_id,
				result,
			} => {
				if self.is_current(&graph_id) && self.selection == Selection::Edge(edge_id) {
					self.inspector.assumptions = Some(result);
				}
			}
			Action::EvidenceLoaded {
				graph_id,
				cards,
				documents,
			} => {
				if self.is_current(&graph_id) {
					self.evidence_cards = cards;
					self.documents = documents;
				}
			}
			Action::Succeeded(panel) => {
				self.errors.remove(&panel);
			}
			Action::Failed { panel, message } => {
				self.push_line(LineLevel::Error, format!("[{}] {message}", panel.label()));
				self.errors.insert(panel, message);
			}
			Action::Log(text) => self.push_line(LineLevel::Info, text),
			Action::ClearConsole => self.console.clear(),
		}
	}

	fn is_current(&self, graph_id: &str) -> bool {
		let current = self.graph_id() == Some(graph_id);
		if !current {
			debug!("dropping result computed for stale graph {graph_id}");
		}
		current
	}

	fn replace_graph(&mut self, mut graph: Graph, analysis: Option<AnalysisCache>) {
		graph.ensure_relation_ids();
		if self.graph_id() != Some(graph.id.as_str()) {
			self.analysis = AnalysisCache::default();
			self.evidence_cards.clear();
			self.documents.clear();
		}
		if let Some(analysis) = analysis {
			self.analysis = analysis;
		}
		self.forms.graph_id = graph.id.clone();
		self.graph = Some(graph);
		self.reconcile_selection();
	}

	fn contains(&self, selection: &Selection) -> bool {
		match (selection, &self.graph) {
			(Selection::None, _) => true,
			(_, None) => false,
			(Selection::Node(id), Some(g)) => g.unit(id).is_some(),
			(Selection::Edge(id), Some(g)) => g.relation(id).is_some(),
		}
	}

	/// Drops a selection whose element no longer exists in the graph.
	fn reconcile_selection(&mut self) {
		if !self.contains(&self.selection) {
			self.select(Selection::None);
		}
	}

	/// Sets the selection and resets inspector state from the selected element.
	/// Selecting an element the graph does not have selects nothing.
	fn select(&mut self, selection: Selection) {
		let selection = if self.contains(&selection) {
			selection
		} else {
			Selection::None
		};
		self.inspector = Inspector::default();
		if let Some(graph) = &self.graph {
			match &selection {
				Selection::Node(id) => {
					if let Some(unit) = graph.unit(id) {
						self.forms.edit_content = unit.content.clone();
						self.forms.edit_type = unit.unit_type.as_str().to_string();
						self.forms.attach_unit = unit.id.clone();
					}
				}
				Selection::Edge(id) => {
					if let Some(relation) = graph.relation(id) {
						self.inspector.validation = relation.metadata.get("validation").cloned();
						self.inspector.assumptions = relation.metadata.get("assumptions").cloned();
					}
				}
				Selection::None => {}
			}
		}
		self.selection = selection;
	}

	fn push_line(&mut self, level: LineLevel, text: String) {
		self.next_seq += 1;
		self.console.push_back(ConsoleLine {
			seq: self.next_seq,
			level,
			text,
		});
		while self.console.len() > CONSOLE_CAPACITY {
			self.console.pop_front();
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::model::{RelationKind, UnitType};

	fn two_claims() -> Graph {
		let mut g = Graph {
			id: "g1".into(),
			..Graph::default()
		};
		g.add_unit("A", UnitType::Fact);
		g.add_unit("B", UnitType::Fact);
		g.add_relation("u1", "u2", RelationKind::Support, None);
		g
	}

	fn loaded() -> AppState {
		let mut state = AppState::default();
		state.apply(Action::GraphLoaded(two_claims()));
		state
	}

	#[test]
	fn selecting_an_edge_reads_its_cached_results() {
		let mut graph = two_claims();
		graph.relations[0]
			.metadata
			.insert("validation".into(), json!({"score": 0.9}));
		let mut state = AppState::default();
		state.apply(Action::GraphLoaded(graph));

		state.apply(Action::Select(Selection::Edge("r1".into())));
		assert_eq!(state.inspector.validation, Some(json!({"score": 0.9})));
		assert_eq!(state.inspector.assumptions, None);

		state.apply(Action::Select(Selection::Node("u1".into())));
		assert_eq!(state.inspector, Inspector::default());
		assert_eq!(state.forms.edit_content, "A");
		assert_eq!(state.forms.attach_unit, "u1");
	}

	#[test]
	fn reload_without_selected_edge_clears_selection() {
		let mut state = loaded();
		state.apply(Action::Select(Selection::Edge("r1".into())));

		let mut next = two_claims();
		next.remove_unit("u1");
		state.apply(Action::GraphLoaded(next));

		assert_eq!(state.selection, Selection::None);
	}

	#[test]
	fn reload_keeps_surviving_selection_and_inspector() {
		let mut state = loaded();
		state.apply(Action::Select(Selection::Edge("r1".into())));
		state.apply(Action::EdgeValidated {
			graph_id: "g1".into(),
			edge_id: "r1".into(),
			result: json!({"score": 0.4}),
		});
		state.apply(Action::GraphLoaded(two_claims()));

		assert_eq!(state.selection, Selection::Edge("r1".into()));
		assert_eq!(state.inspector.validation, Some(json!({"score": 0.4})));
	}

	#[test]
	fn results_for_another_graph_are_dropped() {
		let mut state = loaded();
		state.apply(Action::DiagnosticsComputed {
			graph_id: "g0".into(),
			report: DiagnosticsReport::default(),
		});
		assert!(state.analysis.diagnostics.is_none());

		state.apply(Action::CredibilityComputed {
			graph_id: "g1".into(),
			result: json!({"u1": 0.7}),
		});
		assert!(state.analysis.credibility.is_some());
	}

	#[test]
	fn refreshes_of_another_graph_do_not_switch_back() {
		let mut state = loaded();
		let other = Graph {
			id: "g2".into(),
			..Graph::default()
		};
		state.apply(Action::GraphLoaded(other));
		state.apply(Action::GraphRefreshed {
			graph_id: "g1".into(),
			graph: two_claims(),
		});
		assert_eq!(state.graph_id(), Some("g2"));

		let mut updated = Graph {
			id: "g2".into(),
			..Graph::default()
		};
		updated.add_unit("C", UnitType::Value);
		state.apply(Action::GraphRefreshed {
			graph_id: "g2".into(),
			graph: updated,
		});
		assert_eq!(state.graph.as_ref().map(|g| g.units.len()), Some(1));
	}

	#[test]
	fn switching_graphs_resets_analysis() {
		let mut state = loaded();
		state.apply(Action::ReasoningComputed {
			graph_id: "g1".into(),
			result: json!({"extensions": [["u1"]]}),
		});
		let other = Graph {
			id: "g2".into(),
			..Graph::default()
		};
		state.apply(Action::GraphLoaded(other));
		assert!(state.analysis.is_empty());
		assert_eq!(state.forms.graph_id, "g2");
	}

	#[test]
	fn failures_touch_only_their_panel_and_the_console() {
		let mut state = loaded();
		let before = state.clone();
		state.apply(Action::Failed {
			panel: Panel::Diagnostics,
			message: "POST /graphs/g1/diagnostics failed with status 500".into(),
		});

		assert_eq!(state.graph, before.graph);
		assert_eq!(state.analysis, before.analysis);
		assert!(state.error(Panel::Diagnostics).unwrap().contains("500"));
		assert_eq!(state.console.len(), 1);

		state.apply(Action::Succeeded(Panel::Diagnostics));
		assert!(state.error(Panel::Diagnostics).is_none());
	}

	#[test]
	fn selecting_a_missing_element_selects_nothing() {
		let mut state = loaded();
		state.apply(Action::Select(Selection::Node("u9".into())));
		assert_eq!(state.selection, Selection::None);
	}

	#[test]
	fn console_is_bounded() {
		let mut state = AppState::default();
		for i in 0..(CONSOLE_CAPACITY + 25) {
			state.apply(Action::Log(format!("line {i}")));
		}
		assert_eq!(state.console.len(), CONSOLE_CAPACITY);
		assert_eq!(state.console.front().unwrap().text, "line 25");
	}

	#[test]
	fn forms_round_trip_every_field() {
		let mut forms = Forms::default();
		forms.set(FormField::CardExcerpt, "quoted".into());
		forms.set(FormField::DatasetPath, "/data/debates.json".into());
		assert_eq!(forms.get(FormField::CardExcerpt), "quoted");
		assert_eq!(forms.get(FormField::DatasetPath), "/data/debates.json");
	}
}
