//! Command round-trips against an in-memory analysis server.

// Test crate links every lib dep.
#![allow(unused_crate_dependencies)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use argument_workbench::actions::{Command, execute};
use argument_workbench::api::{
	Backend, DatasetLoadResult, DatasetRequest, DiagnosticsReport, Health, LlmRequest,
	NewEvidenceCard, NewSupportingDocument, ReasoningRequest,
};
use argument_workbench::bundle;
use argument_workbench::error::ApiError;
use argument_workbench::model::{
	EvidenceCard, Graph, RelationKind, SupportingDocument, UnitType,
};
use argument_workbench::state::{Action, AppState, FormField, Panel, Selection};
use async_trait::async_trait;
use futures::executor::block_on;
use serde_json::{Map, Value, json};

/// Imitates the analysis server: assigns ids, stores whole graphs, computes
/// diagnostics, and fails any endpoint named in `failing`.
#[derive(Default)]
struct FakeServer {
	graphs: RefCell<BTreeMap<String, Graph>>,
	next_id: Cell<u32>,
	failing: RefCell<HashSet<&'static str>>,
	calls: RefCell<Vec<&'static str>>,
}

impl FakeServer {
	fn fail(&self, endpoint: &'static str) {
		self.failing.borrow_mut().insert(endpoint);
	}

	fn enter(&self, endpoint: &'static str, method: &'static str, path: String) -> Result<(), ApiError> {
		self.calls.borrow_mut().push(endpoint);
		if self.failing.borrow().contains(endpoint) {
			return Err(ApiError::Status {
				method,
				path,
				status: 500,
				body: "{\"detail\":\"boom\"}".into(),
			});
		}
		Ok(())
	}

	fn fresh(&self, prefix: &str) -> String {
		self.next_id.set(self.next_id.get() + 1);
		format!("{prefix}{}", self.next_id.get())
	}

	fn stored(&self, graph_id: &str) -> Result<Graph, ApiError> {
		self.graphs
			.borrow()
			.get(graph_id)
			.cloned()
			.ok_or_else(|| ApiError::Status {
				method: "GET",
				path: format!("/graphs/{graph_id}"),
				status: 404,
				body: String::new(),
			})
	}

	fn edit<R>(&self, graph_id: &str, f: impl FnOnce(&mut Graph) -> R) -> Result<R, ApiError> {
		let mut graphs = self.graphs.borrow_mut();
		let graph = graphs.get_mut(graph_id).ok_or_else(|| ApiError::Status {
			method: "POST",
			path: format!("/graphs/{graph_id}"),
			status: 404,
			body: String::new(),
		})?;
		Ok(f(graph))
	}

	fn calls(&self) -> Vec<&'static str> {
		self.calls.borrow().clone()
	}
}

#[async_trait(?Send)]
impl Backend for FakeServer {
	async fn health(&self) -> Result<Health, ApiError> {
		self.enter("health", "GET", "/health".into())?;
		Ok(Health { status: "ok".into() })
	}

	async fn create_graph(&self, graph: &Graph) -> Result<Graph, ApiError> {
		self.enter("create_graph", "POST", "/graphs".into())?;
		let mut created = graph.clone();
		created.id = self.fresh("g");
		self.graphs
			.borrow_mut()
			.insert(created.id.clone(), created.clone());
		Ok(created)
	}

	async fn get_graph(&self, graph_id: &str) -> Result<Graph, ApiError> {
		self.enter("get_graph", "GET", format!("/graphs/{graph_id}"))?;
		self.stored(graph_id)
	}

	async fn put_graph(&self, graph: &Graph) -> Result<Graph, ApiError> {
		self.enter("put_graph", "PUT", format!("/graphs/{}", graph.id))?;
		self.edit(&graph.id, |stored| *stored = graph.clone())?;
		Ok(graph.clone())
	}

	async fn diagnostics(&self, graph_id: &str) -> Result<DiagnosticsReport, ApiError> {
		self.enter("diagnostics", "POST", format!("/graphs/{graph_id}/diagnostics"))?;
		let graph = self.stored(graph_id)?;
		let count = |kind| graph.relations.iter().filter(|r| r.kind == kind).count();
		Ok(DiagnosticsReport {
			node_count: graph.units.len(),
			relation_count: graph.relations.len(),
			support_edge_count: count(RelationKind::Support),
			attack_edge_count: count(RelationKind::Attack),
			extra: Map::new(),
		})
	}

	async fn credibility(&self, graph_id: &str) -> Result<Value, ApiError> {
		self.enter("credibility", "POST", format!("/graphs/{graph_id}/credibility"))?;
		self.edit(graph_id, |g| {
			let mut scores = Map::new();
			for unit in g.units.values_mut() {
				unit.metadata.insert("credibility".into(), json!(0.5));
				scores.insert(unit.id.clone(), json!(0.5));
			}
			json!({ "scores": scores })
		})
	}

	async fn reasoning(&self, graph_id: &str, request: &ReasoningRequest) -> Result<Value, ApiError> {
		self.enter("reasoning", "POST", format!("/graphs/{graph_id}/reasoning"))?;
		let graph = self.stored(graph_id)?;
		let accepted: Vec<_> = graph.units.keys().cloned().collect();
		Ok(json!({ "semantics": request.semantics.as_str(), "extensions": [accepted] }))
	}

	async fn reasoner(&self, graph_id: &str, request: &LlmRequest) -> Result<Value, ApiError> {
		self.enter("reasoner", "POST", format!("/graphs/{graph_id}/reasoner"))?;
		Ok(json!({ "provider": request.provider.as_str(), "summary": "consistent" }))
	}

	async fn evidence_cards(&self, graph_id: &str) -> Result<Vec<EvidenceCard>, ApiError> {
		self.enter("evidence_cards", "GET", format!("/graphs/{graph_id}/evidence-cards"))?;
		Ok(self.stored(graph_id)?.evidence_cards.into_values().collect())
	}

	async fn create_evidence_card(
		&self,
		graph_id: &str,
		card: &NewEvidenceCard,
	) -> Result<EvidenceCard, ApiError> {
		self.enter("create_evidence_card", "POST", format!("/graphs/{graph_id}/evidence-cards"))?;
		let created = EvidenceCard {
			id: self.fresh("c"),
			title: card.title.clone(),
			document_id: card.document_id.clone(),
			excerpt: card.excerpt.clone(),
			confidence: card.confidence,
		};
		self.edit(graph_id, |g| {
			g.evidence_cards.insert(created.id.clone(), created.clone())
		})?;
		Ok(created)
	}

	async fn supporting_documents(&self, graph_id: &str) -> Result<Vec<SupportingDocument>, ApiError> {
		self.enter(
			"supporting_documents",
			"GET",
			format!("/graphs/{graph_id}/supporting-documents"),
		)?;
		Ok(self.stored(graph_id)?.supporting_documents.into_values().collect())
	}

	async fn create_supporting_document(
		&self,
		graph_id: &str,
		document: &NewSupportingDocument,
	) -> Result<SupportingDocument, ApiError> {
		self.enter(
			"create_supporting_document",
			"POST",
			format!("/graphs/{graph_id}/supporting-documents"),
		)?;
		let created = SupportingDocument {
			id: self.fresh("d"),
			name: document.name.clone(),
			doc_type: document.doc_type.clone(),
			url: document.url.clone(),
		};
		self.edit(graph_id, |g| {
			g.supporting_documents
				.insert(created.id.clone(), created.clone())
		})?;
		Ok(created)
	}

	async fn attach_evidence(&self, graph_id: &str, unit_id: &str, card_id: &str) -> Result<Value, ApiError> {
		self.enter(
			"attach_evidence",
			"POST",
			format!("/graphs/{graph_id}/units/{unit_id}/evidence-cards/{card_id}"),
		)?;
		self.edit(graph_id, |g| {
			if let Some(unit) = g.units.get_mut(unit_id) {
				unit.evidence.push(card_id.to_string());
			}
		})?;
		Ok(json!({ "attached": true }))
	}

	async fn llm_confidence(&self, graph_id: &str, unit_id: &str, _request: &LlmRequest) -> Result<Value, ApiError> {
		self.enter(
			"llm_confidence",
			"POST",
			format!("/graphs/{graph_id}/units/{unit_id}/llm-confidence"),
		)?;
		self.edit(graph_id, |g| {
			if let Some(unit) = g.units.get_mut(unit_id) {
				unit.metadata.insert("llm_confidence".into(), json!(0.7));
			}
		})?;
		Ok(json!({ "confidence": 0.7 }))
	}

	async fn claim_type(&self, graph_id: &str, unit_id: &str, _request: &LlmRequest) -> Result<Value, ApiError> {
		self.enter(
			"claim_type",
			"POST",
			format!("/graphs/{graph_id}/units/{unit_id}/claim-type"),
		)?;
		self.edit(graph_id, |g| {
			if let Some(unit) = g.units.get_mut(unit_id) {
				unit.unit_type = UnitType::Value;
			}
		})?;
		Ok(json!({ "type": "value" }))
	}

	async fn validate_edge(&self, graph_id: &str, edge_id: &str, _request: &LlmRequest) -> Result<Value, ApiError> {
		self.enter(
			"validate_edge",
			"POST",
			format!("/graphs/{graph_id}/edges/{edge_id}/validate"),
		)?;
		let result = json!({ "score": 0.9, "valid": true });
		self.edit(graph_id, |g| {
			if let Some(r) = g.relations.iter_mut().find(|r| r.id == edge_id) {
				r.metadata.insert("validation".into(), result.clone());
			}
		})?;
		Ok(result)
	}

	async fn edge_assumptions(&self, graph_id: &str, edge_id: &str, _request: &LlmRequest) -> Result<Value, ApiError> {
		self.enter(
			"edge_assumptions",
			"POST",
			format!("/graphs/{graph_id}/edges/{edge_id}/assumptions"),
		)?;
		Ok(json!({ "assumptions": ["night work is widespread"] }))
	}

	async fn load_dataset(&self, request: &DatasetRequest) -> Result<DatasetLoadResult, ApiError> {
		self.enter("load_dataset", "POST", "/datasets/load".into())?;
		let mut graph = Graph::default();
		graph.add_unit(format!("loaded from {}", request.path), UnitType::Fact);
		let graph = Backend::create_graph(self, &graph).await?;
		let mut summary = Map::new();
		summary.insert("units".into(), json!(1));
		Ok(DatasetLoadResult {
			graph: Some(graph),
			summary,
		})
	}
}

/// Runs a command and applies its actions, as the UI does.
fn run(server: &FakeServer, state: &mut AppState, command: Command) -> Vec<Action> {
	let actions = block_on(execute(server, state, command));
	state.apply_all(actions.clone());
	actions
}

fn edit(state: &mut AppState, field: FormField, value: &str) {
	state.apply(Action::EditForm(field, value.to_string()));
}

/// A fresh graph holding claims "A" (u1) and "B" (u2), both facts, with A
/// supporting B (r1).
fn seeded() -> (FakeServer, AppState) {
	let server = FakeServer::default();
	let mut state = AppState::default();
	run(&server, &mut state, Command::CreateGraph);
	for content in ["A", "B"] {
		edit(&mut state, FormField::ClaimContent, content);
		run(&server, &mut state, Command::AddClaim);
	}
	edit(&mut state, FormField::RelationSource, "u1");
	edit(&mut state, FormField::RelationTarget, "u2");
	run(&server, &mut state, Command::AddRelation);
	(server, state)
}

fn graph(state: &AppState) -> &Graph {
	state.graph.as_ref().expect("a graph is open")
}

#[test]
fn diagnostics_count_claims_and_relations() {
	let (server, mut state) = seeded();
	assert_eq!(graph(&state).units.len(), 2);
	assert_eq!(graph(&state).relations[0].id, "r1");

	run(&server, &mut state, Command::RunDiagnostics);
	let report = state.analysis.diagnostics.as_ref().expect("diagnostics cached");
	assert_eq!(report.node_count, 2);
	assert_eq!(report.relation_count, 1);
	assert_eq!(report.support_edge_count, 1);
	assert_eq!(report.attack_edge_count, 0);
	assert_eq!(state.error(Panel::Diagnostics), None);
}

#[test]
fn adding_a_claim_clears_the_content_field() {
	let (_, state) = seeded();
	assert_eq!(state.forms.claim_content, "");
	assert_eq!(graph(&state).units["u1"].unit_type, UnitType::Fact);
	assert_eq!(graph(&state).units["u2"].content, "B");
}

#[test]
fn deleting_a_unit_removes_its_relations() {
	let (server, mut state) = seeded();
	run(&server, &mut state, Command::DeleteUnit("u1".into()));
	let g = graph(&state);
	assert!(g.unit("u1").is_none());
	assert!(g.relations.iter().all(|r| !r.touches("u1")));
	assert!(server.graphs.borrow()[&g.id].relations.is_empty());
}

#[test]
fn deleting_an_endpoint_clears_an_edge_selection() {
	let (server, mut state) = seeded();
	state.apply(Action::Select(Selection::Edge("r1".into())));
	assert_eq!(state.selection, Selection::Edge("r1".into()));

	run(&server, &mut state, Command::DeleteUnit("u2".into()));
	assert_eq!(state.selection, Selection::None);
}

#[test]
fn deleting_the_selected_unit_clears_the_selection() {
	let (server, mut state) = seeded();
	state.apply(Action::Select(Selection::Node("u1".into())));
	run(&server, &mut state, Command::DeleteUnit("u1".into()));
	assert_eq!(state.selection, Selection::None);
}

#[test]
fn failed_calls_only_record_the_panel_error() {
	let (server, mut state) = seeded();
	let before = state.clone();
	server.fail("put_graph");

	edit(&mut state, FormField::ClaimContent, "C");
	let before_edit = state.clone();
	let actions = run(&server, &mut state, Command::AddClaim);

	assert_eq!(actions.len(), 1);
	let message = state.error(Panel::Claims).expect("claims error recorded");
	assert!(message.contains("500"), "{message}");
	assert_eq!(state.graph, before.graph);
	assert_eq!(state.forms, before_edit.forms);
	assert_eq!(state.console.len(), before_edit.console.len() + 1);
	assert!(state.console.back().is_some_and(|l| l.text.starts_with("[claims]")));
}

#[test]
fn success_clears_a_previous_panel_error() {
	let (server, mut state) = seeded();
	server.fail("diagnostics");
	run(&server, &mut state, Command::RunDiagnostics);
	assert!(state.error(Panel::Diagnostics).is_some());

	server.failing.borrow_mut().clear();
	run(&server, &mut state, Command::RunDiagnostics);
	assert_eq!(state.error(Panel::Diagnostics), None);
}

#[test]
fn blank_inputs_are_a_no_op() {
	let (server, mut state) = seeded();
	let calls = server.calls().len();
	edit(&mut state, FormField::ClaimContent, "   ");
	let before = state.clone();

	assert!(run(&server, &mut state, Command::AddClaim).is_empty());
	edit(&mut state, FormField::GraphId, "");
	assert!(run(&server, &mut state, Command::OpenGraph).is_empty());
	assert!(run(&server, &mut state, Command::AddEvidenceCard).is_empty());

	assert_eq!(server.calls().len(), calls);
	assert_eq!(state.graph, before.graph);
	assert!(state.errors.is_empty());
}

#[test]
fn connecting_a_claim_to_itself_does_nothing() {
	let (server, mut state) = seeded();
	let command = Command::ConnectUnits {
		source: "u1".into(),
		target: "u1".into(),
	};
	assert!(run(&server, &mut state, command).is_empty());
	assert_eq!(graph(&state).relations.len(), 1);
}

#[test]
fn canvas_connections_use_the_form_kind_and_select_the_new_edge() {
	let (server, mut state) = seeded();
	edit(&mut state, FormField::RelationKind, "attack");
	edit(&mut state, FormField::RelationWeight, "");
	run(
		&server,
		&mut state,
		Command::ConnectUnits {
			source: "u2".into(),
			target: "u1".into(),
		},
	);
	let added = graph(&state).relation("r2").expect("r2 added");
	assert_eq!(added.kind, RelationKind::Attack);
	assert_eq!(state.selection, Selection::Edge("r2".into()));
}

#[test]
fn relation_ids_survive_deleting_earlier_relations() {
	let (server, mut state) = seeded();
	edit(&mut state, FormField::RelationSource, "u2");
	edit(&mut state, FormField::RelationTarget, "u1");
	run(&server, &mut state, Command::AddRelation);
	run(&server, &mut state, Command::DeleteRelation("r1".into()));

	let ids: Vec<_> = graph(&state).relations.iter().map(|r| r.id.clone()).collect();
	assert_eq!(ids, vec!["r2".to_string()]);

	run(&server, &mut state, Command::AddRelation);
	assert!(graph(&state).relation("r3").is_some());
}

#[test]
fn score_claim_is_not_transactional() {
	let (server, mut state) = seeded();
	server.fail("credibility");
	let actions = run(&server, &mut state, Command::ScoreClaim("u1".into()));

	assert_eq!(server.calls().iter().filter(|c| **c == "llm_confidence").count(), 1);
	assert!(matches!(actions.last(), Some(Action::Failed { panel: Panel::Inspector, .. })));
	assert!(state.analysis.credibility.is_none());
	// The confidence score landed on the server even though the chain failed.
	assert_eq!(
		server.graphs.borrow()[&graph(&state).id].units["u1"].metadata["llm_confidence"],
		json!(0.7)
	);
}

#[test]
fn credibility_refetches_scores_into_the_graph() {
	let (server, mut state) = seeded();
	run(&server, &mut state, Command::RunCredibility);
	assert!(state.analysis.credibility.is_some());
	assert_eq!(graph(&state).units["u2"].metadata["credibility"], json!(0.5));
}

#[test]
fn edge_validation_fills_the_inspector() {
	let (server, mut state) = seeded();
	state.apply(Action::Select(Selection::Edge("r1".into())));
	run(&server, &mut state, Command::ValidateEdge("r1".into()));
	assert_eq!(state.inspector.validation, Some(json!({ "score": 0.9, "valid": true })));

	// Reselecting restores the stored result from relation metadata.
	state.apply(Action::Select(Selection::None));
	state.apply(Action::Select(Selection::Edge("r1".into())));
	assert!(state.inspector.validation.is_some());

	run(&server, &mut state, Command::CheckAssumptions("r1".into()));
	assert!(state.inspector.assumptions.is_some());
}

#[test]
fn evidence_cards_attach_to_claims() {
	let (server, mut state) = seeded();
	edit(&mut state, FormField::DocumentName, "Labour survey");
	edit(&mut state, FormField::DocumentUrl, "https://example.org/survey");
	run(&server, &mut state, Command::AddDocument);
	assert_eq!(state.documents.len(), 1);
	assert_eq!(state.forms.card_document, state.documents[0].id);

	edit(&mut state, FormField::CardTitle, "Shift work share");
	edit(&mut state, FormField::CardExcerpt, "One in five employees works nights.");
	run(&server, &mut state, Command::AddEvidenceCard);
	assert_eq!(state.evidence_cards.len(), 1);
	assert_eq!(state.evidence_cards[0].confidence, 0.8);

	edit(&mut state, FormField::AttachUnit, "u1");
	run(&server, &mut state, Command::AttachEvidence);
	assert_eq!(graph(&state).units["u1"].evidence, vec![state.evidence_cards[0].id.clone()]);
	assert!(state.errors.is_empty());
}

#[test]
fn reasoning_uses_the_selected_semantics() {
	let (server, mut state) = seeded();
	edit(&mut state, FormField::Semantics, "preferred");
	run(&server, &mut state, Command::RunReasoning);
	let result = state.analysis.reasoning.as_ref().expect("reasoning cached");
	assert_eq!(result["semantics"], "preferred");
}

#[test]
fn results_for_a_replaced_graph_are_dropped() {
	let (server, mut state) = seeded();
	let stale = state.clone();
	run(&server, &mut state, Command::CreateGraph);

	let actions = block_on(execute(&server, &stale, Command::RunDiagnostics));
	state.apply_all(actions);
	assert!(state.analysis.diagnostics.is_none());
}

#[test]
fn late_credibility_does_not_reopen_the_previous_graph() {
	let (server, mut state) = seeded();
	let stale = state.clone();
	run(&server, &mut state, Command::CreateGraph);
	let opened = state.graph_id().map(str::to_string);
	assert_ne!(opened.as_deref(), stale.graph_id());

	let actions = block_on(execute(&server, &stale, Command::RunCredibility));
	state.apply_all(actions);
	assert_eq!(state.graph_id().map(str::to_string), opened);
	assert!(graph(&state).units.is_empty());
	assert!(state.analysis.credibility.is_none());

	// A late edit of the previous graph lands on the server only.
	let mut late = stale.clone();
	edit(&mut late, FormField::ClaimContent, "C");
	state.apply_all(block_on(execute(&server, &late, Command::AddClaim)));
	assert_eq!(state.graph_id().map(str::to_string), opened);
	assert_eq!(server.graphs.borrow()[stale.graph_id().unwrap_or_default()].units.len(), 3);
}

#[test]
fn exported_bundles_import_as_new_graphs() {
	let (server, mut state) = seeded();
	run(&server, &mut state, Command::RunDiagnostics);
	let original = graph(&state).clone();
	let text = bundle::export(&original, &state.analysis).expect("export");

	run(
		&server,
		&mut state,
		Command::Import {
			file_name: "debate.argument-bundle.json".into(),
			contents: text,
		},
	);
	let imported = graph(&state);
	assert_ne!(imported.id, original.id);
	assert_eq!(imported.units, original.units);
	assert_eq!(imported.relations, original.relations);
	assert_eq!(state.analysis.diagnostics.as_ref().map(|d| d.node_count), Some(2));
}

#[test]
fn malformed_imports_name_the_file() {
	let (server, mut state) = seeded();
	run(
		&server,
		&mut state,
		Command::Import {
			file_name: "broken.json".into(),
			contents: "{\"format\": \"something-else\"}".into(),
		},
	);
	let message = state.error(Panel::Import).expect("import error");
	assert!(message.starts_with("broken.json: "), "{message}");
	let created = server.calls().iter().filter(|c| **c == "create_graph").count();
	assert_eq!(created, 1);
}

#[test]
fn datasets_replace_the_current_graph() {
	let (server, mut state) = seeded();
	edit(&mut state, FormField::DatasetPath, "data/sample.json");
	run(&server, &mut state, Command::LoadDataset);
	let g = graph(&state);
	assert_eq!(g.units.len(), 1);
	assert_eq!(g.units["u1"].content, "loaded from data/sample.json");
}

#[test]
fn health_reaches_the_header() {
	let server = FakeServer::default();
	let mut state = AppState::default();
	run(&server, &mut state, Command::CheckHealth);
	assert_eq!(state.server_status.as_deref(), Some("ok"));
}
