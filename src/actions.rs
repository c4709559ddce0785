//! User commands and the server round-trips behind them.
//!
//! [`execute`] runs one [`Command`] against a [`Backend`] using a snapshot of
//! the state and returns the [`Action`]s to apply, in order. A command whose
//! required inputs are blank does nothing and returns no actions. Compound
//! commands are not transactional: when a later step fails, the actions of
//! the steps that succeeded are still returned, followed by the failure.

use log::{info, warn};

use crate::api::{
	Backend, DatasetRequest, LlmProvider, LlmRequest, NewEvidenceCard, NewSupportingDocument,
	ReasoningRequest, Semantics,
};
use crate::bundle;
use crate::error::ApiError;
use crate::model::{Graph, RelationId, RelationKind, UnitId, UnitType};
use crate::state::{Action, AppState, FormField, Panel, Selection};

/// Something the user asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	CheckHealth,
	CreateGraph,
	OpenGraph,
	AddClaim,
	UpdateClaim(UnitId),
	DeleteUnit(UnitId),
	AddRelation,
	ConnectUnits { source: UnitId, target: UnitId },
	DeleteRelation(RelationId),
	RunDiagnostics,
	RunCredibility,
	RunReasoning,
	RunReasoner,
	ScoreClaim(UnitId),
	ClassifyClaim(UnitId),
	ValidateEdge(RelationId),
	CheckAssumptions(RelationId),
	RefreshEvidence,
	AddDocument,
	AddEvidenceCard,
	AttachEvidence,
	LoadDataset,
	Import { file_name: String, contents: String },
}

impl Command {
	/// Panel whose error slot this command reports into.
	pub fn panel(&self) -> Panel {
		match self {
			Command::CheckHealth | Command::CreateGraph | Command::OpenGraph => Panel::Graph,
			Command::AddClaim => Panel::Claims,
			Command::AddRelation | Command::ConnectUnits { .. } => Panel::Relations,
			Command::UpdateClaim(_)
			| Command::DeleteUnit(_)
			| Command::DeleteRelation(_)
			| Command::ScoreClaim(_)
			| Command::ClassifyClaim(_)
			| Command::ValidateEdge(_)
			| Command::CheckAssumptions(_) => Panel::Inspector,
			Command::RunDiagnostics => Panel::Diagnostics,
			Command::RunCredibility => Panel::Credibility,
			Command::RunReasoning | Command::RunReasoner => Panel::Reasoning,
			Command::RefreshEvidence
			| Command::AddDocument
			| Command::AddEvidenceCard
			| Command::AttachEvidence => Panel::Evidence,
			Command::LoadDataset => Panel::Dataset,
			Command::Import { .. } => Panel::Import,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Command::CheckHealth => "check-health",
			Command::CreateGraph => "create-graph",
			Command::OpenGraph => "open-graph",
			Command::AddClaim => "add-claim",
			Command::UpdateClaim(_) => "update-claim",
			Command::DeleteUnit(_) => "delete-unit",
			Command::AddRelation => "add-relation",
			Command::ConnectUnits { .. } => "connect-units",
			Command::DeleteRelation(_) => "delete-relation",
			Command::RunDiagnostics => "diagnostics",
			Command::RunCredibility => "credibility",
			Command::RunReasoning => "reasoning",
			Command::RunReasoner => "reasoner",
			Command::ScoreClaim(_) => "score-claim",
			Command::ClassifyClaim(_) => "classify-claim",
			Command::ValidateEdge(_) => "validate-edge",
			Command::CheckAssumptions(_) => "check-assumptions",
			Command::RefreshEvidence => "refresh-evidence",
			Command::AddDocument => "add-document",
			Command::AddEvidenceCard => "add-evidence-card",
			Command::AttachEvidence => "attach-evidence",
			Command::LoadDataset => "load-dataset",
			Command::Import { .. } => "import",
		}
	}
}

enum Failure {
	/// A required input was blank or the target no longer exists.
	Skipped,
	Api(ApiError),
	Import(String),
}

impl From<ApiError> for Failure {
	fn from(e: ApiError) -> Self {
		Failure::Api(e)
	}
}

type Step = Result<(), Failure>;

/// Runs `command` and returns the actions describing its outcome.
pub async fn execute<B: Backend + ?Sized>(
	backend: &B,
	state: &AppState,
	command: Command,
) -> Vec<Action> {
	let panel = command.panel();
	let name = command.name();
	let mut out = Vec::new();

	let step = run(backend, state, command, &mut out).await;
	match step {
		Ok(()) => {
			info!("{name}: done");
			out.push(Action::Succeeded(panel));
		}
		Err(Failure::Skipped) => {
			info!("{name}: nothing to do");
			out.clear();
		}
		Err(Failure::Api(e)) => {
			warn!("{name}: {e}");
			out.push(Action::Failed {
				panel,
				message: e.to_string(),
			});
		}
		Err(Failure::Import(message)) => {
			warn!("{name}: {message}");
			out.push(Action::Failed { panel, message });
		}
	}
	out
}

async fn run<B: Backend + ?Sized>(
	backend: &B,
	state: &AppState,
	command: Command,
	out: &mut Vec<Action>,
) -> Step {
	info!("{}: started", command.name());
	match command {
		Command::CheckHealth => {
			let health = backend.health().await?;
			out.push(Action::HealthChecked(health.status));
			Ok(())
		}
		Command::CreateGraph => {
			let graph = backend.create_graph(&Graph::default()).await?;
			out.push(Action::Log(format!("created graph {}", graph.id)));
			out.push(Action::GraphLoaded(graph));
			Ok(())
		}
		Command::OpenGraph => {
			let id = required(state, FormField::GraphId)?;
			let graph = backend.get_graph(&id).await?;
			out.push(Action::Log(format!(
				"opened graph {} ({} claims, {} relations)",
				graph.id,
				graph.units.len(),
				graph.relations.len()
			)));
			out.push(Action::GraphLoaded(graph));
			Ok(())
		}
		Command::AddClaim => add_claim(backend, state, out).await,
		Command::UpdateClaim(unit_id) => update_claim(backend, state, &unit_id, out).await,
		Command::DeleteUnit(unit_id) => {
			let mut next = current(state)?.clone();
			let (_, dropped) = next.remove_unit(&unit_id).ok_or(Failure::Skipped)?;
			save(backend, next, out).await?;
			out.push(Action::Log(format!(
				"deleted claim {unit_id} and {dropped} relation(s)"
			)));
			Ok(())
		}
		Command::AddRelation => {
			let source = required(state, FormField::RelationSource)?;
			let target = required(state, FormField::RelationTarget)?;
			connect(backend, state, source, target, out).await
		}
		Command::ConnectUnits { source, target } => {
			if source == target {
				return Err(Failure::Skipped);
			}
			connect(backend, state, source, target, out).await
		}
		Command::DeleteRelation(relation_id) => {
			let mut next = current(state)?.clone();
			next.remove_relation(&relation_id).ok_or(Failure::Skipped)?;
			save(backend, next, out).await?;
			out.push(Action::Log(format!("deleted relation {relation_id}")));
			Ok(())
		}
		Command::RunDiagnostics => {
			let graph_id = current(state)?.id.clone();
			let report = backend.diagnostics(&graph_id).await?;
			out.push(Action::Log(format!(
				"diagnostics: {} nodes, {} relations ({} support, {} attack)",
				report.node_count,
				report.relation_count,
				report.support_edge_count,
				report.attack_edge_count
			)));
			out.push(Action::DiagnosticsComputed { graph_id, report });
			Ok(())
		}
		Command::RunCredibility => credibility(backend, state, out).await,
		Command::RunReasoning => {
			let graph_id = current(state)?.id.clone();
			let semantics = Semantics::parse(&state.forms.semantics).unwrap_or_default();
			let result = backend
				.reasoning(&graph_id, &ReasoningRequest { semantics })
				.await?;
			out.push(Action::Log(format!("{} reasoning finished", semantics.as_str())));
			out.push(Action::ReasoningComputed { graph_id, result });
			Ok(())
		}
		Command::RunReasoner => {
			let graph_id = current(state)?.id.clone();
			let request = llm_request(state);
			let result = backend.reasoner(&graph_id, &request).await?;
			out.push(Action::Log(format!(
				"reasoner finished ({} / {})",
				request.provider, request.model
			)));
			out.push(Action::ReasonerComputed { graph_id, result });
			Ok(())
		}
		Command::ScoreClaim(unit_id) => {
			let graph = current(state)?;
			if graph.unit(&unit_id).is_none() {
				return Err(Failure::Skipped);
			}
			let request = llm_request(state);
			let result = backend
				.llm_confidence(&graph.id, &unit_id, &request)
				.await?;
			out.push(Action::Log(format!("scored claim {unit_id}: {result}")));
			credibility(backend, state, out).await
		}
		Command::ClassifyClaim(unit_id) => {
			let graph = current(state)?;
			if graph.unit(&unit_id).is_none() {
				return Err(Failure::Skipped);
			}
			let result = backend
				.claim_type(&graph.id, &unit_id, &llm_request(state))
				.await?;
			out.push(Action::Log(format!("classified claim {unit_id}: {result}")));
			refetch(backend, &graph.id, out).await
		}
		Command::ValidateEdge(edge_id) => {
			let graph = current(state)?;
			if graph.relation(&edge_id).is_none() {
				return Err(Failure::Skipped);
			}
			let result = backend
				.validate_edge(&graph.id, &edge_id, &llm_request(state))
				.await?;
			out.push(Action::Log(format!("validated relation {edge_id}")));
			out.push(Action::EdgeValidated {
				graph_id: graph.id.clone(),
				edge_id,
				result,
			});
			refetch(backend, &graph.id, out).await
		}
		Command::CheckAssumptions(edge_id) => {
			let graph = current(state)?;
			if graph.relation(&edge_id).is_none() {
				return Err(Failure::Skipped);
			}
			let result = backend
				.edge_assumptions(&graph.id, &edge_id, &llm_request(state))
				.await?;
			out.push(Action::Log(format!("checked assumptions of {edge_id}")));
			out.push(Action::AssumptionsChecked {
				graph_id: graph.id.clone(),
				edge_id,
				result,
			});
			refetch(backend, &graph.id, out).await
		}
		Command::RefreshEvidence => {
			let graph_id = current(state)?.id.clone();
			refresh_evidence(backend, graph_id, out).await
		}
		Command::AddDocument => {
			let graph_id = current(state)?.id.clone();
			let document = NewSupportingDocument {
				name: required(state, FormField::DocumentName)?,
				doc_type: state.forms.document_type.trim().to_string(),
				url: required(state, FormField::DocumentUrl)?,
			};
			let created = backend
				.create_supporting_document(&graph_id, &document)
				.await?;
			out.push(Action::Log(format!("added document {}", created.id)));
			out.push(Action::EditForm(FormField::DocumentName, String::new()));
			out.push(Action::EditForm(FormField::DocumentUrl, String::new()));
			out.push(Action::EditForm(FormField::CardDocument, created.id));
			refresh_evidence(backend, graph_id, out).await
		}
		Command::AddEvidenceCard => {
			let graph_id = current(state)?.id.clone();
			let card = NewEvidenceCard {
				title: required(state, FormField::CardTitle)?,
				document_id: required(state, FormField::CardDocument)?,
				excerpt: required(state, FormField::CardExcerpt)?,
				confidence: parse_confidence(&state.forms.card_confidence),
			};
			let created = backend.create_evidence_card(&graph_id, &card).await?;
			out.push(Action::Log(format!("added evidence card {}", created.id)));
			out.push(Action::EditForm(FormField::CardTitle, String::new()));
			out.push(Action::EditForm(FormField::CardExcerpt, String::new()));
			out.push(Action::EditForm(FormField::AttachCard, created.id));
			refresh_evidence(backend, graph_id, out).await
		}
		Command::AttachEvidence => {
			let graph_id = current(state)?.id.clone();
			let unit_id = required(state, FormField::AttachUnit)?;
			let card_id = required(state, FormField::AttachCard)?;
			backend.attach_evidence(&graph_id, &unit_id, &card_id).await?;
			out.push(Action::Log(format!("attached {card_id} to {unit_id}")));
			refetch(backend, &graph_id, out).await
		}
		Command::LoadDataset => {
			let path = required(state, FormField::DatasetPath)?;
			let result = backend
				.load_dataset(&DatasetRequest { path: path.clone() })
				.await?;
			out.push(Action::Log(format!(
				"loaded dataset {path}: {}",
				serde_json::Value::Object(result.summary)
			)));
			if let Some(graph) = result.graph {
				out.push(Action::GraphLoaded(graph));
			}
			Ok(())
		}
		Command::Import {
			file_name,
			contents,
		} => {
			let imported =
				bundle::parse(&contents).map_err(|e| Failure::Import(format!("{file_name}: {e}")))?;
			let (mut graph, analysis) = imported.into_parts();
			graph.ensure_relation_ids();
			let created = backend.create_graph(&graph).await?;
			out.push(Action::Log(format!(
				"imported {file_name} as graph {}",
				created.id
			)));
			out.push(Action::Imported {
				graph: created,
				analysis,
			});
			Ok(())
		}
	}
}

fn current(state: &AppState) -> Result<&Graph, Failure> {
	state.graph.as_ref().ok_or(Failure::Skipped)
}

/// Trimmed value of a form field; blank inputs skip the command.
fn required(state: &AppState, field: FormField) -> Result<String, Failure> {
	let value = state.forms.get(field).trim();
	if value.is_empty() {
		Err(Failure::Skipped)
	} else {
		Ok(value.to_string())
	}
}

fn llm_request(state: &AppState) -> LlmRequest {
	let provider = LlmProvider::parse(&state.forms.provider).unwrap_or_default();
	let model = match state.forms.model.trim() {
		"" => provider.default_model().to_string(),
		model => model.to_string(),
	};
	LlmRequest { provider, model }
}

fn parse_confidence(raw: &str) -> f64 {
	raw.trim()
		.parse::<f64>()
		.ok()
		.filter(|v| v.is_finite())
		.map_or(0.5, |v| v.clamp(0.0, 1.0))
}

fn parse_weight(raw: &str) -> Option<f64> {
	let raw = raw.trim();
	if raw.is_empty() {
		return None;
	}
	match raw.parse::<f64>() {
		Ok(w) if w.is_finite() => Some(w),
		_ => {
			warn!("ignoring relation weight {raw:?}");
			None
		}
	}
}

/// Replaces the server copy with `graph` and loads the response, unless
/// another graph has become current by then.
async fn save<B: Backend + ?Sized>(backend: &B, graph: Graph, out: &mut Vec<Action>) -> Step {
	let saved = backend.put_graph(&graph).await?;
	out.push(Action::GraphRefreshed {
		graph_id: graph.id,
		graph: saved,
	});
	Ok(())
}

async fn refetch<B: Backend + ?Sized>(backend: &B, graph_id: &str, out: &mut Vec<Action>) -> Step {
	let graph = backend.get_graph(graph_id).await?;
	out.push(Action::GraphRefreshed {
		graph_id: graph_id.to_string(),
		graph,
	});
	Ok(())
}

async fn add_claim<B: Backend + ?Sized>(
	backend: &B,
	state: &AppState,
	out: &mut Vec<Action>,
) -> Step {
	let content = required(state, FormField::ClaimContent)?;
	let mut next = current(state)?.clone();
	let unit_id = next.add_unit(content, UnitType::parse(&state.forms.claim_type));
	save(backend, next, out).await?;
	out.push(Action::EditForm(FormField::ClaimContent, String::new()));
	out.push(Action::Log(format!("added claim {unit_id}")));
	Ok(())
}

async fn update_claim<B: Backend + ?Sized>(
	backend: &B,
	state: &AppState,
	unit_id: &str,
	out: &mut Vec<Action>,
) -> Step {
	let content = required(state, FormField::EditContent)?;
	let mut next = current(state)?.clone();
	let unit = next.units.get_mut(unit_id).ok_or(Failure::Skipped)?;
	unit.content = content;
	unit.unit_type = UnitType::parse(&state.forms.edit_type);
	save(backend, next, out).await?;
	out.push(Action::Log(format!("updated claim {unit_id}")));
	Ok(())
}

async fn connect<B: Backend + ?Sized>(
	backend: &B,
	state: &AppState,
	source: UnitId,
	target: UnitId,
	out: &mut Vec<Action>,
) -> Step {
	let mut next = current(state)?.clone();
	let kind = RelationKind::parse(&state.forms.relation_kind).unwrap_or_default();
	let weight = parse_weight(&state.forms.relation_weight);
	let relation_id = next.add_relation(source.clone(), target.clone(), kind, weight);
	save(backend, next, out).await?;
	out.push(Action::Log(format!(
		"added {kind} relation {relation_id}: {source} -> {target}"
	)));
	out.push(Action::Select(Selection::Edge(relation_id)));
	Ok(())
}

/// Runs credibility propagation and reloads the graph to pick up scores.
async fn credibility<B: Backend + ?Sized>(
	backend: &B,
	state: &AppState,
	out: &mut Vec<Action>,
) -> Step {
	let graph_id = current(state)?.id.clone();
	let result = backend.credibility(&graph_id).await?;
	out.push(Action::Log("credibility propagation finished".to_string()));
	out.push(Action::CredibilityComputed {
		graph_id: graph_id.clone(),
		result,
	});
	refetch(backend, &graph_id, out).await
}

async fn refresh_evidence<B: Backend + ?Sized>(
	backend: &B,
	graph_id: String,
	out: &mut Vec<Action>,
) -> Step {
	let cards = backend.evidence_cards(&graph_id).await?;
	let documents = backend.supporting_documents(&graph_id).await?;
	out.push(Action::EvidenceLoaded {
		graph_id,
		cards,
		documents,
	});
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn confidence_is_clamped_with_a_fallback() {
		assert_eq!(parse_confidence("0.9"), 0.9);
		assert_eq!(parse_confidence("7"), 1.0);
		assert_eq!(parse_confidence("high"), 0.5);
		assert_eq!(parse_confidence("NaN"), 0.5);
	}

	#[test]
	fn blank_weight_means_none() {
		assert_eq!(parse_weight(" "), None);
		assert_eq!(parse_weight("0.25"), Some(0.25));
		assert_eq!(parse_weight("heavy"), None);
	}

	#[test]
	fn blank_model_falls_back_to_provider_default() {
		let mut state = AppState::default();
		state.forms.provider = "anthropic".into();
		state.forms.model = "  ".into();
		let request = llm_request(&state);
		assert_eq!(request.provider, LlmProvider::Anthropic);
		assert_eq!(request.model, LlmProvider::Anthropic.default_model());
	}

	#[test]
	fn every_inspector_command_reports_to_the_inspector() {
		for command in [
			Command::UpdateClaim("u1".into()),
			Command::DeleteUnit("u1".into()),
			Command::ValidateEdge("r1".into()),
		] {
			assert_eq!(command.panel(), Panel::Inspector);
		}
	}
}
