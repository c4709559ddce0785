//! Details and per-element commands for the current selection.

use leptos::prelude::*;

use super::analysis::ProviderFields;
use super::claims::unit_type_options;
use super::use_app;
use super::widgets::{FormSelect, JsonBlock, Section, TextArea};
use crate::actions::Command;
use crate::model::{Relation, Unit};
use crate::state::{FormField, Panel, Selection};

#[component]
pub fn InspectorPanel() -> impl IntoView {
	let app = use_app();

	// Typing into the edit form must not rebuild the details.
	let selected = Memo::new(move |_| {
		app.state.with(|s| {
			let graph = s.graph.as_ref()?;
			match &s.selection {
				Selection::None => None,
				Selection::Node(id) => graph.unit(id).cloned().map(Selected::Unit),
				Selection::Edge(id) => graph.relation(id).cloned().map(Selected::Relation),
			}
		})
	});
	let body = move || {
		match selected.get() {
			Some(Selected::Unit(unit)) => view! { <UnitDetails unit=unit /> }.into_any(),
			Some(Selected::Relation(relation)) => {
				view! { <RelationDetails relation=relation /> }.into_any()
			}
			None => view! { <p class="muted">"Select a claim or relation."</p> }.into_any(),
		}
	};

	view! {
		<Section title="Inspector" panel=Panel::Inspector>
			{body}
		</Section>
	}
}

#[derive(Clone, PartialEq)]
enum Selected {
	Unit(Unit),
	Relation(Relation),
}

#[component]
fn UnitDetails(unit: Unit) -> impl IntoView {
	let app = use_app();
	let id = unit.id.clone();
	let (save, delete, score, classify) = (id.clone(), id.clone(), id.clone(), id.clone());
	let metadata = (!unit.metadata.is_empty())
		.then(|| serde_json::to_string_pretty(&unit.metadata).unwrap_or_default());
	let evidence = unit.evidence.join(", ");

	view! {
		<h3>{format!("Claim {id}")}</h3>
		<TextArea field=FormField::EditContent label="Content" />
		<FormSelect field=FormField::EditType label="Type" options=unit_type_options() />
		<div class="button-row">
			<button on:click=move |_| app.run(Command::UpdateClaim(save.clone()))>"Save"</button>
			<button class="danger" on:click=move |_| app.run(Command::DeleteUnit(delete.clone()))>
				"Delete"
			</button>
		</div>
		<p class="muted">
			{if evidence.is_empty() { "No evidence attached.".to_string() } else { format!("Evidence: {evidence}") }}
		</p>
		{metadata.map(|text| view! { <pre class="json">{text}</pre> })}

		<h3>"LLM"</h3>
		<ProviderFields />
		<div class="button-row">
			<button on:click=move |_| app.run(Command::ScoreClaim(score.clone()))>
				"Score confidence"
			</button>
			<button on:click=move |_| app.run(Command::ClassifyClaim(classify.clone()))>
				"Classify type"
			</button>
		</div>
	}
}

#[component]
fn RelationDetails(relation: Relation) -> impl IntoView {
	let app = use_app();
	let id = relation.id.clone();
	let (validate, assumptions, delete) = (id.clone(), id.clone(), id.clone());
	let weight = relation
		.weight
		.map_or_else(|| "none".to_string(), |w| format!("{w:.2}"));
	let validation = Signal::derive(move || app.state.with(|s| s.inspector.validation.clone()));
	let assumptions_result =
		Signal::derive(move || app.state.with(|s| s.inspector.assumptions.clone()));

	view! {
		<h3>{format!("Relation {id}")}</h3>
		<p>
			{format!(
				"{} → {} ({}, weight {weight})",
				relation.source,
				relation.target,
				relation.kind,
			)}
		</p>
		<button class="danger" on:click=move |_| app.run(Command::DeleteRelation(delete.clone()))>
			"Delete"
		</button>

		<h3>"LLM"</h3>
		<ProviderFields />
		<div class="button-row">
			<button on:click=move |_| app.run(Command::ValidateEdge(validate.clone()))>
				"Validate"
			</button>
			<button on:click=move |_| app.run(Command::CheckAssumptions(assumptions.clone()))>
				"Check assumptions"
			</button>
		</div>
		<h4>"Validation"</h4>
		<JsonBlock value=validation />
		<h4>"Assumptions"</h4>
		<JsonBlock value=assumptions_result />
	}
}
