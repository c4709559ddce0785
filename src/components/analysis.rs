//! Server-side analyses: structural diagnostics, credibility propagation,
//! formal reasoning and the LLM reasoner.

use leptos::prelude::*;

use super::use_app;
use super::widgets::{FormInput, FormSelect, JsonBlock, Section};
use crate::actions::Command;
use crate::api::{LlmProvider, Semantics};
use crate::state::{Action, FormField, Panel};

#[component]
pub fn DiagnosticsPanel() -> impl IntoView {
	let app = use_app();

	let report = move || {
		app.state.with(|s| s.analysis.diagnostics.clone()).map(|r| {
			let extra = (!r.extra.is_empty())
				.then(|| serde_json::to_string_pretty(&r.extra).unwrap_or_default());
			view! {
				<table class="counts">
					<tr><th>"Claims"</th><td>{r.node_count}</td></tr>
					<tr><th>"Relations"</th><td>{r.relation_count}</td></tr>
					<tr><th>"Support"</th><td>{r.support_edge_count}</td></tr>
					<tr><th>"Attack"</th><td>{r.attack_edge_count}</td></tr>
				</table>
				{extra.map(|text| view! { <pre class="json">{text}</pre> })}
			}
		})
	};

	view! {
		<Section title="Diagnostics" panel=Panel::Diagnostics>
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::RunDiagnostics)
			>
				"Run diagnostics"
			</button>
			{report}
		</Section>
	}
}

#[component]
pub fn CredibilityPanel() -> impl IntoView {
	let app = use_app();
	let result = Signal::derive(move || app.state.with(|s| s.analysis.credibility.clone()));

	view! {
		<Section title="Credibility" panel=Panel::Credibility>
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::RunCredibility)
			>
				"Propagate credibility"
			</button>
			<JsonBlock value=result />
		</Section>
	}
}

#[component]
pub fn ReasoningPanel() -> impl IntoView {
	let app = use_app();
	let reasoning = Signal::derive(move || app.state.with(|s| s.analysis.reasoning.clone()));
	let reasoner = Signal::derive(move || app.state.with(|s| s.analysis.reasoner.clone()));
	let semantics = Semantics::ALL
		.iter()
		.map(|s| (s.as_str(), s.as_str()))
		.collect::<Vec<_>>();

	view! {
		<Section title="Reasoning" panel=Panel::Reasoning>
			<FormSelect field=FormField::Semantics label="Semantics" options=semantics />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::RunReasoning)
			>
				"Compute extensions"
			</button>
			<JsonBlock value=reasoning />

			<h3>"LLM reasoner"</h3>
			<ProviderFields />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::RunReasoner)
			>
				"Run reasoner"
			</button>
			<JsonBlock value=reasoner />
		</Section>
	}
}

/// Provider and model inputs shared by every LLM-backed command. Switching
/// provider resets the model to that provider's default.
#[component]
pub fn ProviderFields() -> impl IntoView {
	let app = use_app();
	let on_change = move |ev: leptos::ev::Event| {
		let value = event_target_value(&ev);
		let provider = LlmProvider::parse(&value).unwrap_or_default();
		app.apply(Action::EditForm(FormField::Provider, value));
		app.apply(Action::EditForm(
			FormField::Model,
			provider.default_model().to_string(),
		));
	};

	view! {
		<label class="field">
			<span>"Provider"</span>
			<select on:change=on_change>
				{LlmProvider::ALL
					.into_iter()
					.map(|p| {
						view! {
							<option
								value=p.as_str()
								prop:selected=move || app.form(FormField::Provider) == p.as_str()
							>
								{p.as_str()}
							</option>
						}
					})
					.collect_view()}
			</select>
		</label>
		<FormInput field=FormField::Model label="Model" />
	}
}
