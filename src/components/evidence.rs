//! Supporting documents, evidence cards, and attaching cards to claims.

use leptos::prelude::*;

use super::use_app;
use super::widgets::{DynamicSelect, FormInput, FormSelect, Section, TextArea, preview, unit_options};
use crate::actions::Command;
use crate::state::{FormField, Panel};

const DOCUMENT_TYPES: [(&str, &str); 4] = [
	("web", "web page"),
	("pdf", "pdf"),
	("dataset", "dataset"),
	("other", "other"),
];

#[component]
pub fn EvidencePanel() -> impl IntoView {
	let app = use_app();
	let units = unit_options();
	let documents = Memo::new(move |_| {
		app.state.with(|s| {
			s.documents
				.iter()
				.map(|d| (d.id.clone(), format!("{}: {}", d.id, preview(&d.name, 32))))
				.collect::<Vec<_>>()
		})
	});
	let cards = Memo::new(move |_| {
		app.state.with(|s| {
			s.evidence_cards
				.iter()
				.map(|c| (c.id.clone(), format!("{}: {}", c.id, preview(&c.title, 32))))
				.collect::<Vec<_>>()
		})
	});

	let card_rows = move || {
		app.state.with(|s| {
			s.evidence_cards
				.iter()
				.map(|c| {
					view! {
						<li>
							<span class="item-id">{c.id.clone()}</span>
							<strong>{c.title.clone()}</strong>
							<span class="muted">{format!(" {:.2}", c.confidence)}</span>
							<p>{preview(&c.excerpt, 120)}</p>
						</li>
					}
				})
				.collect_view()
		})
	};
	let document_rows = move || {
		app.state.with(|s| {
			s.documents
				.iter()
				.map(|d| {
					view! {
						<li>
							<span class="item-id">{d.id.clone()}</span>
							<a href=d.url.clone() target="_blank" rel="noopener">
								{d.name.clone()}
							</a>
							<span class="muted">{format!(" ({})", d.doc_type)}</span>
						</li>
					}
				})
				.collect_view()
		})
	};

	view! {
		<Section title="Evidence" panel=Panel::Evidence>
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::RefreshEvidence)
			>
				"Refresh"
			</button>

			<h3>"Supporting documents"</h3>
			<FormInput field=FormField::DocumentName label="Name" />
			<FormSelect
				field=FormField::DocumentType
				label="Type"
				options=DOCUMENT_TYPES.to_vec()
			/>
			<FormInput field=FormField::DocumentUrl label="URL" placeholder="https://" />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::AddDocument)
			>
				"Add document"
			</button>
			<ul class="item-list">{document_rows}</ul>

			<h3>"Evidence cards"</h3>
			<FormInput field=FormField::CardTitle label="Title" />
			<DynamicSelect field=FormField::CardDocument label="Document" options=documents />
			<TextArea field=FormField::CardExcerpt label="Excerpt" />
			<FormInput field=FormField::CardConfidence label="Confidence" placeholder="0..1" />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::AddEvidenceCard)
			>
				"Add card"
			</button>
			<ul class="item-list">{card_rows}</ul>

			<h3>"Attach to claim"</h3>
			<DynamicSelect field=FormField::AttachUnit label="Claim" options=units />
			<DynamicSelect field=FormField::AttachCard label="Card" options=cards />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::AttachEvidence)
			>
				"Attach"
			</button>
		</Section>
	}
}
