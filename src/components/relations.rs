//! Relation authoring, edge-drawing mode and the relation list.

use leptos::prelude::*;

use super::use_app;
use super::widgets::{DynamicSelect, FormInput, FormSelect, Section, unit_options};
use crate::actions::Command;
use crate::model::RelationKind;
use crate::state::{Action, FormField, Panel, Selection};

pub fn relation_kind_options() -> Vec<(&'static str, &'static str)> {
	RelationKind::ALL
		.iter()
		.map(|k| (k.as_str(), k.as_str()))
		.collect()
}

#[component]
pub fn RelationsPanel() -> impl IntoView {
	let app = use_app();
	let units = unit_options();

	let relations = move || {
		app.state.with(|s| {
			s.graph
				.iter()
				.flat_map(|g| g.relations.iter())
				.map(|r| {
					let weight = r.weight.map(|w| format!(" {w:.2}")).unwrap_or_default();
					(
						r.id.clone(),
						format!("{} → {}  {}{weight}", r.source, r.target, r.kind),
						s.selection == Selection::Edge(r.id.clone()),
					)
				})
				.collect::<Vec<_>>()
		})
	};

	view! {
		<Section title="Relations" panel=Panel::Relations>
			<DynamicSelect field=FormField::RelationSource label="From" options=units />
			<DynamicSelect field=FormField::RelationTarget label="To" options=units />
			<FormSelect
				field=FormField::RelationKind
				label="Kind"
				options=relation_kind_options()
			/>
			<FormInput field=FormField::RelationWeight label="Weight" placeholder="optional" />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::AddRelation)
			>
				"Add relation"
			</button>
			<label class="toggle">
				<input
					type="checkbox"
					prop:checked=move || app.state.with(|s| s.edge_mode)
					on:change=move |ev| app.apply(Action::SetEdgeMode(event_target_checked(&ev)))
				/>
				"Draw relations on the canvas"
			</label>
			<ul class="item-list">
				{move || {
					relations()
						.into_iter()
						.map(|(id, text, selected)| {
							let target = id.clone();
							view! {
								<li
									class:selected=selected
									on:click=move |_| {
										app.apply(Action::Select(Selection::Edge(target.clone())))
									}
								>
									<span class="item-id">{id}</span>
									<span>{text}</span>
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</Section>
	}
}
