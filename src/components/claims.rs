//! Claim authoring and the claim list.

use leptos::prelude::*;

use super::use_app;
use super::widgets::{FormSelect, Section, TextArea, preview};
use crate::actions::Command;
use crate::model::UnitType;
use crate::state::{Action, FormField, Panel, Selection};

pub fn unit_type_options() -> Vec<(&'static str, &'static str)> {
	UnitType::ALL.iter().map(|t| (t.as_str(), t.as_str())).collect()
}

#[component]
pub fn ClaimsPanel() -> impl IntoView {
	let app = use_app();

	let claims = move || {
		app.state.with(|s| {
			let selected = match &s.selection {
				Selection::Node(id) => Some(id.clone()),
				_ => None,
			};
			s.graph
				.iter()
				.flat_map(|g| g.units.values())
				.map(|u| {
					(
						u.id.clone(),
						u.unit_type,
						preview(&u.content, 60),
						selected.as_deref() == Some(u.id.as_str()),
					)
				})
				.collect::<Vec<_>>()
		})
	};

	view! {
		<Section title="Claims" panel=Panel::Claims>
			<TextArea
				field=FormField::ClaimContent
				label="Content"
				placeholder="State a claim"
			/>
			<FormSelect field=FormField::ClaimType label="Type" options=unit_type_options() />
			<button
				disabled=move || !app.has_graph()
				on:click=move |_| app.run(Command::AddClaim)
			>
				"Add claim"
			</button>
			<ul class="item-list">
				{move || {
					claims()
						.into_iter()
						.map(|(id, unit_type, text, selected)| {
							let target = id.clone();
							view! {
								<li
									class:selected=selected
									on:click=move |_| {
										app.apply(Action::Select(Selection::Node(target.clone())))
									}
								>
									<span class="item-id">{id}</span>
									<span class=format!("tag tag-{unit_type}")>{unit_type.as_str()}</span>
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
