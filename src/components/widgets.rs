//! Form controls bound to [`FormField`]s, and panel chrome.

use leptos::prelude::*;
use serde_json::Value;

use super::use_app;
use crate::state::{Action, FormField, Panel};

/// Titled panel with its error line.
#[component]
pub fn Section(
	title: &'static str,
	#[prop(optional)] panel: Option<Panel>,
	children: Children,
) -> impl IntoView {
	view! {
		<section class="panel">
			<h2>{title}</h2>
			{panel.map(|panel| view! { <PanelError panel=panel /> })}
			{children()}
		</section>
	}
}

#[component]
pub fn PanelError(panel: Panel) -> impl IntoView {
	let app = use_app();
	move || {
		app.error(panel)
			.map(|message| view! { <p class="panel-error">{message}</p> })
	}
}

#[component]
pub fn FormInput(
	field: FormField,
	label: &'static str,
	#[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
	let app = use_app();
	view! {
		<label class="field">
			<span>{label}</span>
			<input
				type="text"
				placeholder=placeholder
				prop:value=move || app.form(field)
				on:input=move |ev| app.apply(Action::EditForm(field, event_target_value(&ev)))
			/>
		</label>
	}
}

#[component]
pub fn TextArea(
	field: FormField,
	label: &'static str,
	#[prop(optional)] placeholder: &'static str,
) -> impl IntoView {
	let app = use_app();
	view! {
		<label class="field">
			<span>{label}</span>
			<textarea
				rows="3"
				placeholder=placeholder
				prop:value=move || app.form(field)
				on:input=move |ev| app.apply(Action::EditForm(field, event_target_value(&ev)))
			></textarea>
		</label>
	}
}

/// Select over a fixed list of `(value, label)` pairs.
#[component]
pub fn FormSelect(
	field: FormField,
	label: &'static str,
	options: Vec<(&'static str, &'static str)>,
) -> impl IntoView {
	let app = use_app();
	view! {
		<label class="field">
			<span>{label}</span>
			<select on:change=move |ev| app.apply(Action::EditForm(field, event_target_value(&ev)))>
				{options
					.into_iter()
					.map(|(value, text)| {
						view! {
							<option value=value prop:selected=move || app.form(field) == value>
								{text}
							</option>
						}
					})
					.collect_view()}
			</select>
		</label>
	}
}

/// Select whose `(value, label)` options are derived from state.
#[component]
pub fn DynamicSelect(
	field: FormField,
	label: &'static str,
	#[prop(into)] options: Signal<Vec<(String, String)>>,
) -> impl IntoView {
	let app = use_app();
	view! {
		<label class="field">
			<span>{label}</span>
			<select on:change=move |ev| app.apply(Action::EditForm(field, event_target_value(&ev)))>
				<option value="" prop:selected=move || app.form(field).is_empty()>
					"-"
				</option>
				{move || {
					options
						.get()
						.into_iter()
						.map(|(value, text)| {
							let current = value.clone();
							view! {
								<option value=value prop:selected=move || app.form(field) == current>
									{text}
								</option>
							}
						})
						.collect_view()
				}}
			</select>
		</label>
	}
}

/// Pretty-printed JSON result, or a placeholder.
#[component]
pub fn JsonBlock(#[prop(into)] value: Signal<Option<Value>>) -> impl IntoView {
	move || match value.get() {
		Some(value) => {
			let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
			view! { <pre class="json">{text}</pre> }.into_any()
		}
		None => view! { <p class="muted">"No result yet."</p> }.into_any(),
	}
}

/// Claim ids with a short content preview, for relation and evidence forms.
pub fn unit_options() -> Signal<Vec<(String, String)>> {
	let app = use_app();
	Memo::new(move |_| {
		app.state.with(|s| {
			s.graph
				.iter()
				.flat_map(|g| g.units.values())
				.map(|u| (u.id.clone(), format!("{}: {}", u.id, preview(&u.content, 32))))
				.collect()
		})
	})
	.into()
}

pub fn preview(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		text.to_string()
	} else {
		let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
		cut.push('…');
		cut
	}
}

#[cfg(test)]
mod tests {
	use super::preview;

	#[test]
	fn previews_are_cut_on_characters() {
		assert_eq!(preview("short", 10), "short");
		assert_eq!(preview("ééééé", 3), "éé…");
	}
}
