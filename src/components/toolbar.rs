//! Header bar: server health, graph open/create, dataset loading, and bundle
//! import/export.

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlInputElement, Url};

use super::{AppContext, use_app};
use super::widgets::{FormInput, PanelError};
use crate::actions::Command;
use crate::bundle;
use crate::state::{Action, FormField, Panel};

#[component]
pub fn Toolbar() -> impl IntoView {
	let app = use_app();

	let status = move || {
		app.state.with(|s| match s.server_status.as_deref() {
			Some(status) => (format!("server: {status}"), "status ok"),
			None => ("server: unknown".to_string(), "status"),
		})
	};

	view! {
		<header class="toolbar">
			<h1>"Argument Workbench"</h1>
			<span class=move || status().1 on:click=move |_| app.run(Command::CheckHealth)>
				{move || status().0}
			</span>
			<div class="toolbar-group">
				<FormInput field=FormField::GraphId label="Graph" placeholder="graph id" />
				<button on:click=move |_| app.run(Command::OpenGraph)>"Open"</button>
				<button on:click=move |_| app.run(Command::CreateGraph)>"New"</button>
				<PanelError panel=Panel::Graph />
			</div>
			<div class="toolbar-group">
				<FormInput
					field=FormField::DatasetPath
					label="Dataset"
					placeholder="path on the server"
				/>
				<button on:click=move |_| app.run(Command::LoadDataset)>"Load"</button>
				<PanelError panel=Panel::Dataset />
			</div>
			<div class="toolbar-group">
				<ImportButton />
				<button
					disabled=move || !app.has_graph()
					on:click=move |_| export_current(app)
				>
					"Export"
				</button>
				<PanelError panel=Panel::Import />
			</div>
		</header>
	}
}

#[component]
fn ImportButton() -> impl IntoView {
	let app = use_app();
	let on_change = move |ev: leptos::ev::Event| {
		let Some(input) = ev
			.target()
			.and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
		else {
			return;
		};
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		let file_name = file.name();
		input.set_value("");
		spawn_local(async move {
			match JsFuture::from(file.text()).await {
				Ok(text) => {
					let contents = text.as_string().unwrap_or_default();
					info!("import: read {} bytes from {file_name}", contents.len());
					app.run(Command::Import {
						file_name,
						contents,
					});
				}
				Err(e) => app.apply(Action::Failed {
					panel: Panel::Import,
					message: format!("{file_name}: {}", js_message(&e)),
				}),
			}
		});
	};

	view! {
		<label class="file-button">
			"Import"
			<input type="file" accept=".json,application/json" on:change=on_change />
		</label>
	}
}

fn export_current(app: AppContext) {
	let exported = app.state.with_untracked(|s| {
		s.graph
			.as_ref()
			.map(|g| (bundle::file_name(g), bundle::export(g, &s.analysis)))
	});
	let Some((name, text)) = exported else {
		return;
	};
	let result = text
		.map_err(|e| e.to_string())
		.and_then(|text| download(&name, &text).map_err(|e| js_message(&e)));
	match result {
		Ok(()) => {
			app.apply(Action::Succeeded(Panel::Import));
			app.apply(Action::Log(format!("exported {name}")));
		}
		Err(message) => {
			warn!("export: {message}");
			app.apply(Action::Failed {
				panel: Panel::Import,
				message,
			});
		}
	}
}

/// Offers `text` to the browser as a file download.
fn download(name: &str, text: &str) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;

	let parts = js_sys::Array::of1(&JsValue::from_str(text));
	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(name);
	anchor.click();
	Url::revoke_object_url(&url)
}

fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.or_else(|| {
			value
				.dyn_ref::<js_sys::Error>()
				.map(|e| String::from(e.message()))
		})
		.unwrap_or_else(|| format!("{value:?}"))
}
