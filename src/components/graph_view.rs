//! The canvas bound to application state, with view controls.

use leptos::prelude::*;

use super::graph_canvas::GraphCanvas;
use super::use_app;
use crate::actions::Command;
use crate::model::Graph;
use crate::projector::{Elements, project};
use crate::state::{Action, Selection};

#[component]
pub fn GraphView() -> impl IntoView {
	let app = use_app();

	let graph = Memo::new(move |_| app.state.with(|s| s.graph.clone()));
	let elements: Memo<Elements> =
		Memo::new(move |_| graph.with(|g| g.as_ref().map(project).unwrap_or_default()));
	let selection = Memo::new(move |_| app.state.with(|s| s.selection.clone()));
	let edge_mode = Memo::new(move |_| app.state.with(|s| s.edge_mode));
	let zoom = Memo::new(move |_| app.state.with(|s| s.zoom_sensitivity));
	let pan = Memo::new(move |_| app.state.with(|s| s.pan_sensitivity));

	let summary = move || {
		graph.with(|g| match g {
			Some(Graph { id, units, relations, .. }) => format!(
				"{id}: {} claims, {} relations",
				units.len(),
				relations.len()
			),
			None => "No graph open. Create one or open an existing id.".to_string(),
		})
	};

	let on_node_select = move |id: String| app.apply(Action::Select(Selection::Node(id)));
	let on_edge_select = move |id: String| app.apply(Action::Select(Selection::Edge(id)));
	let on_connect = move |(source, target): (String, String)| {
		app.run(Command::ConnectUnits { source, target });
	};
	let on_clear = move |_: ()| app.apply(Action::Select(Selection::None));

	view! {
		<div class="graph-view">
			<div class="graph-controls">
				<span class="muted">{summary}</span>
				<Slider
					label="Zoom"
					value=zoom
					on_input=move |v| app.apply(Action::SetZoomSensitivity(v))
				/>
				<Slider
					label="Pan"
					value=pan
					on_input=move |v| app.apply(Action::SetPanSensitivity(v))
				/>
			</div>
			<div class="graph-stage">
				<GraphCanvas
					elements=elements
					selection=selection
					edge_mode=edge_mode
					zoom_sensitivity=zoom
					pan_sensitivity=pan
					on_node_select=on_node_select
					on_edge_select=on_edge_select
					on_connect=on_connect
					on_clear=on_clear
				/>
			</div>
		</div>
	}
}

/// Sensitivity slider over `[0.1, 5.0]`.
#[component]
fn Slider(
	label: &'static str,
	#[prop(into)] value: Signal<f64>,
	#[prop(into)] on_input: Callback<f64>,
) -> impl IntoView {
	view! {
		<label class="slider">
			<span>{move || format!("{label} {:.1}x", value.get())}</span>
			<input
				type="range"
				min="0.1"
				max="5"
				step="0.1"
				prop:value=move || value.get().to_string()
				on:input=move |ev| {
					if let Ok(v) = event_target_value(&ev).parse::<f64>() {
						on_input.run(v);
					}
				}
			/>
		</label>
	}
}
