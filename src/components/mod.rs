//! UI components.
//!
//! Every panel reads the shared [`AppState`] through [`AppContext`] and
//! changes it only by applying [`Action`]s or running [`Command`]s.

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::actions::{Command, execute};
use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::state::{Action, AppState, FormField, Panel};

mod analysis;
mod claims;
mod console;
mod evidence;
mod graph_view;
pub mod graph_canvas;
mod inspector;
mod relations;
mod toolbar;
mod widgets;

pub use analysis::{CredibilityPanel, DiagnosticsPanel, ReasoningPanel};
pub use claims::ClaimsPanel;
pub use console::ConsolePanel;
pub use evidence::EvidencePanel;
pub use graph_canvas::GraphCanvas;
pub use graph_view::GraphView;
pub use inspector::InspectorPanel;
pub use relations::RelationsPanel;
pub use toolbar::Toolbar;

/// Handle to the application state, provided as context by the root view.
#[derive(Clone, Copy)]
pub struct AppContext {
	pub state: RwSignal<AppState>,
	pub config: StoredValue<AppConfig>,
}

impl AppContext {
	pub fn new(config: AppConfig) -> Self {
		Self {
			state: RwSignal::new(AppState::new(&config)),
			config: StoredValue::new(config),
		}
	}

	pub fn apply(&self, action: Action) {
		self.state.update(|s| s.apply(action));
	}

	/// Runs `command` against the server in the background and applies its
	/// outcome in a single update.
	pub fn run(&self, command: Command) {
		let snapshot = self.state.get_untracked();
		let client = ApiClient::new(self.config.with_value(|c| c.api_base_url.clone()));
		let state = self.state;
		spawn_local(async move {
			let actions = execute(&client, &snapshot, command).await;
			if !actions.is_empty() {
				state.update(|s| s.apply_all(actions));
			}
		});
	}

	pub fn form(&self, field: FormField) -> String {
		self.state.with(|s| s.forms.get(field).to_string())
	}

	pub fn error(&self, panel: Panel) -> Option<String> {
		self.state.with(|s| s.error(panel).map(str::to_string))
	}

	pub fn has_graph(&self) -> bool {
		self.state.with(|s| s.graph.is_some())
	}
}

pub fn use_app() -> AppContext {
	expect_context::<AppContext>()
}
