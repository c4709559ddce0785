//! argument-workbench: browser frontend for authoring and analysing argument
//! graphs held by a remote analysis server.
//!
//! Claims and the support/attack relations between them are edited through
//! forms or drawn directly on a canvas. Analyses run on the server; their
//! results are cached client-side and travel with exported bundles.

use leptos::prelude::*;
use leptos_meta::*;
use log::info;

pub mod actions;
pub mod api;
pub mod bundle;
pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod projector;
pub mod state;

pub use components::GraphCanvas;
pub use config::{AppConfig, ConfigOrigin, load_config};

use actions::Command;
use components::{
	AppContext, ClaimsPanel, ConsolePanel, CredibilityPanel, DiagnosticsPanel, EvidencePanel,
	GraphView, InspectorPanel, ReasoningPanel, RelationsPanel, Toolbar,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging(config: &AppConfig) {
	let _ = console_log::init_with_level(config.level());
	console_error_panic_hook::set_once();
	info!("argument-workbench: logging initialized at {}", config.level());
}

/// Main application component.
#[component]
pub fn App(config: AppConfig) -> impl IntoView {
	provide_meta_context();

	let app = AppContext::new(config);
	provide_context(app);
	app.run(Command::CheckHealth);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Argument Workbench" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="workbench">
			<Toolbar />
			<aside class="sidebar left">
				<ClaimsPanel />
				<RelationsPanel />
				<EvidencePanel />
			</aside>
			<main class="stage">
				<GraphView />
				<ConsolePanel />
			</main>
			<aside class="sidebar right">
				<InspectorPanel />
				<DiagnosticsPanel />
				<CredibilityPanel />
				<ReasoningPanel />
			</aside>
		</div>
	}
}
