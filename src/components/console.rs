//! In-app console of command outcomes.

use leptos::prelude::*;

use super::use_app;
use super::widgets::Section;
use crate::state::{Action, LineLevel};

#[component]
pub fn ConsolePanel() -> impl IntoView {
	let app = use_app();

	let lines = move || {
		app.state.with(|s| {
			s.console
				.iter()
				.rev()
				.map(|line| {
					let class = match line.level {
						LineLevel::Info => "console-line",
						LineLevel::Error => "console-line error",
					};
					view! { <li class=class>{line.text.clone()}</li> }
				})
				.collect_view()
		})
	};

	view! {
		<Section title="Console">
			<button on:click=move |_| app.apply(Action::ClearConsole)>"Clear"</button>
			<ol class="console">{lines}</ol>
		</Section>
	}
}
