//! Client entrypoint for the CSR build.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use argument_workbench::{App, init_logging, load_config};
use leptos::prelude::*;

fn main() {
	let (config, origin) = load_config();
	init_logging(&config);
	origin.report(&config);

	mount_to_body(move || {
		view! { <App config=config.clone() /> }
	})
}
