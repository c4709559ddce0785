//! Runtime configuration embedded in the host page.
//!
//! The page may carry a `<script id="app-config" type="application/json">`
//! element. Every field is optional; missing fields take their defaults.

use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::api::LlmProvider;

/// Element id the configuration is read from.
pub const CONFIG_ELEMENT_ID: &str = "app-config";

/// Workbench configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Base URL of the analysis server, without a trailing slash.
	pub api_base_url: String,
	/// `error`, `warn`, `info`, `debug` or `trace`.
	pub log_level: String,
	/// Multiplier applied to each wheel zoom step.
	pub zoom_sensitivity: f64,
	/// Multiplier applied to background drag distance.
	pub pan_sensitivity: f64,
	pub default_provider: LlmProvider,
	/// Empty means the provider's default model.
	pub default_model: String,
	pub default_dataset_path: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: "http://localhost:8000".to_string(),
			log_level: "debug".to_string(),
			zoom_sensitivity: 1.0,
			pan_sensitivity: 1.0,
			default_provider: LlmProvider::default(),
			default_model: String::new(),
			default_dataset_path: String::new(),
		}
	}
}

impl AppConfig {
	/// Parses a configuration document, clamping sensitivities to a usable range.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		let mut config: AppConfig = serde_json::from_str(text)?;
		config.zoom_sensitivity = config.zoom_sensitivity.clamp(0.1, 5.0);
		config.pan_sensitivity = config.pan_sensitivity.clamp(0.1, 5.0);
		Ok(config)
	}

	pub fn level(&self) -> Level {
		self.log_level.parse().unwrap_or(Level::Debug)
	}

	/// Model used when none is typed in.
	pub fn model(&self) -> String {
		if self.default_model.is_empty() {
			self.default_provider.default_model().to_string()
		} else {
			self.default_model.clone()
		}
	}
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Where the active configuration came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigOrigin {
	Page,
	/// No `app-config` element on the page.
	Missing,
	/// The element held invalid JSON; carries the parse error.
	Malformed(String),
}

impl ConfigOrigin {
	/// Logs how the configuration was obtained. Call once logging is up.
	pub fn report(&self, config: &AppConfig) {
		match self {
			ConfigOrigin::Page => {
				info!("argument-workbench: using server {}", config.api_base_url);
			}
			ConfigOrigin::Missing => warn!(
				"argument-workbench: no #{CONFIG_ELEMENT_ID} element, using defaults (server {})",
				config.api_base_url
			),
			ConfigOrigin::Malformed(e) => {
				warn!("argument-workbench: ignoring malformed configuration: {e}");
			}
		}
	}
}

/// Builds the configuration from the embedded document, if any.
pub fn resolve(text: Option<&str>) -> (AppConfig, ConfigOrigin) {
	let Some(text) = text else {
		return (AppConfig::default(), ConfigOrigin::Missing);
	};
	match AppConfig::from_json(text) {
		Ok(config) => (config, ConfigOrigin::Page),
		Err(e) => (AppConfig::default(), ConfigOrigin::Malformed(e.to_string())),
	}
}

/// Reads the configuration from the page, falling back to defaults.
///
/// Nothing is logged here: the log level is part of the result, so the
/// caller reports the [`ConfigOrigin`] after initialising logging.
pub fn load_config() -> (AppConfig, ConfigOrigin) {
	resolve(config_text().as_deref())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_documents_take_defaults() {
		let config = AppConfig::from_json(r#"{"api_base_url": "https://argue.example"}"#).unwrap();
		assert_eq!(config.api_base_url, "https://argue.example");
		assert_eq!(config.zoom_sensitivity, 1.0);
		assert_eq!(config.level(), Level::Debug);
		assert_eq!(config.model(), LlmProvider::OpenAi.default_model());
	}

	#[test]
	fn missing_and_malformed_documents_fall_back() {
		let (config, origin) = resolve(None);
		assert_eq!(config, AppConfig::default());
		assert_eq!(origin, ConfigOrigin::Missing);

		let (config, origin) = resolve(Some("{\"api_base_url\": "));
		assert_eq!(config, AppConfig::default());
		assert!(matches!(origin, ConfigOrigin::Malformed(_)));

		let (config, origin) = resolve(Some(r#"{"log_level": "info"}"#));
		assert_eq!(origin, ConfigOrigin::Page);
		assert_eq!(config.level(), Level::Info);
	}

	#[test]
	fn sensitivities_are_clamped() {
		let config =
			AppConfig::from_json(r#"{"zoom_sensitivity": 40, "pan_sensitivity": 0}"#).unwrap();
		assert_eq!(config.zoom_sensitivity, 5.0);
		assert_eq!(config.pan_sensitivity, 0.1);
	}

	#[test]
	fn provider_and_level_are_read() {
		let config =
			AppConfig::from_json(r#"{"default_provider": "ollama", "log_level": "warn"}"#).unwrap();
		assert_eq!(config.default_provider, LlmProvider::Ollama);
		assert_eq!(config.level(), Level::Warn);
		assert_eq!(config.model(), "llama3.1");
	}
}
