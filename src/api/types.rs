//! Request and response shapes of the analysis server.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{DocumentId, Graph};

/// `GET /health` response.
#[derive(Clone, Debug, Deserialize)]
pub struct Health {
	pub status: String,
}

/// Structural summary returned by `POST /graphs/{id}/diagnostics`.
///
/// The four counters are always present; anything else the server reports
/// is kept verbatim in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
	#[serde(default)]
	pub node_count: usize,
	#[serde(default)]
	pub relation_count: usize,
	#[serde(default)]
	pub support_edge_count: usize,
	#[serde(default)]
	pub attack_edge_count: usize,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// LLM provider used by server-side enrichments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
	#[default]
	#[serde(rename = "openai")]
	OpenAi,
	Anthropic,
	Gemini,
	Ollama,
}

impl LlmProvider {
	pub const ALL: [LlmProvider; 4] = [Self::OpenAi, Self::Anthropic, Self::Gemini, Self::Ollama];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::OpenAi => "openai",
			Self::Anthropic => "anthropic",
			Self::Gemini => "gemini",
			Self::Ollama => "ollama",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
	}

	/// Model requested when the model field is left blank.
	pub fn default_model(self) -> &'static str {
		match self {
			Self::OpenAi => "gpt-4o-mini",
			Self::Anthropic => "claude-3-5-haiku-latest",
			Self::Gemini => "gemini-1.5-flash",
			Self::Ollama => "llama3.1",
		}
	}
}

impl fmt::Display for LlmProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Body of every LLM-backed call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LlmRequest {
	pub provider: LlmProvider,
	pub model: String,
}

/// Argumentation semantics the reasoning endpoint can evaluate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semantics {
	#[default]
	Grounded,
	Preferred,
	Stable,
	Complete,
}

impl Semantics {
	pub const ALL: [Semantics; 4] = [Self::Grounded, Self::Preferred, Self::Stable, Self::Complete];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Grounded => "grounded",
			Self::Preferred => "preferred",
			Self::Stable => "stable",
			Self::Complete => "complete",
		}
	}

	pub fn parse(s: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
	}
}

/// Body of `POST /graphs/{id}/reasoning`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReasoningRequest {
	pub semantics: Semantics,
}

/// Body of `POST /graphs/{id}/evidence-cards`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewEvidenceCard {
	pub title: String,
	pub document_id: DocumentId,
	pub excerpt: String,
	pub confidence: f64,
}

/// Body of `POST /graphs/{id}/supporting-documents`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSupportingDocument {
	pub name: String,
	#[serde(rename = "type")]
	pub doc_type: String,
	pub url: String,
}

/// Body of `POST /datasets/load`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetRequest {
	pub path: String,
}

/// Response of `POST /datasets/load`. Servers that build a graph from the
/// dataset return it under `graph`; the rest is an opaque summary.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DatasetLoadResult {
	#[serde(default)]
	pub graph: Option<Graph>,
	#[serde(flatten)]
	pub summary: Map<String, Value>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn diagnostics_keep_unknown_fields() {
		let report: DiagnosticsReport = serde_json::from_str(
			r#"{"node_count":2,"relation_count":1,"support_edge_count":1,"attack_edge_count":0,"cycles":[]}"#,
		)
		.unwrap();
		assert_eq!(report.node_count, 2);
		assert!(report.extra.contains_key("cycles"));
	}

	#[test]
	fn providers_serialize_lowercase() {
		let body = LlmRequest {
			provider: LlmProvider::OpenAi,
			model: "m".into(),
		};
		assert_eq!(
			serde_json::to_string(&body).unwrap(),
			r#"{"provider":"openai","model":"m"}"#
		);
		assert_eq!(LlmProvider::parse("Anthropic"), Some(LlmProvider::Anthropic));
	}

	#[test]
	fn dataset_result_without_graph() {
		let result: DatasetLoadResult =
			serde_json::from_str(r#"{"loaded": 12, "source": "data/x.json"}"#).unwrap();
		assert!(result.graph.is_none());
		assert_eq!(result.summary["loaded"], 12);
	}
}
