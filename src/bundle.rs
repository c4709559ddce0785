//! Graph bundle files: a versioned envelope around a graph and its cached
//! analysis results.
//!
//! A file is a bundle when its top-level object carries
//! `"format": "argument-graph-bundle"`. Objects without a `format` field are
//! read as bare graph payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BundleError;
use crate::model::Graph;
use crate::state::AnalysisCache;

/// Discriminator value of the `format` field.
pub const BUNDLE_FORMAT: &str = "argument-graph-bundle";
/// Newest envelope version this build reads and the one it writes.
pub const BUNDLE_VERSION: u64 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphBundle {
	pub format: String,
	pub version: u64,
	pub graph: Graph,
	#[serde(default)]
	pub analysis: AnalysisCache,
}

impl GraphBundle {
	pub fn new(graph: Graph, analysis: AnalysisCache) -> Self {
		Self {
			format: BUNDLE_FORMAT.to_string(),
			version: BUNDLE_VERSION,
			graph,
			analysis,
		}
	}
}

/// Result of reading an import file.
#[derive(Clone, Debug, PartialEq)]
pub enum Imported {
	Bundle(GraphBundle),
	Bare(Graph),
}

impl Imported {
	pub fn into_parts(self) -> (Graph, AnalysisCache) {
		match self {
			Imported::Bundle(bundle) => (bundle.graph, bundle.analysis),
			Imported::Bare(graph) => (graph, AnalysisCache::default()),
		}
	}
}

/// Parses an import file as either a bundle or a bare graph.
pub fn parse(text: &str) -> Result<Imported, BundleError> {
	let value: Value = serde_json::from_str(text)?;
	let Some(object) = value.as_object() else {
		return Err(BundleError::NotAnObject);
	};

	match object.get("format") {
		None => Ok(Imported::Bare(serde_json::from_value(value)?)),
		Some(Value::String(format)) if format == BUNDLE_FORMAT => {
			let found = object.get("version").and_then(Value::as_u64).unwrap_or(0);
			if found > BUNDLE_VERSION {
				return Err(BundleError::UnsupportedVersion {
					found,
					supported: BUNDLE_VERSION,
				});
			}
			Ok(Imported::Bundle(serde_json::from_value(value)?))
		}
		Some(other) => Err(BundleError::UnknownFormat(
			other.as_str().map_or_else(|| other.to_string(), str::to_string),
		)),
	}
}

/// Serializes the graph and its cached analysis as a pretty-printed bundle.
pub fn export(graph: &Graph, analysis: &AnalysisCache) -> Result<String, BundleError> {
	let bundle = GraphBundle::new(graph.clone(), analysis.clone());
	Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Download name for an exported graph.
pub fn file_name(graph: &Graph) -> String {
	let stem: String = graph
		.id
		.chars()
		.map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
		.collect();
	if stem.is_empty() {
		"graph.argument-bundle.json".to_string()
	} else {
		format!("{stem}.argument-bundle.json")
	}
}
