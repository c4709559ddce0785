//! Client side of the analysis server's JSON/HTTP API.
//!
//! [`Backend`] names one async method per endpoint. [`ApiClient`] implements
//! it over the browser's fetch; tests substitute an in-memory server.
//! Every call is a single attempt: no retry, no timeout, no backoff.

mod client;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use client::ApiClient;
pub use types::{
	DatasetLoadResult, DatasetRequest, DiagnosticsReport, Health, LlmProvider, LlmRequest,
	NewEvidenceCard, NewSupportingDocument, ReasoningRequest, Semantics,
};

use crate::error::ApiError;
use crate::model::{EvidenceCard, Graph, SupportingDocument};

/// The analysis server, one method per endpoint.
///
/// Futures are `?Send`: the browser runs everything on one thread.
#[async_trait(?Send)]
pub trait Backend {
	/// `GET /health`
	async fn health(&self) -> Result<Health, ApiError>;

	/// `POST /graphs` with the graph's payload (its id is not sent).
	async fn create_graph(&self, graph: &Graph) -> Result<Graph, ApiError>;

	/// `GET /graphs/{id}`
	async fn get_graph(&self, graph_id: &str) -> Result<Graph, ApiError>;

	/// `PUT /graphs/{id}` replacing the whole graph.
	async fn put_graph(&self, graph: &Graph) -> Result<Graph, ApiError>;

	async fn diagnostics(&self, graph_id: &str) -> Result<DiagnosticsReport, ApiError>;

	async fn credibility(&self, graph_id: &str) -> Result<Value, ApiError>;

	async fn reasoning(&self, graph_id: &str, request: &ReasoningRequest)
	-> Result<Value, ApiError>;

	async fn reasoner(&self, graph_id: &str, request: &LlmRequest) -> Result<Value, ApiError>;

	async fn evidence_cards(&self, graph_id: &str) -> Result<Vec<EvidenceCard>, ApiError>;

	async fn create_evidence_card(
		&self,
		graph_id: &str,
		card: &NewEvidenceCard,
	) -> Result<EvidenceCard, ApiError>;

	async fn supporting_documents(&self, graph_id: &str)
	-> Result<Vec<SupportingDocument>, ApiError>;

	async fn create_supporting_document(
		&self,
		graph_id: &str,
		document: &NewSupportingDocument,
	) -> Result<SupportingDocument, ApiError>;

	/// `POST /graphs/{id}/units/{unit}/evidence-cards/{card}`
	async fn attach_evidence(
		&self,
		graph_id: &str,
		unit_id: &str,
		card_id: &str,
	) -> Result<Value, ApiError>;

	async fn llm_confidence(
		&self,
		graph_id: &str,
		unit_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError>;

	async fn claim_type(
		&self,
		graph_id: &str,
		unit_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError>;

	async fn validate_edge(
		&self,
		graph_id: &str,
		edge_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError>;

	async fn edge_assumptions(
		&self,
		graph_id: &str,
		edge_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError>;

	/// `POST /datasets/load`
	async fn load_dataset(&self, request: &DatasetRequest) -> Result<DatasetLoadResult, ApiError>;
}
