//! Fetch-based [`Backend`] implementation.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Backend;
use super::types::*;
use crate::error::ApiError;
use crate::model::{EvidenceCard, Graph, SupportingDocument};

#[derive(Clone, Copy, Debug)]
enum Verb {
	Get,
	Post,
	Put,
}

impl Verb {
	fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "GET",
			Verb::Post => "POST",
			Verb::Put => "PUT",
		}
	}

	fn builder(self, url: &str) -> RequestBuilder {
		match self {
			Verb::Get => Request::get(url),
			Verb::Post => Request::post(url),
			Verb::Put => Request::put(url),
		}
	}
}

/// Analysis server client.
#[derive(Clone, Debug)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	/// Sends one request and decodes the JSON response.
	async fn call<R: DeserializeOwned>(
		&self,
		verb: Verb,
		path: &str,
		body: Option<Value>,
	) -> Result<R, ApiError> {
		let method = verb.as_str();
		debug!("{method} {path}");

		let builder = verb.builder(&self.url(path));
		let request = match body {
			Some(body) => builder.json(&body),
			None => builder.build(),
		}
		.map_err(|e| ApiError::Transport {
			method,
			path: path.to_string(),
			message: e.to_string(),
		})?;

		let response = request.send().await.map_err(|e| {
			warn!("{method} {path}: {e}");
			ApiError::Transport {
				method,
				path: path.to_string(),
				message: e.to_string(),
			}
		})?;

		let status = response.status();
		if !response.ok() {
			warn!("{method} {path} -> {status}");
			return Err(status_error(method, path, status, response.text().await));
		}

		let text = response.text().await.map_err(|e| ApiError::Transport {
			method,
			path: path.to_string(),
			message: e.to_string(),
		})?;

		serde_json::from_str(&text).map_err(|source| ApiError::Decode {
			path: path.to_string(),
			source,
		})
	}

	async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
		self.call(Verb::Get, path, None).await
	}

	async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<R, ApiError> {
		let body = encode(path, body)?;
		self.call(Verb::Post, path, Some(body)).await
	}

	async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
		self.call(Verb::Post, path, None).await
	}

	async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<R, ApiError> {
		let body = encode(path, body)?;
		self.call(Verb::Put, path, Some(body)).await
	}
}

/// A non-2xx response. The status is kept even if the body cannot be read.
fn status_error(
	method: &'static str,
	path: &str,
	status: u16,
	body: Result<String, gloo_net::Error>,
) -> ApiError {
	let body = body.unwrap_or_else(|e| {
		debug!("{method} {path}: unreadable error body: {e}");
		String::new()
	});
	ApiError::Status {
		method,
		path: path.to_string(),
		status,
		body,
	}
}

fn encode<B: Serialize + ?Sized>(path: &str, body: &B) -> Result<Value, ApiError> {
	serde_json::to_value(body).map_err(|source| ApiError::Encode {
		path: path.to_string(),
		source,
	})
}

/// Ids are user-typed or server-assigned; each one is a single path segment.
fn graph_path(graph_id: &str) -> String {
	format!("/graphs/{}", urlencoding::encode(graph_id))
}

fn unit_path(graph_id: &str, unit_id: &str) -> String {
	format!("{}/units/{}", graph_path(graph_id), urlencoding::encode(unit_id))
}

fn edge_path(graph_id: &str, edge_id: &str) -> String {
	format!("{}/edges/{}", graph_path(graph_id), urlencoding::encode(edge_id))
}

#[async_trait(?Send)]
impl Backend for ApiClient {
	async fn health(&self) -> Result<Health, ApiError> {
		self.get("/health").await
	}

	async fn create_graph(&self, graph: &Graph) -> Result<Graph, ApiError> {
		self.post("/graphs", &graph.payload()).await
	}

	async fn get_graph(&self, graph_id: &str) -> Result<Graph, ApiError> {
		self.get(&graph_path(graph_id)).await
	}

	async fn put_graph(&self, graph: &Graph) -> Result<Graph, ApiError> {
		self.put(&graph_path(&graph.id), graph).await
	}

	async fn diagnostics(&self, graph_id: &str) -> Result<DiagnosticsReport, ApiError> {
		self.post_empty(&format!("{}/diagnostics", graph_path(graph_id)))
			.await
	}

	async fn credibility(&self, graph_id: &str) -> Result<Value, ApiError> {
		self.post_empty(&format!("{}/credibility", graph_path(graph_id)))
			.await
	}

	async fn reasoning(
		&self,
		graph_id: &str,
		request: &ReasoningRequest,
	) -> Result<Value, ApiError> {
		self.post(&format!("{}/reasoning", graph_path(graph_id)), request)
			.await
	}

	async fn reasoner(&self, graph_id: &str, request: &LlmRequest) -> Result<Value, ApiError> {
		self.post(&format!("{}/reasoner", graph_path(graph_id)), request)
			.await
	}

	async fn evidence_cards(&self, graph_id: &str) -> Result<Vec<EvidenceCard>, ApiError> {
		self.get(&format!("{}/evidence-cards", graph_path(graph_id)))
			.await
	}

	async fn create_evidence_card(
		&self,
		graph_id: &str,
		card: &NewEvidenceCard,
	) -> Result<EvidenceCard, ApiError> {
		self.post(&format!("{}/evidence-cards", graph_path(graph_id)), card)
			.await
	}

	async fn supporting_documents(
		&self,
		graph_id: &str,
	) -> Result<Vec<SupportingDocument>, ApiError> {
		self.get(&format!("{}/supporting-documents", graph_path(graph_id)))
			.await
	}

	async fn create_supporting_document(
		&self,
		graph_id: &str,
		document: &NewSupportingDocument,
	) -> Result<SupportingDocument, ApiError> {
		self.post(
			&format!("{}/supporting-documents", graph_path(graph_id)),
			document,
		)
		.await
	}

	async fn attach_evidence(
		&self,
		graph_id: &str,
		unit_id: &str,
		card_id: &str,
	) -> Result<Value, ApiError> {
		self.post_empty(&format!(
			"{}/evidence-cards/{}",
			unit_path(graph_id, unit_id),
			urlencoding::encode(card_id)
		))
		.await
	}

	async fn llm_confidence(
		&self,
		graph_id: &str,
		unit_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError> {
		self.post(
			&format!("{}/llm-confidence", unit_path(graph_id, unit_id)),
			request,
		)
		.await
	}

	async fn claim_type(
		&self,
		graph_id: &str,
		unit_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError> {
		self.post(
			&format!("{}/claim-type", unit_path(graph_id, unit_id)),
			request,
		)
		.await
	}

	async fn validate_edge(
		&self,
		graph_id: &str,
		edge_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError> {
		self.post(
			&format!("{}/validate", edge_path(graph_id, edge_id)),
			request,
		)
		.await
	}

	async fn edge_assumptions(
		&self,
		graph_id: &str,
		edge_id: &str,
		request: &LlmRequest,
	) -> Result<Value, ApiError> {
		self.post(
			&format!("{}/assumptions", edge_path(graph_id, edge_id)),
			request,
		)
		.await
	}

	async fn load_dataset(&self, request: &DatasetRequest) -> Result<DatasetLoadResult, ApiError> {
		self.post("/datasets/load", request).await
	}
}
