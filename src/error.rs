//! Error types for server calls and graph bundle files.

use thiserror::Error;

/// Failure of a single request to the analysis server.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("{method} {path} failed with status {status}")]
	Status {
		method: &'static str,
		path: String,
		status: u16,
		body: String,
	},
	#[error("{method} {path} could not reach the server: {message}")]
	Transport {
		method: &'static str,
		path: String,
		message: String,
	},
	#[error("{path} returned an unexpected body: {source}")]
	Decode {
		path: String,
		#[source]
		source: serde_json::Error,
	},
	#[error("could not encode the request body for {path}: {source}")]
	Encode {
		path: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Failure to read or write a graph bundle file.
#[derive(Debug, Error)]
pub enum BundleError {
	#[error("not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("expected a JSON object at the top level")]
	NotAnObject,
	#[error("unknown file format `{0}`")]
	UnknownFormat(String),
	#[error("bundle version {found} is newer than the supported version {supported}")]
	UnsupportedVersion { found: u64, supported: u64 },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_errors_carry_the_code_in_their_message() {
		let err = ApiError::Status {
			method: "PUT",
			path: "/graphs/g1".into(),
			status: 422,
			body: "{\"detail\":\"bad\"}".into(),
		};
		assert_eq!(err.to_string(), "PUT /graphs/g1 failed with status 422");
	}

	#[test]
	fn transport_errors_name_the_cause() {
		let err = ApiError::Transport {
			method: "GET",
			path: "/health".into(),
			message: "connection refused".into(),
		};
		assert!(!err.to_string().contains("status"));
		assert!(err.to_string().contains("connection refused"));
	}
}
