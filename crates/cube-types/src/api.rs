//! API types for the cube solver HTTP API.
//!
//! This module defines the request and response bodies of the service
//! endpoints. Field names follow the camelCase convention of the public API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body of `POST /solve`.
///
/// The state is kept as raw JSON so that the shape validator can report
/// precisely what is wrong with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveRequest {
	/// Cube state to solve
	#[serde(rename = "cubeState", default)]
	pub cube_state: Option<Value>,
}

/// Response body of a successful `POST /solve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
	/// Space-separated move commands, empty if the cube is already solved
	pub solution: String,
	/// Number of move commands in `solution`
	pub moves: usize,
	/// Wall-clock time spent solving
	#[serde(rename = "solveTimeMs")]
	pub solve_time_ms: u64,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Short error title
	pub error: String,
	/// Human-readable explanation
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// Seconds to wait before retrying, for rate-limited requests
	#[serde(skip_serializing_if = "Option::is_none")]
	pub retry_after: Option<u64>,
}

impl ErrorResponse {
	pub fn new(error: impl Into<String>) -> Self {
		Self {
			error: error.into(),
			message: None,
			retry_after: None,
		}
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn with_retry_after(mut self, seconds: u64) -> Self {
		self.retry_after = Some(seconds);
		self
	}
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	/// RFC 3339 timestamp of the check
	pub timestamp: String,
}

/// One entry of the endpoint listing in [`ServiceInfo`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointInfo {
	pub method: String,
	pub path: String,
	pub description: String,
}

/// Response body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
	pub name: String,
	pub version: String,
	pub endpoints: Vec<EndpointInfo>,
	/// Example request for `POST /solve`
	pub example: Value,
}
