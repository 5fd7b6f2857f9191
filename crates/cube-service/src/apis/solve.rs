//! Solve endpoint processing.
//!
//! A request passes three gates before a strategy ever sees it: presence of
//! `cubeState`, the shape validator, and the color-count check inside the
//! solver. Each gate has its own error and HTTP status.

use axum::http::StatusCode;
use cube_solver::{CubeSolver, SolveError};
use cube_types::{validate, ErrorResponse, ShapeError, SolveRequest, SolveResponse};
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

const SHAPE_HINT: &str = "The cube state must include all six faces (up, down, left, right, front, back) with 9 elements each";

/// Message shown for internal failures outside development.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum SolveApiError {
	#[error("Missing cubeState in request body")]
	MissingState,
	#[error("Invalid cubeState format")]
	InvalidShape(#[source] ShapeError),
	#[error("Unsolvable cube state")]
	Unsolvable(#[source] SolveError),
	#[error("Internal server error")]
	Internal(String),
}

impl SolveApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			SolveApiError::MissingState | SolveApiError::InvalidShape(_) => StatusCode::BAD_REQUEST,
			SolveApiError::Unsolvable(_) => StatusCode::UNPROCESSABLE_ENTITY,
			SolveApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Builds the response body. Internal details are only exposed when
	/// `expose_internal` is set.
	pub fn to_response(&self, expose_internal: bool) -> ErrorResponse {
		let response = ErrorResponse::new(self.to_string());
		match self {
			SolveApiError::MissingState => response,
			SolveApiError::InvalidShape(e) => response.with_message(format!("{} ({})", SHAPE_HINT, e)),
			SolveApiError::Unsolvable(e) => response.with_message(e.to_string()),
			SolveApiError::Internal(_) if !expose_internal => {
				response.with_message(GENERIC_INTERNAL_MESSAGE)
			}
			SolveApiError::Internal(detail) => response.with_message(detail.clone()),
		}
	}
}

impl From<SolveError> for SolveApiError {
	fn from(e: SolveError) -> Self {
		match e {
			SolveError::Unsolvable { .. } => SolveApiError::Unsolvable(e),
			other => SolveApiError::Internal(other.to_string()),
		}
	}
}

/// Reads a request from a parsed JSON body.
///
/// Anything other than an object carries no `cubeState`.
pub fn request_from_body(body: Value) -> SolveRequest {
	match body {
		Value::Object(_) => serde_json::from_value(body).unwrap_or_default(),
		_ => SolveRequest::default(),
	}
}

/// Validates and solves the cube state carried by a request.
pub async fn process_solve_request(
	request: SolveRequest,
	solver: &CubeSolver,
) -> Result<SolveResponse, SolveApiError> {
	let value = request.cube_state.ok_or(SolveApiError::MissingState)?;
	let state = validate(&value).map_err(SolveApiError::InvalidShape)?;

	let started = Instant::now();
	let solution = solver.solve(&state).await?;
	let solve_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

	info!(moves = solution.len(), solve_time_ms, "Cube solved");

	Ok(SolveResponse {
		solution: solution.to_string(),
		moves: solution.len(),
		solve_time_ms,
	})
}
