//! HTTP server for the cube solver API.
//!
//! Routes:
//! - `GET /health`: liveness with a timestamp
//! - `GET /`: service description and an example request
//! - `POST /solve`: validate and solve a cube state
//!
//! Every request, including unmatched ones, passes the sliding-window
//! limiter first. Clients are identified by peer IP. Every response carries
//! the usual browser hardening headers.

use crate::apis::solve::{process_solve_request, request_from_body, SolveApiError};
use crate::commands::build_solver;
use anyhow::{Context, Result};
use axum::{
	extract::{rejection::JsonRejection, ConnectInfo, DefaultBodyLimit, Request, State},
	http::{header, HeaderName, HeaderValue, StatusCode, Uri},
	middleware::{self, Next},
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use chrono::{SecondsFormat, Utc};
use cube_admission::{AdmissionConfig, AdmissionError, SlidingWindowLimiter};
use cube_config::{Config, Environment};
use cube_solver::CubeSolver;
use cube_types::{CubeState, EndpointInfo, ErrorResponse, HealthResponse, ServiceInfo};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Client key used when the peer address is unknown.
const UNKNOWN_CLIENT: &str = "unknown";

/// Hardening headers added to responses that do not set them already.
const SECURITY_HEADERS: [(&str, &str); 7] = [
	("x-content-type-options", "nosniff"),
	("x-frame-options", "SAMEORIGIN"),
	("x-xss-protection", "0"),
	("x-dns-prefetch-control", "off"),
	("referrer-policy", "no-referrer"),
	("strict-transport-security", "max-age=15552000; includeSubDomains"),
	("cross-origin-opener-policy", "same-origin"),
];

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub name: String,
	pub environment: Environment,
	pub solver: Arc<CubeSolver>,
	pub limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
	/// Builds the solver and limiter described by the configuration.
	pub fn from_config(config: &Config) -> Result<Self> {
		Ok(Self {
			name: config.service.name.clone(),
			environment: config.service.environment,
			solver: Arc::new(build_solver(config)?),
			limiter: Arc::new(SlidingWindowLimiter::new(AdmissionConfig {
				window: config.admission.window(),
				max_requests: config.admission.max_requests,
			})),
		})
	}
}

/// Builds the application router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
	let app = Router::new()
		.route("/health", get(health))
		.route("/", get(service_info))
		.route("/solve", post(handle_solve))
		.fallback(not_found)
		.layer(middleware::from_fn_with_state(state.clone(), admission))
		.layer(DefaultBodyLimit::max(max_body_bytes))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive());

	SECURITY_HEADERS
		.into_iter()
		.fold(app, |app, (name, value)| {
			app.layer(SetResponseHeaderLayer::if_not_present(
				HeaderName::from_static(name),
				HeaderValue::from_static(value),
			))
		})
		.with_state(state)
}

/// Serves the API until `shutdown` resolves.
pub async fn start_server<F>(config: &Config, state: AppState, shutdown: F) -> Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let app = router(state, config.service.max_body_bytes);
	let bind_address = config.service.bind_address();

	let listener = tokio::net::TcpListener::bind(&bind_address)
		.await
		.with_context(|| format!("Failed to bind {}", bind_address))?;

	info!(
		"{} listening on {} ({})",
		config.service.name, bind_address, config.service.environment
	);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.with_graceful_shutdown(shutdown)
	.await
	.context("HTTP server failed")?;

	info!("HTTP server stopped");
	Ok(())
}

/// Rejects clients over their request budget.
async fn admission(State(state): State<AppState>, request: Request, next: Next) -> Response {
	let client = request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ConnectInfo(addr)| addr.ip().to_string())
		.unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

	match state.limiter.admit(&client, tokio::time::Instant::now()) {
		Ok(()) => next.run(request).await,
		Err(AdmissionError::TooManyRequests { retry_after }) => {
			let seconds = retry_after_seconds(retry_after);
			warn!("Rate limit exceeded for {}, retry after {}s", client, seconds);
			(
				StatusCode::TOO_MANY_REQUESTS,
				[(header::RETRY_AFTER, seconds.to_string())],
				Json(
					ErrorResponse::new("Too many requests")
						.with_message("Please try again later")
						.with_retry_after(seconds),
				),
			)
				.into_response()
		}
	}
}

/// Whole seconds, rounded up, never zero.
fn retry_after_seconds(retry_after: Duration) -> u64 {
	let mut seconds = retry_after.as_secs();
	if retry_after.subsec_nanos() > 0 {
		seconds += 1;
	}
	seconds.max(1)
}

async fn health() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
	})
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
	Json(ServiceInfo {
		name: state.name.clone(),
		version: env!("CARGO_PKG_VERSION").to_string(),
		endpoints: vec![
			EndpointInfo {
				method: "GET".to_string(),
				path: "/health".to_string(),
				description: "Health check endpoint".to_string(),
			},
			EndpointInfo {
				method: "POST".to_string(),
				path: "/solve".to_string(),
				description: "Solve a Rubik's cube".to_string(),
			},
		],
		example: serde_json::json!({
			"request": {
				"method": "POST",
				"path": "/solve",
				"body": { "cubeState": CubeState::default() }
			}
		}),
	})
}

async fn handle_solve(
	State(state): State<AppState>,
	payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
	let request = match payload {
		Ok(Json(body)) => request_from_body(body),
		// a bodiless POST reads as a request without a state
		Err(JsonRejection::MissingJsonContentType(_)) => request_from_body(serde_json::Value::Null),
		Err(rejection) => {
			warn!("Rejected solve body: {}", rejection.body_text());
			return (
				rejection.status(),
				Json(ErrorResponse::new("Invalid request body").with_message(rejection.body_text())),
			)
				.into_response();
		}
	};

	match process_solve_request(request, &state.solver).await {
		Ok(response) => (StatusCode::OK, Json(response)).into_response(),
		Err(e) => {
			match &e {
				SolveApiError::Internal(detail) => error!("Error solving cube: {}", detail),
				SolveApiError::InvalidShape(shape) => {
					warn!(face = ?shape.face(), "Solve request rejected: {}", shape)
				}
				other => warn!("Solve request rejected: {}", other),
			}
			let body = e.to_response(state.environment.is_development());
			(e.status(), Json(body)).into_response()
		}
	}
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorResponse::new("Not Found").with_message(format!(
			"The requested resource '{}' was not found on this server",
			uri.path()
		))),
	)
}
