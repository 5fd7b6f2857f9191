//! Configuration types for the cube solver service.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields a working configuration. Durations are expressed in
//! milliseconds and exposed as [`Duration`] through accessor methods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
	/// HTTP service settings
	pub service: ServiceSettings,
	/// Rate limiting at the service boundary
	pub admission: AdmissionSettings,
	/// Animated rig and lease scheduling
	pub rig: RigSettings,
	/// Solving strategy selection
	pub solver: SolverSettings,
}

/// Deployment environment, controls error verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	Development,
	Test,
	#[default]
	Production,
}

impl Environment {
	/// Whether internal error messages may be shown to clients.
	pub fn is_development(self) -> bool {
		matches!(self, Environment::Development)
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Environment::Development => "development",
			Environment::Test => "test",
			Environment::Production => "production",
		};
		f.write_str(name)
	}
}

impl FromStr for Environment {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Environment::Development),
			"test" => Ok(Environment::Test),
			"production" | "prod" => Ok(Environment::Production),
			other => Err(format!("Unknown environment: {}", other)),
		}
	}
}

/// HTTP service settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
	/// Service name reported by `GET /`
	pub name: String,
	/// Bind address
	pub host: String,
	/// Bind port
	pub port: u16,
	/// Deployment environment
	pub environment: Environment,
	/// Maximum accepted request body size in bytes
	pub max_body_bytes: usize,
}

impl Default for ServiceSettings {
	fn default() -> Self {
		Self {
			name: "Rubik's Cube Solver API".to_string(),
			host: "0.0.0.0".to_string(),
			port: 3000,
			environment: Environment::default(),
			max_body_bytes: 100 * 1024,
		}
	}
}

impl ServiceSettings {
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Sliding-window rate limit settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionSettings {
	/// Window length in milliseconds
	pub window_ms: u64,
	/// Requests allowed per client within one window
	pub max_requests: usize,
	/// How often idle clients are forgotten, in milliseconds
	pub sweep_interval_ms: u64,
}

impl Default for AdmissionSettings {
	fn default() -> Self {
		Self {
			window_ms: 60_000,
			max_requests: 30,
			sweep_interval_ms: 60_000,
		}
	}
}

impl AdmissionSettings {
	pub fn window(&self) -> Duration {
		Duration::from_millis(self.window_ms)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_millis(self.sweep_interval_ms)
	}
}

/// Rig and lease scheduler settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RigSettings {
	/// Delay between acquire attempts while the rig is busy
	pub poll_interval_ms: u64,
	/// Per-move animation duration outside of a lease
	pub move_duration_ms: u64,
	/// Per-move animation duration while a lease is held
	pub lease_move_duration_ms: u64,
	/// Extra time added to the release deadline
	pub release_buffer_ms: u64,
	/// Release delay after a failed dispatch
	pub error_release_delay_ms: u64,
	/// How long an invalid-move notice stays visible
	pub error_display_ms: u64,
	/// Number of tokens in a random shuffle
	pub shuffle_length: usize,
	/// Upper bound on waiting for the rig; unbounded when absent
	pub max_wait_ms: Option<u64>,
}

impl Default for RigSettings {
	fn default() -> Self {
		Self {
			poll_interval_ms: 200,
			move_duration_ms: 300,
			lease_move_duration_ms: 450,
			release_buffer_ms: 500,
			error_release_delay_ms: 100,
			error_display_ms: 3_000,
			shuffle_length: 12,
			max_wait_ms: None,
		}
	}
}

impl RigSettings {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn move_duration(&self) -> Duration {
		Duration::from_millis(self.move_duration_ms)
	}

	pub fn lease_move_duration(&self) -> Duration {
		Duration::from_millis(self.lease_move_duration_ms)
	}

	pub fn release_buffer(&self) -> Duration {
		Duration::from_millis(self.release_buffer_ms)
	}

	pub fn error_release_delay(&self) -> Duration {
		Duration::from_millis(self.error_release_delay_ms)
	}

	pub fn error_display(&self) -> Duration {
		Duration::from_millis(self.error_display_ms)
	}

	pub fn max_wait(&self) -> Option<Duration> {
		self.max_wait_ms.map(Duration::from_millis)
	}
}

/// Solving strategy settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverSettings {
	/// Name of the solving strategy
	pub strategy: String,
}

impl Default for SolverSettings {
	fn default() -> Self {
		Self {
			strategy: "lookup".to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = Config::default();
		assert_eq!(config.service.port, 3000);
		assert_eq!(config.service.environment, Environment::Production);
		assert_eq!(config.admission.window(), Duration::from_secs(60));
		assert_eq!(config.admission.max_requests, 30);
		assert_eq!(config.rig.poll_interval(), Duration::from_millis(200));
		assert_eq!(config.rig.max_wait(), None);
		assert_eq!(config.solver.strategy, "lookup");
	}

	#[test]
	fn test_partial_toml_keeps_defaults() {
		let config: Config = toml::from_str(
			r#"
[service]
port = 8080
environment = "development"

[admission]
max_requests = 5
"#,
		)
		.unwrap();

		assert_eq!(config.service.port, 8080);
		assert!(config.service.environment.is_development());
		assert_eq!(config.service.host, "0.0.0.0");
		assert_eq!(config.admission.max_requests, 5);
		assert_eq!(config.admission.window_ms, 60_000);
		assert_eq!(config.rig, RigSettings::default());
	}

	#[test]
	fn test_environment_parsing() {
		assert_eq!("DEV".parse::<Environment>(), Ok(Environment::Development));
		assert_eq!("production".parse::<Environment>(), Ok(Environment::Production));
		assert!("staging".parse::<Environment>().is_err());
	}
}
