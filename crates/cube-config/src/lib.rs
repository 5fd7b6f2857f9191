//! Configuration loading for the cube solver service.
//!
//! Configuration is read from a TOML, JSON or YAML file (picked by
//! extension), with `${VAR}` references substituted from the environment.
//! Prefixed environment variables then override individual settings, and the
//! result is validated before it is handed out.

use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod types;

pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
	Toml,
	Json,
	Yaml,
}

impl Format {
	fn from_path(path: &Path) -> Result<Self, ConfigError> {
		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Ok(Format::Toml),
			Some("json") => Ok(Format::Json),
			Some("yaml") | Some("yml") => Ok(Format::Yaml),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "CUBE_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_optional_file<P: AsRef<Path>>(self, path: Option<P>) -> Self {
		match path {
			Some(path) => self.with_file(path),
			None => self,
		}
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads, overrides and validates the configuration.
	///
	/// Without a file the defaults are used as the base.
	pub async fn load(&self) -> Result<Config, ConfigError> {
		let mut config = match &self.file_path {
			Some(path) => self.load_from_file(path).await?,
			None => {
				debug!("No configuration file given, using defaults");
				Config::default()
			}
		};

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, path: &Path) -> Result<Config, ConfigError> {
		info!("Loading configuration from {:?}", path);
		let format = Format::from_path(path)?;

		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(path.display().to_string())
			} else {
				ConfigError::IoError(e)
			}
		})?;

		let substituted = substitute_env_vars(&content)?;
		parse(&substituted, format)
	}

	fn env_var(&self, name: &str) -> Option<String> {
		env::var(format!("{}{}", self.env_prefix, name)).ok()
	}

	fn apply_env_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
		if let Some(host) = self.env_var("HOST") {
			debug!("Overriding host from environment");
			config.service.host = host;
		}

		if let Some(port) = self.env_var("PORT") {
			config.service.port = port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid port: {}", e)))?;
		}

		if let Some(environment) = self.env_var("ENVIRONMENT") {
			config.service.environment = environment
				.parse()
				.map_err(ConfigError::ValidationError)?;
		}

		if let Some(max) = self.env_var("RATE_LIMIT_MAX") {
			config.admission.max_requests = max.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid rate limit maximum: {}", e))
			})?;
		}

		if let Some(window) = self.env_var("RATE_LIMIT_WINDOW_MS") {
			config.admission.window_ms = window.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid rate limit window: {}", e))
			})?;
		}

		if let Some(strategy) = self.env_var("SOLVER_STRATEGY") {
			config.solver.strategy = strategy;
		}

		Ok(())
	}
}

fn parse(content: &str, format: Format) -> Result<Config, ConfigError> {
	match format {
		Format::Toml => toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string())),
		Format::Json => {
			serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
		Format::Yaml => {
			serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
		}
	}
}

/// Replaces every `${VAR_NAME}` with the value of that environment variable.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;

	let mut result = content.to_string();
	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

/// Longest accepted rig timing, in milliseconds.
pub const MAX_RIG_TIMING_MS: u64 = 600_000;

/// Validates configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
	if config.service.port == 0 {
		return Err(ConfigError::ValidationError(
			"Service port must be non-zero".to_string(),
		));
	}

	if config.service.max_body_bytes == 0 {
		return Err(ConfigError::ValidationError(
			"max_body_bytes must be non-zero".to_string(),
		));
	}

	if config.admission.window_ms == 0 || config.admission.max_requests == 0 {
		return Err(ConfigError::ValidationError(
			"Rate limit window and maximum must be non-zero".to_string(),
		));
	}

	if config.admission.sweep_interval_ms == 0 {
		return Err(ConfigError::ValidationError(
			"Rate limit sweep interval must be non-zero".to_string(),
		));
	}

	if config.rig.poll_interval_ms == 0 {
		return Err(ConfigError::ValidationError(
			"Rig poll interval must be non-zero".to_string(),
		));
	}

	let timings = [
		("poll_interval_ms", config.rig.poll_interval_ms),
		("move_duration_ms", config.rig.move_duration_ms),
		("lease_move_duration_ms", config.rig.lease_move_duration_ms),
		("release_buffer_ms", config.rig.release_buffer_ms),
		("error_release_delay_ms", config.rig.error_release_delay_ms),
		("error_display_ms", config.rig.error_display_ms),
	];
	if let Some((name, value)) = timings.iter().find(|(_, ms)| *ms > MAX_RIG_TIMING_MS) {
		return Err(ConfigError::ValidationError(format!(
			"Rig {} is {} but must not exceed {}",
			name, value, MAX_RIG_TIMING_MS
		)));
	}

	if config.rig.shuffle_length == 0 {
		return Err(ConfigError::ValidationError(
			"Shuffle length must be non-zero".to_string(),
		));
	}

	if config.solver.strategy.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"Solver strategy must be set".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[tokio::test]
	async fn test_load_without_file_uses_defaults() {
		let config = ConfigLoader::new()
			.with_env_prefix("CUBE_TEST_NOFILE_")
			.load()
			.await
			.unwrap();
		assert_eq!(config, Config::default());
	}

	#[tokio::test]
	async fn test_load_toml_file() {
		let file = write_temp(
			".toml",
			r#"
[service]
name = "test-cube"
port = 4000

[rig]
poll_interval_ms = 50
max_wait_ms = 10000
"#,
		);

		let config = ConfigLoader::new()
			.with_file(file.path())
			.with_env_prefix("CUBE_TEST_TOML_")
			.load()
			.await
			.unwrap();

		assert_eq!(config.service.name, "test-cube");
		assert_eq!(config.service.port, 4000);
		assert_eq!(config.rig.poll_interval_ms, 50);
		assert_eq!(config.rig.max_wait_ms, Some(10_000));
	}

	#[tokio::test]
	async fn test_load_json_and_yaml_files() {
		let json = write_temp(".json", r#"{ "admission": { "max_requests": 7 } }"#);
		let config = ConfigLoader::new().with_file(json.path()).load().await.unwrap();
		assert_eq!(config.admission.max_requests, 7);

		let yaml = write_temp(".yaml", "solver:\n  strategy: lookup\nservice:\n  port: 9000\n");
		let config = ConfigLoader::new().with_file(yaml.path()).load().await.unwrap();
		assert_eq!(config.service.port, 9000);
	}

	#[tokio::test]
	async fn test_env_substitution() {
		env::set_var("CUBE_TEST_SUBST_NAME", "from-env");
		let file = write_temp(".toml", "[service]\nname = \"${CUBE_TEST_SUBST_NAME}\"\n");

		let config = ConfigLoader::new().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.service.name, "from-env");
	}

	#[tokio::test]
	async fn test_missing_env_var_fails() {
		let file = write_temp(".toml", "[service]\nname = \"${CUBE_TEST_SURELY_UNSET}\"\n");
		let err = ConfigLoader::new().with_file(file.path()).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(name) if name == "CUBE_TEST_SURELY_UNSET"));
	}

	#[tokio::test]
	async fn test_env_overrides() {
		env::set_var("CUBE_TEST_OVR_PORT", "5050");
		env::set_var("CUBE_TEST_OVR_ENVIRONMENT", "development");
		env::set_var("CUBE_TEST_OVR_RATE_LIMIT_MAX", "3");

		let config = ConfigLoader::new()
			.with_env_prefix("CUBE_TEST_OVR_")
			.load()
			.await
			.unwrap();

		assert_eq!(config.service.port, 5050);
		assert!(config.service.environment.is_development());
		assert_eq!(config.admission.max_requests, 3);
	}

	#[tokio::test]
	async fn test_invalid_env_override() {
		env::set_var("CUBE_TEST_BADPORT_PORT", "not-a-port");
		let err = ConfigLoader::new()
			.with_env_prefix("CUBE_TEST_BADPORT_")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	async fn test_missing_file_and_unknown_format() {
		let err = ConfigLoader::new()
			.with_file("/definitely/not/here.toml")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));

		let ini = write_temp(".ini", "port=1");
		let err = ConfigLoader::new().with_file(ini.path()).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::ParseError(_)));
	}

	#[test]
	fn test_validation_rejects_zero_values() {
		let mut config = Config::default();
		config.admission.max_requests = 0;
		assert!(validate_config(&config).is_err());

		let mut config = Config::default();
		config.rig.poll_interval_ms = 0;
		assert!(validate_config(&config).is_err());

		assert!(validate_config(&Config::default()).is_ok());
	}

	#[test]
	fn test_validation_bounds_rig_timings() {
		let mut config = Config::default();
		config.rig.lease_move_duration_ms = u64::MAX;
		let err = validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("lease_move_duration_ms"));

		let mut config = Config::default();
		config.rig.move_duration_ms = MAX_RIG_TIMING_MS + 1;
		assert!(validate_config(&config).is_err());

		config.rig.move_duration_ms = MAX_RIG_TIMING_MS;
		assert!(validate_config(&config).is_ok());
	}
}
