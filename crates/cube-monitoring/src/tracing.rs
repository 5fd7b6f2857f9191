use tracing::info;
use tracing_subscriber::{
	fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
	/// Filter directive used when `RUST_LOG` is not set, e.g. `info` or `cube_rig=debug`
	pub filter: String,
	pub with_thread_ids: bool,
	pub with_file_and_line: bool,
	pub with_target: bool,
	pub with_span_events: FmtSpan,
	pub json_format: bool,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			filter: "info".to_string(),
			with_thread_ids: false,
			with_file_and_line: false,
			with_target: true,
			with_span_events: FmtSpan::NONE,
			json_format: false,
		}
	}
}

impl TracingConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
		self.filter = filter.into();
		self
	}

	pub fn debug() -> Self {
		Self {
			filter: "debug".to_string(),
			with_thread_ids: true,
			with_file_and_line: true,
			with_target: true,
			with_span_events: FmtSpan::ENTER | FmtSpan::CLOSE,
			json_format: false,
		}
	}

	pub fn production() -> Self {
		Self {
			filter: "info".to_string(),
			with_thread_ids: false,
			with_file_and_line: false,
			with_target: false,
			with_span_events: FmtSpan::NONE,
			json_format: true,
		}
	}

	/// `RUST_LOG` wins over the configured filter.
	fn env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error>> {
		match EnvFilter::try_from_default_env() {
			Ok(filter) => Ok(filter),
			Err(_) => EnvFilter::try_new(&self.filter)
				.map_err(|e| format!("Invalid log filter '{}': {}", self.filter, e).into()),
		}
	}
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: TracingConfig) -> Result<(), Box<dyn std::error::Error>> {
	let subscriber = tracing_subscriber::registry().with(config.env_filter()?);

	if config.json_format {
		let json_layer = tracing_subscriber::fmt::layer()
			.json()
			.with_span_events(config.with_span_events.clone())
			.with_thread_ids(config.with_thread_ids)
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target);

		subscriber
			.with(json_layer)
			.try_init()
			.map_err(|e| format!("Failed to initialize tracing: {}", e))?;
	} else {
		let fmt_layer = tracing_subscriber::fmt::layer()
			.with_span_events(config.with_span_events.clone())
			.with_thread_ids(config.with_thread_ids)
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target);

		subscriber
			.with(fmt_layer)
			.try_init()
			.map_err(|e| format!("Failed to initialize tracing: {}", e))?;
	}

	info!("Tracing initialized with filter: {}", config.filter);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_presets() {
		assert!(TracingConfig::production().json_format);
		assert_eq!(TracingConfig::debug().filter, "debug");

		let config = TracingConfig::production().with_filter("cube_rig=debug");
		assert_eq!(config.filter, "cube_rig=debug");
		assert!(config.json_format);
	}

	#[test]
	fn test_second_init_fails() {
		let first = init_tracing(TracingConfig::new().with_filter("warn"));
		let second = init_tracing(TracingConfig::new());
		assert!(first.is_ok());
		assert!(second.is_err());
	}
}
