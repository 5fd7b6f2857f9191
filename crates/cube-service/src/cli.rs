//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use cube_monitoring::TracingConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cube-solver")]
#[command(about = "Rubik's cube solver service", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file (TOML, JSON or YAML)
	#[arg(short, long, value_name = "FILE", env = "CUBE_CONFIG", global = true)]
	pub config: Option<PathBuf>,

	/// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
	#[arg(long, env = "CUBE_LOG_LEVEL", default_value = "info", global = true)]
	pub log_level: String,

	/// Emit logs as JSON lines
	#[arg(long, global = true)]
	pub json_logs: bool,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Start the HTTP service
	Start,

	/// Validate the configuration and print the effective settings
	Validate,

	/// Play moves on a headless rig; without moves the rig is shuffled
	Play {
		/// Moves in standard notation, e.g. "R U2 F'"
		moves: Option<String>,
	},

	/// Solve a cube state read from a JSON file
	Solve {
		/// File holding a cube state object
		#[arg(short, long, value_name = "FILE")]
		state: PathBuf,

		/// Animate the solution on a headless rig and report the solve time
		#[arg(long)]
		animate: bool,
	},
}

impl Cli {
	/// The subcommand to run; `start` when none was given.
	pub fn command(&self) -> Command {
		self.command.clone().unwrap_or(Command::Start)
	}

	/// Tracing setup for the chosen log level and format.
	///
	/// JSON logs use the production preset and a `debug` level the verbose
	/// one; `--log-level` always sets the filter.
	pub fn tracing_config(&self) -> TracingConfig {
		let preset = if self.json_logs {
			TracingConfig::production()
		} else if self.log_level == "debug" {
			TracingConfig::debug()
		} else {
			TracingConfig::new()
		};
		preset.with_filter(self.log_level.clone())
	}
}
