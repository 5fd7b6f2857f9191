use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cube_config::{Config, ConfigLoader};
use cube_monitoring::init_tracing;
use cube_service::cli::{Cli, Command};
use cube_service::{commands, start_server, AppState};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	init_tracing(cli.tracing_config())
	.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

	let config = load_config(&cli).await?;

	match cli.command() {
		Command::Start => start_service(config).await,
		Command::Validate => {
			commands::build_solver(&config)?;
			info!("Configuration is valid");
			commands::describe_config(&config);
			Ok(())
		}
		Command::Play { moves } => {
			let receipt = commands::play(&config, moves.as_deref().unwrap_or_default()).await?;
			println!("{}", receipt.sequence);
			Ok(())
		}
		Command::Solve {
			state,
			animate: false,
		} => {
			let solution = commands::solve_file(&config, &state).await?;
			println!("{}", solution);
			Ok(())
		}
		Command::Solve {
			state,
			animate: true,
		} => {
			let run = commands::animate_file(&config, &state).await?;
			println!("{}", run.solution);
			Ok(())
		}
	}
}

async fn load_config(cli: &Cli) -> Result<Config> {
	match &cli.config {
		Some(path) => info!("Loading configuration from: {:?}", path),
		None => info!("No configuration file given, using defaults"),
	}

	ConfigLoader::new()
		.with_optional_file(cli.config.as_ref())
		.load()
		.await
		.context("Failed to load configuration")
}

async fn start_service(config: Config) -> Result<()> {
	info!("Starting {}", config.service.name);

	let state = AppState::from_config(&config)?;
	let sweeper = state
		.limiter
		.clone()
		.spawn_sweeper(config.admission.sweep_interval());

	let served = start_server(&config, state, shutdown_signal()).await;
	sweeper.abort();

	info!("{} stopped", config.service.name);
	served
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to install Ctrl+C handler: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				error!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received");
}
