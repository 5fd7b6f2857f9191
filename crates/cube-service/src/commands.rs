//! Offline commands of the `cube-solver` binary.

use anyhow::{Context, Result};
use cube_config::{Config, RigSettings};
use cube_rig::{
	format_elapsed, ControllerConfig, HeadlessRig, LeaseConfig, LeaseReceipt, LeaseScheduler,
	RigController, SolveRun,
};
use cube_solver::{create_strategy, CubeSolver, Solution};
use cube_types::{validate, CubeState};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn lease_config(settings: &RigSettings) -> LeaseConfig {
	LeaseConfig {
		poll_interval: settings.poll_interval(),
		lease_move_duration: settings.lease_move_duration(),
		release_buffer: settings.release_buffer(),
		error_release_delay: settings.error_release_delay(),
		max_wait: settings.max_wait(),
	}
}

pub fn controller_config(settings: &RigSettings) -> ControllerConfig {
	ControllerConfig {
		shuffle_length: settings.shuffle_length,
		error_display: settings.error_display(),
	}
}

/// Builds the solver for the configured strategy.
pub fn build_solver(config: &Config) -> Result<CubeSolver> {
	let strategy = create_strategy(&config.solver.strategy)
		.with_context(|| format!("Failed to create strategy '{}'", config.solver.strategy))?;
	let solver = CubeSolver::new(strategy);
	info!("Using solver strategy: {}", solver.strategy_name());
	Ok(solver)
}

/// Logs the effective configuration.
pub fn describe_config(config: &Config) {
	info!("Service: {} on {}", config.service.name, config.service.bind_address());
	info!("Environment: {}", config.service.environment);
	info!(
		"Rate limit: {} requests per {:?}",
		config.admission.max_requests,
		config.admission.window()
	);
	info!(
		"Rig: poll {:?}, lease move {:?}, buffer {:?}",
		config.rig.poll_interval(),
		config.rig.lease_move_duration(),
		config.rig.release_buffer()
	);
}

fn headless_controller(config: &Config) -> Result<RigController> {
	let rig = Arc::new(HeadlessRig::new(config.rig.move_duration()));
	let scheduler = LeaseScheduler::new(rig, lease_config(&config.rig));
	Ok(RigController::new(
		scheduler,
		Arc::new(build_solver(config)?),
		controller_config(&config.rig),
	))
}

/// Plays moves (or a shuffle) on a headless rig and waits for the release.
pub async fn play(config: &Config, moves: &str) -> Result<LeaseReceipt> {
	let controller = headless_controller(config)?;
	let scheduler = controller.scheduler();

	let receipt = controller.play(moves).await.context("Failed to play moves")?;
	info!(
		"Dispatched {} tokens, lease released in {:?}",
		receipt.tokens, receipt.release_after
	);
	scheduler.idle().await;
	Ok(receipt)
}

async fn read_state(path: &Path) -> Result<CubeState> {
	let content = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Failed to read {:?}", path))?;
	let value: serde_json::Value =
		serde_json::from_str(&content).with_context(|| format!("{:?} is not valid JSON", path))?;
	validate(&value).context("Invalid cube state")
}

/// Validates and solves a cube state stored as JSON.
pub async fn solve_file(config: &Config, path: &Path) -> Result<Solution> {
	let state = read_state(path).await?;
	let solution = build_solver(config)?.solve(&state).await?;
	info!("Solved in {} moves", solution.len());
	Ok(solution)
}

/// Solves a cube state stored as JSON and animates it on a headless rig.
pub async fn animate_file(config: &Config, path: &Path) -> Result<SolveRun> {
	let state = read_state(path).await?;
	let controller = headless_controller(config)?;

	let run = controller.solve(&state).await.context("Failed to solve cube")?;
	controller.scheduler().idle().await;
	if let Some(elapsed) = run.elapsed {
		info!(
			"Animated {} moves, solved after {}",
			run.solution.len(),
			format_elapsed(elapsed)
		);
	}
	Ok(run)
}
