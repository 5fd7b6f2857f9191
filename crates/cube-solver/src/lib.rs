//! Solve orchestration for the cube solver service.
//!
//! This module gates every solve behind the solved/solvable pre-checks and
//! then delegates to a pluggable [`SolvingStrategy`]. The pre-checks are
//! cheap and count-based; the strategy is where a real search algorithm
//! would live.

use async_trait::async_trait;
use cube_types::{CubeState, MoveCommand};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub mod checks;

pub use checks::{check_color_counts, color_counts, is_solvable, is_solved};

/// Re-export implementations
pub mod implementations {
	pub mod strategies {
		pub mod lookup;
	}
}

use implementations::strategies::lookup::LookupStrategy;

/// Errors that can occur while solving a cube.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
	/// Error that occurs when the color distribution cannot belong to a real cube.
	#[error("The provided cube state is not solvable: color '{color}' appears {count} times (should be 9)")]
	Unsolvable { color: String, count: usize },
	/// Error that occurs when no strategy is registered under the configured name.
	#[error("Unknown solving strategy: {0}")]
	UnknownStrategy(String),
	/// Error raised by a strategy while producing a solution.
	#[error("Strategy failed: {0}")]
	Strategy(String),
}

/// Trait defining the interface for solving strategies.
///
/// A strategy receives a state that already passed the shape and count
/// checks and is not solved, and returns the commands that solve it.
#[async_trait]
pub trait SolvingStrategy: Send + Sync {
	/// Name used to select this strategy from configuration.
	fn name(&self) -> &str;

	/// Produces a move sequence for the given state.
	async fn solve(&self, state: &CubeState) -> Result<Vec<MoveCommand>, SolveError>;
}

/// A sequence of move commands that solves a cube.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
	pub moves: Vec<MoveCommand>,
}

impl Solution {
	pub fn new(moves: Vec<MoveCommand>) -> Self {
		Self { moves }
	}

	/// Number of commands; zero for an already solved cube.
	pub fn len(&self) -> usize {
		self.moves.len()
	}

	pub fn is_empty(&self) -> bool {
		self.moves.is_empty()
	}
}

impl fmt::Display for Solution {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, command) in self.moves.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			write!(f, "{}", command)?;
		}
		Ok(())
	}
}

/// Orchestrates the pre-checks and the configured strategy.
pub struct CubeSolver {
	strategy: Box<dyn SolvingStrategy>,
}

impl CubeSolver {
	/// Creates a new CubeSolver around the given strategy.
	pub fn new(strategy: Box<dyn SolvingStrategy>) -> Self {
		Self { strategy }
	}

	/// Name of the strategy in use.
	pub fn strategy_name(&self) -> &str {
		self.strategy.name()
	}

	/// Solves a cube state.
	///
	/// The caller's state is never modified. A solved cube short-circuits to
	/// an empty solution; a state failing the color-count check is rejected
	/// before the strategy runs.
	#[instrument(skip_all, fields(strategy = self.strategy.name()))]
	pub async fn solve(&self, state: &CubeState) -> Result<Solution, SolveError> {
		info!("Solving cube...");
		let state = state.clone();

		if is_solved(&state) {
			info!("Cube is already solved");
			return Ok(Solution::default());
		}

		check_color_counts(&state)?;

		let moves = self.strategy.solve(&state).await?;
		let solution = Solution::new(moves);
		debug!("Solution found: {}", solution);
		Ok(solution)
	}
}

impl Default for CubeSolver {
	fn default() -> Self {
		Self::new(Box::new(LookupStrategy::new()))
	}
}

/// Factory function to create a solving strategy by name.
///
/// Known names:
/// - `lookup`: canned sequences keyed by one sticker color
pub fn create_strategy(name: &str) -> Result<Box<dyn SolvingStrategy>, SolveError> {
	match name {
		LookupStrategy::NAME => Ok(Box::new(LookupStrategy::new())),
		other => Err(SolveError::UnknownStrategy(other.to_string())),
	}
}
