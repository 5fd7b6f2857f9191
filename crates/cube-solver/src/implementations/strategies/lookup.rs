//! Lookup-table solving strategy.
//!
//! This strategy returns a canned sequence chosen by the color of the first
//! sticker on the up face. It does not search and will not solve arbitrary
//! scrambles; it exists so the service contract can be exercised until a
//! real solver (layer-by-layer, two-phase, ...) is plugged in behind
//! [`SolvingStrategy`].

use async_trait::async_trait;
use cube_types::{CubeState, MoveCommand};
use tracing::debug;

use crate::{SolveError, SolvingStrategy};

/// Sequence used when the up-face color has no table entry.
const FALLBACK: &str = "R U R' U' F' U F R U R' U'";

/// Canned sequences keyed by the color of `up[0]`.
const TABLE: [(&str, &str); 6] = [
	("W", "R U R' U' F' U F"),
	("Y", "F R U R' U' F'"),
	("R", "U R U' R' U' F' U F"),
	("O", "U' L' U L U F U' F'"),
	("G", "F U R U' R' F'"),
	("B", "R' F R F' R U R'"),
];

/// Constant-lookup strategy keyed by one sticker color.
#[derive(Debug, Default)]
pub struct LookupStrategy;

impl LookupStrategy {
	/// Configuration name of this strategy.
	pub const NAME: &'static str = "lookup";

	pub fn new() -> Self {
		Self
	}

	fn sequence_for(color: &str) -> &'static str {
		TABLE
			.iter()
			.find(|(key, _)| *key == color)
			.map(|(_, sequence)| *sequence)
			.unwrap_or(FALLBACK)
	}
}

#[async_trait]
impl SolvingStrategy for LookupStrategy {
	fn name(&self) -> &str {
		Self::NAME
	}

	async fn solve(&self, state: &CubeState) -> Result<Vec<MoveCommand>, SolveError> {
		let color = state.up[0].as_str();
		let sequence = Self::sequence_for(color);
		debug!("Lookup for up color {:?}: {}", color, sequence);

		sequence
			.split_whitespace()
			.map(|command| {
				command
					.parse::<MoveCommand>()
					.map_err(|e| SolveError::Strategy(e.to_string()))
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::CubeSolver;

	fn state_with_up_corner(color: &str) -> CubeState {
		let mut state = CubeState::default();
		let displaced = state.up[0].clone();
		state.up[0] = color.to_string();
		// keep counts valid by moving the displaced label elsewhere
		for face in [
			&mut state.down,
			&mut state.left,
			&mut state.right,
			&mut state.front,
			&mut state.back,
		] {
			if let Some(slot) = face.iter_mut().find(|label| label.as_str() == color) {
				*slot = displaced;
				break;
			}
		}
		state
	}

	#[tokio::test]
	async fn test_table_entries_parse() {
		let strategy = LookupStrategy::new();
		for (color, sequence) in TABLE {
			let moves = strategy.solve(&state_with_up_corner(color)).await.unwrap();
			let rendered: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
			assert_eq!(rendered.join(" "), sequence);
		}
	}

	#[tokio::test]
	async fn test_unknown_color_uses_fallback() {
		let mut state = CubeState::default();
		state.up[0] = "purple".to_string();
		let moves = LookupStrategy::new().solve(&state).await.unwrap();
		assert_eq!(moves.len(), 11);
	}

	#[tokio::test]
	async fn test_through_orchestrator() {
		let solver = CubeSolver::default();
		let state = state_with_up_corner("R");
		assert!(crate::is_solvable(&state));

		let solution = solver.solve(&state).await.unwrap();
		assert_eq!(solution.to_string(), "U R U' R' U' F' U F");
		assert_eq!(solution.len(), 8);
	}
}
