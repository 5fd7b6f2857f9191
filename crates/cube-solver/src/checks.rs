//! Solved and solvable pre-checks.
//!
//! The solvability check only counts colors: every label must appear exactly
//! nine times. That is necessary but not sufficient for a physically
//! reachable state, since permutation and orientation parity are not checked.
//! Any parity check belongs in its own function, not folded into this one.

use crate::SolveError;
use cube_types::{CubeState, Face, STICKERS_PER_FACE};
use std::collections::BTreeMap;
use tracing::warn;

/// Returns true if every face matches its center sticker.
pub fn is_solved(state: &CubeState) -> bool {
	Face::ALL.into_iter().all(|face| {
		let center = state.center(face);
		state.face(face).iter().all(|label| label == center)
	})
}

/// Tallies how often each label occurs across all 54 stickers.
pub fn color_counts(state: &CubeState) -> BTreeMap<String, usize> {
	let mut counts = BTreeMap::new();
	for label in state.stickers() {
		*counts.entry(label.to_string()).or_insert(0) += 1;
	}
	counts
}

/// Fails with the first label whose count is not nine.
pub fn check_color_counts(state: &CubeState) -> Result<(), SolveError> {
	match color_counts(state)
		.into_iter()
		.find(|(_, count)| *count != STICKERS_PER_FACE)
	{
		Some((color, count)) => {
			warn!(
				"Invalid color count: {} appears {} times (should be 9)",
				color, count
			);
			Err(SolveError::Unsolvable { color, count })
		}
		None => Ok(()),
	}
}

/// Returns true if every label occurs exactly nine times.
pub fn is_solvable(state: &CubeState) -> bool {
	check_color_counts(state).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_solved_requires_every_face_uniform() {
		assert!(is_solved(&CubeState::default()));

		let mut state = CubeState::default();
		state.back[8] = "W".to_string();
		assert!(!is_solved(&state));
	}

	#[test]
	fn test_solved_ignores_which_labels_are_used() {
		// Same label on two faces still counts as solved: only centers matter.
		let state = CubeState::solved_with(["a", "a", "b", "c", "d", "e"]);
		assert!(is_solved(&state));
		assert!(!is_solvable(&state));
	}

	#[test]
	fn test_swapped_stickers_keep_counts() {
		let mut state = CubeState::default();
		state.up[2] = "G".to_string();
		state.front[2] = "W".to_string();
		assert!(!is_solved(&state));
		assert!(is_solvable(&state));
	}

	#[test]
	fn test_count_violation_is_reported() {
		let mut state = CubeState::default();
		state.left[0] = "R".to_string();

		assert!(!is_solvable(&state));
		let err = check_color_counts(&state).unwrap_err();
		// BTreeMap order: "O" (8) comes before "R" (10)
		assert_eq!(
			err,
			SolveError::Unsolvable {
				color: "O".to_string(),
				count: 8
			}
		);
	}

	#[test]
	fn test_color_counts_cover_all_stickers() {
		let counts = color_counts(&CubeState::default());
		assert_eq!(counts.len(), 6);
		assert_eq!(counts.values().sum::<usize>(), 54);
	}
}
