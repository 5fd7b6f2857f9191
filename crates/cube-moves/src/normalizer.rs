//! Move grammar normalizer.
//!
//! Input is a whitespace-separated list of the 18 legal commands
//! (`R R' R2 L L' L2 U U' U2 D D' D2 F F' F2 B B' B2`). Normalization is
//! all-or-nothing: the first unknown command aborts the whole sequence.

use cube_types::{MoveCommand, MoveToken};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading move notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
	/// Error that occurs when a command is not one of the 18 legal moves.
	#[error("Invalid move: \"{token}\". Valid moves: {}", legal_moves())]
	InvalidMove { token: String },
}

/// Comma-separated listing of the legal commands.
fn legal_moves() -> String {
	MoveCommand::all()
		.map(|command| command.to_string())
		.collect::<Vec<_>>()
		.join(", ")
}

/// Parses a whitespace-separated command sequence without expanding it.
pub fn parse_commands(sequence: &str) -> Result<Vec<MoveCommand>, MoveError> {
	sequence
		.split_whitespace()
		.map(|token| {
			token.parse::<MoveCommand>().map_err(|_| MoveError::InvalidMove {
				token: token.to_string(),
			})
		})
		.collect()
}

/// Normalizes a command sequence into primitive quarter-turn tokens.
///
/// Order is preserved exactly. An empty or all-whitespace sequence yields an
/// empty token list; deciding what that means is up to the caller.
pub fn normalize(sequence: &str) -> Result<Vec<MoveToken>, MoveError> {
	let commands = parse_commands(sequence)?;
	let tokens: Vec<MoveToken> = commands.into_iter().flat_map(MoveCommand::expand).collect();
	debug!("Normalized {:?} into {} tokens", sequence, tokens.len());
	Ok(tokens)
}

/// Renders tokens as the space-separated string the rig consumes.
pub fn join_tokens(tokens: &[MoveToken]) -> String {
	tokens
		.iter()
		.map(|token| token.to_string())
		.collect::<Vec<_>>()
		.join(" ")
}
