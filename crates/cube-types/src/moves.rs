//! Move notation types.
//!
//! A [`MoveCommand`] is what a person types (`R`, `R'`, `R2`); a
//! [`MoveToken`] is the primitive quarter-turn the animated rig understands.
//! Primitive tokens are single letters: uppercase turns the face clockwise,
//! lowercase turns it counter-clockwise. There is no double-turn primitive.

use crate::state::Face;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string is not valid move notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized move: \"{0}\"")]
pub struct ParseMoveError(pub String);

/// Rotation direction of a primitive quarter-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	Clockwise,
	CounterClockwise,
}

/// A primitive quarter-turn of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveToken {
	pub face: Face,
	pub direction: Direction,
}

impl MoveToken {
	pub fn clockwise(face: Face) -> Self {
		Self {
			face,
			direction: Direction::Clockwise,
		}
	}

	pub fn counter_clockwise(face: Face) -> Self {
		Self {
			face,
			direction: Direction::CounterClockwise,
		}
	}

	/// The single-letter form sent to the rig.
	pub fn letter(self) -> char {
		match self.direction {
			Direction::Clockwise => self.face.letter(),
			Direction::CounterClockwise => self.face.letter().to_ascii_lowercase(),
		}
	}
}

impl fmt::Display for MoveToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.letter())
	}
}

impl FromStr for MoveToken {
	type Err = ParseMoveError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut chars = s.chars();
		let (Some(letter), None) = (chars.next(), chars.next()) else {
			return Err(ParseMoveError(s.to_string()));
		};
		let face = Face::from_letter(letter).ok_or_else(|| ParseMoveError(s.to_string()))?;
		if letter.is_ascii_uppercase() {
			Ok(Self::clockwise(face))
		} else {
			Ok(Self::counter_clockwise(face))
		}
	}
}

impl Serialize for MoveToken {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for MoveToken {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Modifier of a human-entered move command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
	/// `R`: one clockwise quarter-turn.
	Plain,
	/// `R'`: one counter-clockwise quarter-turn.
	Prime,
	/// `R2`: two clockwise quarter-turns.
	Double,
}

/// A move in standard algebraic notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveCommand {
	pub face: Face,
	pub turn: Turn,
}

impl MoveCommand {
	/// Face order used when listing the legal commands.
	const LISTING_ORDER: [Face; 6] = [
		Face::Right,
		Face::Left,
		Face::Up,
		Face::Down,
		Face::Front,
		Face::Back,
	];

	pub fn new(face: Face, turn: Turn) -> Self {
		Self { face, turn }
	}

	/// The 18 legal commands, grouped by face.
	pub fn all() -> impl Iterator<Item = MoveCommand> {
		Self::LISTING_ORDER.into_iter().flat_map(|face| {
			[Turn::Plain, Turn::Prime, Turn::Double]
				.into_iter()
				.map(move |turn| MoveCommand::new(face, turn))
		})
	}

	/// Expands this command into primitive quarter-turns.
	pub fn expand(self) -> Vec<MoveToken> {
		match self.turn {
			Turn::Plain => vec![MoveToken::clockwise(self.face)],
			Turn::Prime => vec![MoveToken::counter_clockwise(self.face)],
			Turn::Double => vec![
				MoveToken::clockwise(self.face),
				MoveToken::clockwise(self.face),
			],
		}
	}
}

impl fmt::Display for MoveCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let suffix = match self.turn {
			Turn::Plain => "",
			Turn::Prime => "'",
			Turn::Double => "2",
		};
		write!(f, "{}{}", self.face.letter(), suffix)
	}
}

impl FromStr for MoveCommand {
	type Err = ParseMoveError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut chars = s.chars();
		let face = chars
			.next()
			.filter(char::is_ascii_uppercase)
			.and_then(Face::from_letter)
			.ok_or_else(|| ParseMoveError(s.to_string()))?;

		let turn = match chars.as_str() {
			"" => Turn::Plain,
			"'" => Turn::Prime,
			"2" => Turn::Double,
			_ => return Err(ParseMoveError(s.to_string())),
		};

		Ok(Self::new(face, turn))
	}
}

impl Serialize for MoveCommand {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for MoveCommand {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exactly_eighteen_commands() {
		let all: Vec<String> = MoveCommand::all().map(|c| c.to_string()).collect();
		assert_eq!(all.len(), 18);
		assert_eq!(&all[..3], &["R", "R'", "R2"]);
		assert_eq!(&all[15..], &["B", "B'", "B2"]);
	}

	#[test]
	fn test_command_parse_rejects_near_misses() {
		for bad in ["", "r", "R3", "R2'", "R''", "RR", "X", "R '"] {
			assert!(bad.parse::<MoveCommand>().is_err(), "accepted {bad:?}");
		}
		assert_eq!(
			"U'".parse::<MoveCommand>().unwrap(),
			MoveCommand::new(Face::Up, Turn::Prime)
		);
	}

	#[test]
	fn test_token_case_encodes_direction() {
		let token: MoveToken = "f".parse().unwrap();
		assert_eq!(token, MoveToken::counter_clockwise(Face::Front));
		assert_eq!(token.to_string(), "f");
		assert!("F2".parse::<MoveToken>().is_err());
	}

	#[test]
	fn test_moves_serialize_as_notation() {
		let tokens = MoveCommand::new(Face::Right, Turn::Prime).expand();
		assert_eq!(serde_json::to_value(&tokens).unwrap(), serde_json::json!(["r"]));

		let command: MoveCommand = serde_json::from_str("\"U2\"").unwrap();
		assert_eq!(command, MoveCommand::new(Face::Up, Turn::Double));
	}

	#[test]
	fn test_double_expands_to_two_clockwise_tokens() {
		let tokens = MoveCommand::new(Face::Back, Turn::Double).expand();
		assert_eq!(tokens, vec![MoveToken::clockwise(Face::Back); 2]);
	}
}
