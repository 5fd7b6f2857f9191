//! Sticker-grid model of a 3x3 cube.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of stickers on one face.
pub const STICKERS_PER_FACE: usize = 9;

/// Index of the center sticker within a face.
pub const CENTER_INDEX: usize = 4;

/// One of the six named sides of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
	Up,
	Down,
	Left,
	Right,
	Front,
	Back,
}

impl Face {
	/// All faces in the order they are validated and reported.
	pub const ALL: [Face; 6] = [
		Face::Up,
		Face::Down,
		Face::Left,
		Face::Right,
		Face::Front,
		Face::Back,
	];

	/// Key used for this face in a serialized cube state.
	pub fn key(self) -> &'static str {
		match self {
			Face::Up => "up",
			Face::Down => "down",
			Face::Left => "left",
			Face::Right => "right",
			Face::Front => "front",
			Face::Back => "back",
		}
	}

	/// Letter used for this face in move notation.
	pub fn letter(self) -> char {
		match self {
			Face::Up => 'U',
			Face::Down => 'D',
			Face::Left => 'L',
			Face::Right => 'R',
			Face::Front => 'F',
			Face::Back => 'B',
		}
	}

	/// Looks a face up by its (case-insensitive) move letter.
	pub fn from_letter(letter: char) -> Option<Self> {
		match letter.to_ascii_uppercase() {
			'U' => Some(Face::Up),
			'D' => Some(Face::Down),
			'L' => Some(Face::Left),
			'R' => Some(Face::Right),
			'F' => Some(Face::Front),
			'B' => Some(Face::Back),
			_ => None,
		}
	}
}

impl fmt::Display for Face {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// The 54 sticker color labels of a cube, nine per face.
///
/// Labels are free-form strings; index 4 of every face is its center.
/// Values of this type are only built by [`crate::validate`] or directly by
/// callers that already hold well-formed data, so every face always holds
/// exactly nine labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeState {
	pub up: [String; STICKERS_PER_FACE],
	pub down: [String; STICKERS_PER_FACE],
	pub left: [String; STICKERS_PER_FACE],
	pub right: [String; STICKERS_PER_FACE],
	pub front: [String; STICKERS_PER_FACE],
	pub back: [String; STICKERS_PER_FACE],
}

impl CubeState {
	/// Builds a solved cube where every face carries a single label.
	pub fn solved_with(labels: [&str; 6]) -> Self {
		let face = |label: &str| -> [String; STICKERS_PER_FACE] {
			std::array::from_fn(|_| label.to_string())
		};
		Self {
			up: face(labels[0]),
			down: face(labels[1]),
			left: face(labels[2]),
			right: face(labels[3]),
			front: face(labels[4]),
			back: face(labels[5]),
		}
	}

	/// The stickers of one face.
	pub fn face(&self, face: Face) -> &[String; STICKERS_PER_FACE] {
		match face {
			Face::Up => &self.up,
			Face::Down => &self.down,
			Face::Left => &self.left,
			Face::Right => &self.right,
			Face::Front => &self.front,
			Face::Back => &self.back,
		}
	}

	/// Mutable access to the stickers of one face.
	pub fn face_mut(&mut self, face: Face) -> &mut [String; STICKERS_PER_FACE] {
		match face {
			Face::Up => &mut self.up,
			Face::Down => &mut self.down,
			Face::Left => &mut self.left,
			Face::Right => &mut self.right,
			Face::Front => &mut self.front,
			Face::Back => &mut self.back,
		}
	}

	/// Center label of one face.
	pub fn center(&self, face: Face) -> &str {
		&self.face(face)[CENTER_INDEX]
	}

	/// Iterates over all 54 labels, face by face.
	pub fn stickers(&self) -> impl Iterator<Item = &str> + '_ {
		Face::ALL
			.into_iter()
			.flat_map(move |face| self.face(face).iter().map(String::as_str))
	}
}

impl Default for CubeState {
	/// The solved cube in the W/Y/O/R/G/B color scheme.
	fn default() -> Self {
		Self::solved_with(["W", "Y", "O", "R", "G", "B"])
	}
}
