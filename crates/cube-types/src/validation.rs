//! Shape validation for cube states arriving from untrusted input.
//!
//! The validator works on raw JSON so it can report exactly which face is
//! malformed, and hands back a typed [`CubeState`] once the input is known to
//! be well-formed. It never looks at colors; that is the solvability
//! checker's job and always runs after this one.

use crate::state::{CubeState, Face, STICKERS_PER_FACE};
use serde_json::Value;
use thiserror::Error;

/// Errors describing why an input is not a cube state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
	/// The input is not a JSON object.
	#[error("Cube state must be an object")]
	NotAnObject,
	/// A required face key is absent.
	#[error("Missing face: {0}")]
	MissingFace(Face),
	/// A face value is not an array.
	#[error("Face '{0}' must be an array of colors")]
	NotASequence(Face),
	/// A face array does not hold exactly nine entries.
	#[error("Face '{face}' must have 9 colors, got {len}")]
	WrongLength { face: Face, len: usize },
	/// A face entry is not a string.
	#[error("Face '{face}' has a non-string color at index {index}")]
	NonStringLabel { face: Face, index: usize },
}

impl ShapeError {
	/// The face the error refers to, if any.
	pub fn face(&self) -> Option<Face> {
		match self {
			ShapeError::NotAnObject => None,
			ShapeError::MissingFace(face) | ShapeError::NotASequence(face) => Some(*face),
			ShapeError::WrongLength { face, .. } | ShapeError::NonStringLabel { face, .. } => {
				Some(*face)
			}
		}
	}
}

/// Validates the shape of a cube state and converts it into a [`CubeState`].
///
/// Faces are checked in [`Face::ALL`] order and the first violation wins.
/// Keys other than the six faces are ignored.
pub fn validate(value: &Value) -> Result<CubeState, ShapeError> {
	let object = value.as_object().ok_or(ShapeError::NotAnObject)?;

	let mut state = CubeState::default();
	for face in Face::ALL {
		let entries = object
			.get(face.key())
			.ok_or(ShapeError::MissingFace(face))?
			.as_array()
			.ok_or(ShapeError::NotASequence(face))?;

		if entries.len() != STICKERS_PER_FACE {
			return Err(ShapeError::WrongLength {
				face,
				len: entries.len(),
			});
		}

		let slots = state.face_mut(face);
		for (index, entry) in entries.iter().enumerate() {
			let label = entry
				.as_str()
				.ok_or(ShapeError::NonStringLabel { face, index })?;
			slots[index] = label.to_string();
		}
	}

	Ok(state)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn solved_json() -> Value {
		serde_json::to_value(CubeState::default()).unwrap()
	}

	#[test]
	fn test_accepts_well_formed_state() {
		let state = validate(&solved_json()).unwrap();
		assert_eq!(state, CubeState::default());
	}

	#[test]
	fn test_accepts_any_string_labels() {
		let mut value = solved_json();
		value["up"][0] = json!("");
		value["down"][3] = json!("magenta");
		value["extra"] = json!(42);

		let state = validate(&value).unwrap();
		assert_eq!(state.up[0], "");
		assert_eq!(state.down[3], "magenta");
	}

	#[test]
	fn test_rejects_non_objects() {
		for value in [Value::Null, json!([]), json!("cube"), json!(7)] {
			assert_eq!(validate(&value), Err(ShapeError::NotAnObject));
		}
	}

	#[test]
	fn test_reports_first_missing_face() {
		let mut value = solved_json();
		value.as_object_mut().unwrap().remove("back");
		assert_eq!(validate(&value), Err(ShapeError::MissingFace(Face::Back)));

		value.as_object_mut().unwrap().remove("left");
		assert_eq!(validate(&value), Err(ShapeError::MissingFace(Face::Left)));
	}

	#[test]
	fn test_rejects_wrong_shapes() {
		let mut value = solved_json();
		value["front"] = json!("GGGGGGGGG");
		assert_eq!(validate(&value), Err(ShapeError::NotASequence(Face::Front)));

		let mut value = solved_json();
		value["right"] = json!(["R", "R", "R"]);
		assert_eq!(
			validate(&value),
			Err(ShapeError::WrongLength {
				face: Face::Right,
				len: 3
			})
		);

		let mut value = solved_json();
		value["down"][5] = json!(null);
		let err = validate(&value).unwrap_err();
		assert_eq!(
			err,
			ShapeError::NonStringLabel {
				face: Face::Down,
				index: 5
			}
		);
		assert_eq!(err.face(), Some(Face::Down));
	}
}
