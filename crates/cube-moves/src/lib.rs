//! Move notation handling for the cube solver.
//!
//! This crate turns human move notation into the primitive quarter-turn
//! tokens the animated rig executes, and generates random scrambles made of
//! those tokens.

pub mod normalizer;
pub mod shuffle;

pub use normalizer::{join_tokens, normalize, parse_commands, MoveError};
pub use shuffle::{random_shuffle, random_shuffle_with, DEFAULT_SHUFFLE_LENGTH};
