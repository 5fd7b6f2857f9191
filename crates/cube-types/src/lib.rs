//! Common types shared across the cube solver workspace.
//!
//! This crate defines the sticker-grid model of the cube, the move notation
//! types, the shape validator that gates every state accepted from the
//! outside, and the request/response types of the HTTP API.

pub mod api;
pub mod moves;
pub mod state;
pub mod validation;

pub use api::*;
pub use moves::*;
pub use state::*;
pub use validation::*;
