//! HTTP service and command-line front end of the cube solver.
//!
//! # Components
//!
//! - `server`: axum router, admission middleware and server lifecycle
//! - `apis`: request processing behind the routes
//! - `cli`: command-line arguments of the `cube-solver` binary
//! - `commands`: offline commands (`validate`, `play`, `solve`)

pub mod apis;
pub mod cli;
pub mod commands;
pub mod server;

pub use server::{router, start_server, AppState};
