//! Observability for the cube solver.
//!
//! This crate installs the global `tracing` subscriber used by the service
//! binary. Output is either human-readable or JSON lines, filtered by
//! `RUST_LOG` when set and by the configured level otherwise.

pub mod tracing;

pub use crate::tracing::{init_tracing, TracingConfig};
