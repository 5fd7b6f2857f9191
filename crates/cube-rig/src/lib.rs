//! Exclusive access to the shared animated cube rig.
//!
//! The rig is whatever draws and animates the cube. The core only relies on
//! a few of its capabilities, captured by the [`Rig`] trait: a busy signal,
//! a twist operation taking space-separated primitive tokens, a reset back
//! to the solved cube, and a mutable per-move animation duration.
//!
//! # Components
//!
//! - `scheduler`: the lease scheduler serializing command sequences on the rig
//! - `controller`: play/shuffle/solve/reset operations built on the scheduler
//! - `implementations`: rig implementations (a headless one for the CLI and tests)

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub mod controller;
pub mod implementations;
pub mod scheduler;

pub use controller::{format_elapsed, ControlError, ControllerConfig, RigController, SolveRun};
pub use implementations::headless::HeadlessRig;
pub use scheduler::{LeaseConfig, LeaseError, LeaseReceipt, LeaseScheduler, LeaseState};

/// Errors reported by a rig when it cannot execute a twist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RigError {
	/// The twist string contained something that is not a primitive token.
	#[error("Unknown token: {0}")]
	UnknownToken(String),
	/// The rig failed for a reason of its own.
	#[error("Rig failure: {0}")]
	Failure(String),
}

/// Interface to the animated cube.
///
/// Implementations are shared between the renderer and the scheduler, so
/// every method takes `&self` and relies on interior mutability.
pub trait Rig: Send + Sync {
	/// Whether an animation is currently playing.
	fn is_busy(&self) -> bool;

	/// Starts animating a space-separated sequence of primitive tokens.
	fn twist(&self, sequence: &str) -> Result<(), RigError>;

	/// Returns the cube to the solved state, dropping any queued twists.
	fn reset(&self) -> Result<(), RigError>;

	/// Current per-move animation duration.
	fn move_duration(&self) -> Duration;

	/// Changes the per-move animation duration for subsequent twists.
	fn set_move_duration(&self, duration: Duration);
}

/// Timers never reach further out than this.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `start + after`, with `after` clamped so the addition cannot overflow.
pub(crate) fn deadline_after(start: Instant, after: Duration) -> Instant {
	start.checked_add(after.min(FAR_FUTURE)).unwrap_or(start)
}
