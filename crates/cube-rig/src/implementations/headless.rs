//! A rig without rendering.
//!
//! Twists are validated and recorded, and the rig reports itself busy for as
//! long as the animation would have taken. Twists issued while busy queue up
//! behind the running one.

use crate::{deadline_after, Rig, RigError};
use cube_types::MoveToken;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
struct Inner {
	move_duration: Duration,
	busy_until: Option<Instant>,
	history: Vec<String>,
}

#[derive(Debug)]
pub struct HeadlessRig {
	inner: Mutex<Inner>,
}

impl HeadlessRig {
	pub fn new(move_duration: Duration) -> Self {
		Self {
			inner: Mutex::new(Inner {
				move_duration,
				busy_until: None,
				history: Vec::new(),
			}),
		}
	}

	/// Every twist accepted since the last reset, oldest first.
	pub fn history(&self) -> Vec<String> {
		self.lock().history.clone()
	}

	fn lock(&self) -> MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Rig for HeadlessRig {
	fn is_busy(&self) -> bool {
		self.lock()
			.busy_until
			.is_some_and(|until| Instant::now() < until)
	}

	fn twist(&self, sequence: &str) -> Result<(), RigError> {
		let count = sequence
			.split_whitespace()
			.map(|token| {
				token
					.parse::<MoveToken>()
					.map_err(|_| RigError::UnknownToken(token.to_string()))
			})
			.collect::<Result<Vec<_>, _>>()?
			.len();

		let mut inner = self.lock();
		let now = Instant::now();
		let start = inner.busy_until.filter(|until| *until > now).unwrap_or(now);
		let animation = inner
			.move_duration
			.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX));
		inner.busy_until = Some(deadline_after(start, animation));
		inner.history.push(sequence.to_string());

		debug!("Twisting {} tokens over {:?}", count, animation);
		Ok(())
	}

	fn reset(&self) -> Result<(), RigError> {
		let mut inner = self.lock();
		inner.busy_until = None;
		inner.history.clear();
		debug!("Rig back to solved");
		Ok(())
	}

	fn move_duration(&self) -> Duration {
		self.lock().move_duration
	}

	fn set_move_duration(&self, duration: Duration) {
		self.lock().move_duration = duration;
	}
}
