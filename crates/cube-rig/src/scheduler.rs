//! Lease scheduler for the shared rig.
//!
//! At most one command sequence animates on the rig at a time. A caller
//! acquires the lease by polling until both the lease slot is free and the
//! rig reports it is not busy, then dispatches its whole token sequence in
//! one twist. The lease is released by a timer once the animation should
//! have finished: `tokens x per-move duration + buffer`.
//!
//! A reset takes the same lease, snaps the rig back to solved with a zero
//! animation duration and forgets the last dispatched sequence.
//!
//! The release is owned by a drop guard. Whether the timer fires, the dispatch
//! fails, or the timer task is dropped with the runtime, the prior animation
//! duration is restored and the slot is freed.

use crate::{deadline_after, Rig, RigError};
use cube_moves::join_tokens;
use cube_types::MoveToken;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

const PHASE_IDLE: u8 = 0;
const PHASE_LEASED: u8 = 1;
const PHASE_RELEASING: u8 = 2;

/// Timing parameters of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseConfig {
	/// Delay between acquire attempts while the rig is busy.
	pub poll_interval: Duration,
	/// Per-move animation duration applied while the lease is held.
	pub lease_move_duration: Duration,
	/// Added to the animation time to compute the release deadline.
	pub release_buffer: Duration,
	/// Release delay used after a failed dispatch or a reset.
	pub error_release_delay: Duration,
	/// Give up acquiring after this long. `None` waits forever.
	pub max_wait: Option<Duration>,
}

impl Default for LeaseConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_millis(200),
			lease_move_duration: Duration::from_millis(450),
			release_buffer: Duration::from_millis(500),
			error_release_delay: Duration::from_millis(100),
			max_wait: None,
		}
	}
}

/// Observable state of the lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseState {
	/// No lease held and nobody waiting.
	Idle,
	/// No lease held yet, at least one caller waiting for the rig.
	Acquiring,
	/// Lease held, dispatch in progress.
	Leased,
	/// Sequence dispatched, waiting for the release deadline.
	Releasing,
}

/// Errors that can occur while running a sequence under a lease.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaseError {
	/// The rig stayed busy longer than the configured maximum wait.
	#[error("Rig still busy after {waited:?}")]
	Timeout { waited: Duration },
	/// The rig refused the sequence. The lease is still released.
	#[error("Dispatch failed: {0}")]
	Dispatch(#[source] RigError),
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseReceipt {
	/// The token string sent to the rig.
	pub sequence: String,
	/// Number of primitive tokens dispatched.
	pub tokens: usize,
	/// Time from dispatch until the lease is released.
	pub release_after: Duration,
}

struct Shared {
	rig: Arc<dyn Rig>,
	slot: Arc<Mutex<()>>,
	phase: AtomicU8,
	waiting: AtomicUsize,
	input_enabled: watch::Sender<bool>,
	last_sequence: watch::Sender<Option<String>>,
}

/// Restores the rig and frees the slot when dropped.
struct Release {
	shared: Arc<Shared>,
	prior_duration: Duration,
	_slot: OwnedMutexGuard<()>,
}

impl Drop for Release {
	fn drop(&mut self) {
		self.shared.rig.set_move_duration(self.prior_duration);
		self.shared.input_enabled.send_replace(true);
		self.shared.phase.store(PHASE_IDLE, Ordering::SeqCst);
		debug!("Lease released");
	}
}

/// Counts a caller as waiting for as long as it is alive.
struct Waiting<'a>(&'a AtomicUsize);

impl<'a> Waiting<'a> {
	fn enter(counter: &'a AtomicUsize) -> Self {
		counter.fetch_add(1, Ordering::SeqCst);
		Self(counter)
	}
}

impl Drop for Waiting<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

/// Serializes command sequences on one rig.
///
/// Cloning yields another handle to the same lease.
#[derive(Clone)]
pub struct LeaseScheduler {
	shared: Arc<Shared>,
	config: LeaseConfig,
}

impl LeaseScheduler {
	pub fn new(rig: Arc<dyn Rig>, config: LeaseConfig) -> Self {
		let (input_enabled, _) = watch::channel(true);
		let (last_sequence, _) = watch::channel(None);
		Self {
			shared: Arc::new(Shared {
				rig,
				slot: Arc::new(Mutex::new(())),
				phase: AtomicU8::new(PHASE_IDLE),
				waiting: AtomicUsize::new(0),
				input_enabled,
				last_sequence,
			}),
			config,
		}
	}

	pub fn state(&self) -> LeaseState {
		match self.shared.phase.load(Ordering::SeqCst) {
			PHASE_LEASED => LeaseState::Leased,
			PHASE_RELEASING => LeaseState::Releasing,
			_ if self.shared.waiting.load(Ordering::SeqCst) > 0 => LeaseState::Acquiring,
			_ => LeaseState::Idle,
		}
	}

	/// Whether conflicting input (e.g. a submit control) may be used.
	pub fn is_input_enabled(&self) -> bool {
		*self.shared.input_enabled.borrow()
	}

	/// The token string of the last successful dispatch.
	pub fn last_sequence(&self) -> Option<String> {
		self.shared.last_sequence.borrow().clone()
	}

	/// Waits until no lease is held.
	pub async fn idle(&self) {
		let _slot = self.shared.slot.lock().await;
	}

	/// Runs a token sequence on the rig under an exclusive lease.
	///
	/// Waits while the rig is busy or another lease is held, then dispatches
	/// all tokens in one twist. Returns once dispatched; the lease stays held
	/// until the release deadline.
	#[instrument(skip_all, fields(tokens = tokens.len()))]
	pub async fn execute(&self, tokens: &[MoveToken]) -> Result<LeaseReceipt, LeaseError> {
		let release = self.lease(self.config.lease_move_duration).await?;
		let shared = &self.shared;

		let sequence = join_tokens(tokens);
		let dispatched = shared.rig.twist(&sequence);

		let release_after = match dispatched {
			Ok(()) => release_deadline(
				tokens.len(),
				shared.rig.move_duration(),
				self.config.release_buffer,
			),
			Err(_) => self.config.error_release_delay,
		};
		self.arm_release(release, release_after);

		match dispatched {
			Ok(()) => {
				info!("Dispatched: {}", sequence);
				shared.last_sequence.send_replace(Some(sequence.clone()));
				Ok(LeaseReceipt {
					sequence,
					tokens: tokens.len(),
					release_after,
				})
			}
			Err(e) => {
				warn!("Rig rejected {:?}: {}", sequence, e);
				Err(LeaseError::Dispatch(e))
			}
		}
	}

	/// Returns the rig to the solved cube under the lease.
	///
	/// The reset runs with a zero animation duration. The prior duration is
	/// restored once `error_release_delay` has passed.
	#[instrument(skip_all)]
	pub async fn reset(&self) -> Result<(), LeaseError> {
		let release = self.lease(Duration::ZERO).await?;
		let reset = self.shared.rig.reset();
		self.arm_release(release, self.config.error_release_delay);

		match reset {
			Ok(()) => {
				self.shared.last_sequence.send_replace(None);
				info!("Rig reset");
				Ok(())
			}
			Err(e) => {
				warn!("Rig refused reset: {}", e);
				Err(LeaseError::Dispatch(e))
			}
		}
	}

	/// Takes the lease and applies `move_duration` until it is released.
	async fn lease(&self, move_duration: Duration) -> Result<Release, LeaseError> {
		let slot = self.acquire().await?;
		let shared = &self.shared;

		shared.phase.store(PHASE_LEASED, Ordering::SeqCst);
		shared.input_enabled.send_replace(false);
		let prior_duration = shared.rig.move_duration();
		shared.rig.set_move_duration(move_duration);

		Ok(Release {
			shared: shared.clone(),
			prior_duration,
			_slot: slot,
		})
	}

	/// Polls until the slot is free and the rig is idle.
	async fn acquire(&self) -> Result<OwnedMutexGuard<()>, LeaseError> {
		let started = Instant::now();
		let _waiting = Waiting::enter(&self.shared.waiting);

		loop {
			if let Ok(slot) = self.shared.slot.clone().try_lock_owned() {
				if !self.shared.rig.is_busy() {
					return Ok(slot);
				}
			}

			let waited = started.elapsed();
			if let Some(max_wait) = self.config.max_wait {
				if waited >= max_wait {
					warn!("Giving up on the rig after {:?}", waited);
					return Err(LeaseError::Timeout { waited });
				}
			}

			debug!("Rig busy, retrying in {:?}", self.config.poll_interval);
			tokio::time::sleep(self.config.poll_interval).await;
		}
	}

	fn arm_release(&self, release: Release, after: Duration) {
		release.shared.phase.store(PHASE_RELEASING, Ordering::SeqCst);
		let deadline = deadline_after(Instant::now(), after);
		tokio::spawn(async move {
			tokio::time::sleep_until(deadline).await;
			drop(release);
		});
	}
}

/// `tokens x per_move + buffer`, saturating on overflow.
fn release_deadline(tokens: usize, per_move: Duration, buffer: Duration) -> Duration {
	let tokens = u32::try_from(tokens).unwrap_or(u32::MAX);
	per_move.saturating_mul(tokens).saturating_add(buffer)
}
