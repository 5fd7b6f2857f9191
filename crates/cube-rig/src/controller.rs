//! Interactive operations on the rig.
//!
//! The controller ties move notation, the solver and the lease scheduler
//! together: free-form moves typed by a user, random shuffles, resets and
//! animated solutions all go through the same lease. Solves are timed from
//! the request until the cube shows solved; a shuffle or reset clears the
//! timer.

use crate::deadline_after;
use crate::scheduler::{LeaseError, LeaseReceipt, LeaseScheduler};
use cube_moves::{join_tokens, normalize, random_shuffle, MoveError, DEFAULT_SHUFFLE_LENGTH};
use cube_solver::{CubeSolver, SolveError, Solution};
use cube_types::{CubeState, MoveToken};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum ControlError {
	#[error(transparent)]
	InvalidMove(#[from] MoveError),
	#[error(transparent)]
	Solve(#[from] SolveError),
	#[error(transparent)]
	Lease(#[from] LeaseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
	/// Number of tokens in a random shuffle.
	pub shuffle_length: usize,
	/// How long an invalid-move notice stays visible.
	pub error_display: Duration,
}

impl Default for ControllerConfig {
	fn default() -> Self {
		Self {
			shuffle_length: DEFAULT_SHUFFLE_LENGTH,
			error_display: Duration::from_millis(3_000),
		}
	}
}

/// Result of an animated solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRun {
	pub solution: Solution,
	/// `None` when the cube was already solved and nothing was dispatched.
	pub receipt: Option<LeaseReceipt>,
	/// Time from the solve request until the cube shows solved. `None` when
	/// a shuffle or reset cleared the timer in between.
	pub elapsed: Option<Duration>,
}

/// Renders a duration as `mm:ss.cc`.
pub fn format_elapsed(elapsed: Duration) -> String {
	let centis = elapsed.as_millis() / 10;
	format!(
		"{:02}:{:02}.{:02}",
		centis / 6_000,
		centis / 100 % 60,
		centis % 100
	)
}

/// Transient notice shown after invalid input.
struct Notice {
	message: watch::Sender<Option<String>>,
	generation: AtomicU64,
}

pub struct RigController {
	scheduler: LeaseScheduler,
	solver: Arc<CubeSolver>,
	config: ControllerConfig,
	notice: Arc<Notice>,
	timer: Mutex<Option<Instant>>,
}

impl RigController {
	pub fn new(scheduler: LeaseScheduler, solver: Arc<CubeSolver>, config: ControllerConfig) -> Self {
		let (message, _) = watch::channel(None);
		Self {
			scheduler,
			solver,
			config,
			notice: Arc::new(Notice {
				message,
				generation: AtomicU64::new(0),
			}),
			timer: Mutex::new(None),
		}
	}

	pub fn scheduler(&self) -> &LeaseScheduler {
		&self.scheduler
	}

	/// Subscribes to the invalid-move notice.
	pub fn move_error(&self) -> watch::Receiver<Option<String>> {
		self.notice.message.subscribe()
	}

	/// Plays user-typed moves; empty input shuffles instead.
	///
	/// Invalid input publishes a notice and never reaches the rig.
	pub async fn play(&self, input: &str) -> Result<LeaseReceipt, ControlError> {
		let input = input.trim();
		if input.is_empty() {
			return self.shuffle().await;
		}

		let tokens = match normalize(input) {
			Ok(tokens) => tokens,
			Err(e) => {
				self.show_notice(e.to_string());
				return Err(e.into());
			}
		};

		self.clear_notice();
		info!("Playing moves: {}", join_tokens(&tokens));
		self.run(&tokens).await
	}

	pub async fn shuffle(&self) -> Result<LeaseReceipt, ControlError> {
		self.reset_timer();
		let tokens = random_shuffle(self.config.shuffle_length);
		info!("Shuffling: {}", join_tokens(&tokens));
		self.run(&tokens).await
	}

	/// Returns the rig to the solved cube and clears the solve timer.
	pub async fn reset(&self) -> Result<(), ControlError> {
		self.reset_timer();
		Ok(self.scheduler.reset().await?)
	}

	/// Time since the running solve started, if one is being timed.
	pub fn timer_elapsed(&self) -> Option<Duration> {
		let started = *self.lock_timer();
		started.map(|started| started.elapsed())
	}

	/// Solves the given state and animates the solution.
	#[instrument(skip_all)]
	pub async fn solve(&self, state: &CubeState) -> Result<SolveRun, ControlError> {
		self.start_timer();
		let solution = match self.solver.solve(state).await {
			Ok(solution) => solution,
			Err(e) => {
				self.reset_timer();
				return Err(e.into());
			}
		};

		if solution.is_empty() {
			return Ok(SolveRun {
				solution,
				receipt: None,
				elapsed: self.stop_timer(),
			});
		}

		let tokens: Vec<MoveToken> = solution.moves.iter().flat_map(|m| m.expand()).collect();
		let receipt = match self.run(&tokens).await {
			Ok(receipt) => receipt,
			Err(e) => {
				self.reset_timer();
				return Err(e);
			}
		};

		// solved once the animation has played out
		let elapsed = self
			.stop_timer()
			.map(|elapsed| elapsed.saturating_add(receipt.release_after));
		if let Some(elapsed) = elapsed {
			info!("Solved in {}", format_elapsed(elapsed));
		}

		Ok(SolveRun {
			solution,
			receipt: Some(receipt),
			elapsed,
		})
	}

	async fn run(&self, tokens: &[MoveToken]) -> Result<LeaseReceipt, ControlError> {
		Ok(self.scheduler.execute(tokens).await?)
	}

	fn lock_timer(&self) -> MutexGuard<'_, Option<Instant>> {
		self.timer.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Starts the timer unless a solve is already being timed.
	fn start_timer(&self) {
		self.lock_timer().get_or_insert_with(Instant::now);
	}

	fn stop_timer(&self) -> Option<Duration> {
		self.lock_timer().take().map(|started| started.elapsed())
	}

	fn reset_timer(&self) {
		self.lock_timer().take();
	}

	fn show_notice(&self, message: String) {
		let generation = self.notice.generation.fetch_add(1, Ordering::SeqCst) + 1;
		self.notice.message.send_replace(Some(message));

		let notice = self.notice.clone();
		let clear_at = deadline_after(Instant::now(), self.config.error_display);
		tokio::spawn(async move {
			tokio::time::sleep_until(clear_at).await;
			// a newer notice owns the display now
			if notice.generation.load(Ordering::SeqCst) == generation {
				notice.message.send_replace(None);
			}
		});
	}

	fn clear_notice(&self) {
		self.notice.generation.fetch_add(1, Ordering::SeqCst);
		self.notice.message.send_replace(None);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{HeadlessRig, LeaseConfig};

	fn controller() -> (RigController, Arc<HeadlessRig>) {
		let rig = Arc::new(HeadlessRig::new(Duration::from_millis(300)));
		let scheduler = LeaseScheduler::new(rig.clone(), LeaseConfig::default());
		let controller = RigController::new(
			scheduler,
			Arc::new(CubeSolver::default()),
			ControllerConfig::default(),
		);
		(controller, rig)
	}

	async fn advance_ms(ms: u64) {
		tokio::time::advance(Duration::from_millis(ms)).await;
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_play_dispatches_normalized_moves() {
		let (controller, rig) = controller();
		let receipt = controller.play("  R U2 F' ").await.unwrap();
		assert_eq!(receipt.sequence, "R U U f");
		assert_eq!(rig.history(), vec!["R U U f"]);
		assert_eq!(*controller.move_error().borrow(), None);
	}

	#[tokio::test(start_paused = true)]
	async fn test_invalid_move_shows_notice_and_skips_rig() {
		let (controller, rig) = controller();
		let err = controller.play("R Q").await.unwrap_err();
		assert!(matches!(err, ControlError::InvalidMove(_)));
		assert!(rig.history().is_empty());

		let notice = controller.move_error().borrow().clone().unwrap();
		assert!(notice.contains("\"Q\""));

		advance_ms(2_999).await;
		assert!(controller.move_error().borrow().is_some());
		advance_ms(1).await;
		assert!(controller.move_error().borrow().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_newer_notice_outlives_older_timer() {
		let (controller, _rig) = controller();
		assert!(controller.play("X").await.is_err());
		advance_ms(2_000).await;
		assert!(controller.play("Y").await.is_err());

		advance_ms(1_000).await;
		let notice = controller.move_error().borrow().clone().unwrap();
		assert!(notice.contains("\"Y\""));

		advance_ms(2_000).await;
		assert!(controller.move_error().borrow().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn test_empty_input_shuffles() {
		let (controller, rig) = controller();
		let receipt = controller.play("   ").await.unwrap();
		assert_eq!(receipt.tokens, DEFAULT_SHUFFLE_LENGTH);
		assert_eq!(rig.history().len(), 1);
		assert_eq!(controller.scheduler().last_sequence(), Some(receipt.sequence));
	}

	#[tokio::test(start_paused = true)]
	async fn test_solve_animates_expanded_solution() {
		let (controller, rig) = controller();
		let mut state = CubeState::default();
		state.up[1] = "R".to_string();
		state.right[1] = "W".to_string();

		let run = controller.solve(&state).await.unwrap();
		assert_eq!(run.solution.to_string(), "R U R' U' F' U F");
		let receipt = run.receipt.unwrap();
		assert_eq!(receipt.sequence, "R U r u f U F");
		assert_eq!(rig.history(), vec!["R U r u f U F"]);
	}

	#[tokio::test(start_paused = true)]
	async fn test_solved_cube_is_not_dispatched() {
		let (controller, rig) = controller();
		let run = controller.solve(&CubeState::default()).await.unwrap();
		assert!(run.solution.is_empty());
		assert!(run.receipt.is_none());
		assert!(rig.history().is_empty());
	}

	#[test]
	fn test_format_elapsed() {
		assert_eq!(format_elapsed(Duration::ZERO), "00:00.00");
		assert_eq!(format_elapsed(Duration::from_millis(4_659)), "00:04.65");
		assert_eq!(format_elapsed(Duration::from_millis(754_320)), "12:34.32");
	}

	#[tokio::test(start_paused = true)]
	async fn test_solve_is_timed_until_animation_ends() {
		let (controller, _rig) = controller();
		let mut state = CubeState::default();
		state.up[1] = "R".to_string();
		state.right[1] = "W".to_string();

		// the solve waits out this lease first
		controller.play("R").await.unwrap();
		let run = controller.solve(&state).await.unwrap();

		let receipt = run.receipt.unwrap();
		assert_eq!(receipt.release_after, Duration::from_millis(3_650));
		assert_eq!(run.elapsed, Some(Duration::from_millis(4_650)));
		assert_eq!(controller.timer_elapsed(), None);
	}

	#[tokio::test(start_paused = true)]
	async fn test_reset_clears_timer_and_rig() {
		let (controller, rig) = controller();
		let controller = Arc::new(controller);
		let mut state = CubeState::default();
		state.up[1] = "R".to_string();
		state.right[1] = "W".to_string();

		controller.play("R").await.unwrap();
		let solve = {
			let controller = controller.clone();
			tokio::spawn(async move { controller.solve(&state).await })
		};
		advance_ms(0).await;
		advance_ms(500).await;
		assert_eq!(controller.timer_elapsed(), Some(Duration::from_millis(500)));

		let reset = {
			let controller = controller.clone();
			tokio::spawn(async move { controller.reset().await })
		};
		advance_ms(1).await;
		assert_eq!(controller.timer_elapsed(), None);

		let run = solve.await.unwrap().unwrap();
		assert!(run.receipt.is_some());
		assert_eq!(run.elapsed, None);

		reset.await.unwrap().unwrap();
		assert!(rig.history().is_empty());
		assert_eq!(controller.scheduler().last_sequence(), None);
	}

	#[tokio::test(start_paused = true)]
	async fn test_shuffle_clears_timer() {
		let (controller, _rig) = controller();
		controller.start_timer();
		assert!(controller.timer_elapsed().is_some());

		controller.shuffle().await.unwrap();
		assert_eq!(controller.timer_elapsed(), None);
	}

	#[tokio::test(start_paused = true)]
	async fn test_sequences_wait_for_each_other() {
		let (controller, rig) = controller();
		controller.play("R").await.unwrap();
		controller.play("L").await.unwrap();
		assert_eq!(rig.history(), vec!["R", "L"]);
	}
}
