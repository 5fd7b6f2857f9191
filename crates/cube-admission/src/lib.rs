//! Admission control for the cube solver service.
//!
//! This crate provides a per-client sliding-window rate limiter. Each client
//! owns the timestamps of its requests inside the trailing window; the
//! boundary moves continuously with the current time rather than resetting
//! at fixed intervals.
//!
//! State lives in process memory. Running several service processes behind a
//! load balancer would need the windows in a shared store instead.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Default length of the sliding window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Default number of requests allowed per window.
pub const DEFAULT_MAX_REQUESTS: usize = 30;

/// Errors returned when a request is not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
	/// The client already used its quota for the current window.
	#[error("Too many requests, retry after {retry_after:?}")]
	TooManyRequests { retry_after: Duration },
}

/// Limits for the sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
	pub window: Duration,
	pub max_requests: usize,
}

impl Default for AdmissionConfig {
	fn default() -> Self {
		Self {
			window: DEFAULT_WINDOW,
			max_requests: DEFAULT_MAX_REQUESTS,
		}
	}
}

/// Per-client sliding-window rate limiter.
pub struct SlidingWindowLimiter {
	config: AdmissionConfig,
	/// Request timestamps per client, oldest first.
	clients: DashMap<String, VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
	pub fn new(config: AdmissionConfig) -> Self {
		Self {
			config,
			clients: DashMap::new(),
		}
	}

	/// Decides whether a request from `client` at `now` is admitted.
	///
	/// Timestamps that fell out of the window are pruned first. A denied
	/// request is not recorded.
	pub fn admit(&self, client: &str, now: Instant) -> Result<(), AdmissionError> {
		let mut window = self.clients.entry(client.to_string()).or_default();
		prune(&mut window, now, self.config.window);

		if window.len() >= self.config.max_requests {
			let retry_after = window
				.front()
				.map(|oldest| self.config.window.saturating_sub(now.duration_since(*oldest)))
				.unwrap_or(self.config.window);
			debug!(client, requests = window.len(), "Window full");
			return Err(AdmissionError::TooManyRequests { retry_after });
		}

		window.push_back(now);
		Ok(())
	}

	/// Number of clients currently holding a window.
	pub fn tracked_clients(&self) -> usize {
		self.clients.len()
	}

	/// Prunes every window and forgets clients whose window became empty.
	///
	/// Returns the number of clients removed.
	pub fn sweep(&self, now: Instant) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, window| {
			prune(window, now, self.config.window);
			!window.is_empty()
		});
		let removed = before.saturating_sub(self.clients.len());
		if removed > 0 {
			debug!(tracked = self.tracked_clients(), "Swept {} idle clients", removed);
		}
		removed
	}

	/// Spawns a task that sweeps the limiter on a fixed interval.
	pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(every);
			// the first tick completes immediately
			ticker.tick().await;
			loop {
				ticker.tick().await;
				self.sweep(Instant::now());
			}
		})
	}
}

impl Default for SlidingWindowLimiter {
	fn default() -> Self {
		Self::new(AdmissionConfig::default())
	}
}

/// Drops timestamps at least `window` old.
fn prune(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
	while window
		.front()
		.is_some_and(|oldest| now.duration_since(*oldest) >= length)
	{
		window.pop_front();
	}
}
