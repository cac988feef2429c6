//! Poll cadence and deadline tracking.
//!
//! Polling runs at a fixed interval with no backoff. A deadline is optional;
//! without one a job is polled until it reaches a terminal state or the
//! caller cancels.

use std::time::Duration;

use tokio::time::Instant;

/// Default interval between polls (1 second).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration for a polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Fixed delay between consecutive polls
    pub poll_interval: Duration,
    /// Delay before the first poll (gives the solver a head start)
    pub initial_delay: Duration,
    /// Overall limit for one `get` call (None = poll until terminal)
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            initial_delay: Duration::ZERO,
            deadline: None,
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// State tracker for one polling loop.
///
/// Uses tokio's clock so paused-time tests see virtual sleeps.
#[derive(Debug)]
pub struct PollState {
    /// Total number of poll attempts
    pub attempts: u32,
    start_time: Instant,
    config: PollConfig,
}

impl PollState {
    pub fn new(config: PollConfig) -> Self {
        Self {
            attempts: 0,
            start_time: Instant::now(),
            config,
        }
    }

    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Instant at which the loop must give up, if bounded.
    pub fn deadline_at(&self) -> Option<Instant> {
        self.config.deadline.map(|d| self.start_time + d)
    }

    /// Delay before the next attempt.
    pub fn next_delay(&self) -> Duration {
        if self.attempts == 0 {
            self.config.initial_delay
        } else {
            self.config.poll_interval
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
