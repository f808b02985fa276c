use std::time::{Duration, Instant};

/// Delay applied to keystrokes and filter changes before querying.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Restartable one-shot timer driven by an external clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
	delay: Duration,
	deadline: Option<Instant>,
}

impl Debouncer {
	#[must_use]
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			deadline: None,
		}
	}

	#[must_use]
	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Arm the timer, pushing back any pending deadline.
	pub fn touch(&mut self, now: Instant) {
		self.deadline = Some(now + self.delay);
	}

	/// Arm the timer so it fires on the next [`fire`](Self::fire).
	pub fn trigger(&mut self, now: Instant) {
		self.deadline = Some(now);
	}

	pub fn cancel(&mut self) {
		self.deadline = None;
	}

	#[must_use]
	pub fn is_pending(&self) -> bool {
		self.deadline.is_some()
	}

	#[must_use]
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Returns `true` exactly once after the deadline passes.
	pub fn fire(&mut self, now: Instant) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}
}

impl Default for Debouncer {
	fn default() -> Self {
		Self::new(DEFAULT_DEBOUNCE)
	}
}
