//! Time source injected into every component that debounces or expires.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};

/// Monotonic time for timers plus the matching wall-clock time.
pub trait Clock {
	fn now(&self) -> Instant;

	/// Wall-clock time used for timestamps and recency scoring.
	fn utc(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}

	fn utc(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

#[derive(Debug, Clone, Copy)]
struct ManualTime {
	instant: Instant,
	utc: DateTime<Utc>,
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
	time: Arc<Mutex<ManualTime>>,
}

impl ManualClock {
	#[must_use]
	pub fn new() -> Self {
		Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
	}

	/// Manual clock whose wall-clock reading starts at `utc`.
	#[must_use]
	pub fn starting_at(utc: DateTime<Utc>) -> Self {
		Self {
			time: Arc::new(Mutex::new(ManualTime {
				instant: Instant::now(),
				utc,
			})),
		}
	}

	pub fn advance(&self, by: Duration) {
		let mut time = self.lock();
		time.instant += by;
		time.utc += TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
	}

	fn lock(&self) -> MutexGuard<'_, ManualTime> {
		self.time.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.lock().instant
	}

	fn utc(&self) -> DateTime<Utc> {
		self.lock().utc
	}
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
	fn now(&self) -> Instant {
		(**self).now()
	}

	fn utc(&self) -> DateTime<Utc> {
		(**self).utc()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_clock_clones_share_time() {
		let clock = ManualClock::new();
		let shared = clock.clone();
		let start = clock.now();
		shared.advance(Duration::from_millis(250));
		assert_eq!(clock.now() - start, Duration::from_millis(250));
	}

	#[test]
	fn manual_clock_moves_wall_time_with_instant() {
		let clock = ManualClock::new();
		clock.advance(Duration::from_secs(90));
		assert_eq!(clock.utc(), DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(90));
	}
}
