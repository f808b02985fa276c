use std::time::Duration;

use super::cache::DEFAULT_CACHE_TTL;
use super::debounce::DEFAULT_DEBOUNCE;
use super::history::DEFAULT_HISTORY_CAPACITY;

/// Tunables shared by the suggestion pipeline and the listing search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
	/// Quiet period after the last keystroke or filter change.
	pub debounce: Duration,
	/// Trimmed terms shorter than this never reach the backend.
	pub min_query_chars: usize,
	pub cache_ttl: Duration,
	/// Maximum records requested per suggestion lookup.
	pub suggestion_limit: usize,
	pub history_capacity: usize,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			debounce: DEFAULT_DEBOUNCE,
			min_query_chars: 2,
			cache_ttl: DEFAULT_CACHE_TTL,
			suggestion_limit: 8,
			history_capacity: DEFAULT_HISTORY_CAPACITY,
		}
	}
}
