use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::SearchSuggestion;

/// Default lifetime of a cached suggestion list.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache key for a raw query: trimmed and lowercased.
#[must_use]
pub fn normalize_term(term: &str) -> String {
	term.trim().to_lowercase()
}

struct CacheEntry {
	suggestions: Vec<SearchSuggestion>,
	stored_at: Instant,
}

/// Time-bounded map from normalised query to suggestions.
///
/// Expired entries behave exactly like missing ones.
pub struct SuggestionCache {
	ttl: Duration,
	entries: HashMap<String, CacheEntry>,
}

impl SuggestionCache {
	#[must_use]
	pub fn new(ttl: Duration) -> Self {
		Self {
			ttl,
			entries: HashMap::new(),
		}
	}

	pub fn get(&self, term: &str, now: Instant) -> Option<&[SearchSuggestion]> {
		let entry = self.entries.get(&normalize_term(term))?;
		if now.saturating_duration_since(entry.stored_at) >= self.ttl {
			return None;
		}
		Some(&entry.suggestions)
	}

	/// Store `suggestions` for `term`, dropping entries that have expired.
	pub fn put(&mut self, term: &str, suggestions: Vec<SearchSuggestion>, now: Instant) {
		self.purge_expired(now);
		self.entries.insert(
			normalize_term(term),
			CacheEntry {
				suggestions,
				stored_at: now,
			},
		);
	}

	fn purge_expired(&mut self, now: Instant) {
		let ttl = self.ttl;
		self.entries
			.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < ttl);
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Default for SuggestionCache {
	fn default() -> Self {
		Self::new(DEFAULT_CACHE_TTL)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{ScoreBreakdown, SuggestionKind};

	fn suggestion(term: &str) -> SearchSuggestion {
		SearchSuggestion {
			original_term: "he".into(),
			suggested_term: term.into(),
			kind: SuggestionKind::Related,
			score: ScoreBreakdown::default(),
			record_id: "1".into(),
			category_id: None,
			view_count: 0,
		}
	}

	#[test]
	fn lookups_are_normalised() {
		let start = Instant::now();
		let mut cache = SuggestionCache::new(Duration::from_secs(60));
		cache.put("  Heart ", vec![suggestion("Heart Sutra")], start);

		let hit = cache.get("heart", start).expect("cache hit");
		assert_eq!(hit[0].suggested_term, "Heart Sutra");
		assert!(cache.get("HEART", start).is_some());
		assert!(cache.get("hearts", start).is_none());
	}

	#[test]
	fn entries_expire_after_ttl() {
		let start = Instant::now();
		let mut cache = SuggestionCache::new(Duration::from_secs(60));
		cache.put("heart", vec![suggestion("Heart Sutra")], start);

		assert!(cache.get("heart", start + Duration::from_secs(59)).is_some());
		assert!(cache.get("heart", start + Duration::from_secs(60)).is_none());

		cache.put("lotus", vec![suggestion("Lotus Sutra")], start + Duration::from_secs(61));
		assert_eq!(cache.len(), 1, "expired entries are dropped on insert");
	}

	#[test]
	fn newer_put_replaces_entry_and_restarts_ttl() {
		let start = Instant::now();
		let mut cache = SuggestionCache::new(Duration::from_secs(10));
		cache.put("heart", vec![suggestion("old")], start);
		let later = start + Duration::from_secs(8);
		cache.put("heart", vec![suggestion("new")], later);

		let hit = cache.get("heart", start + Duration::from_secs(15)).expect("hit");
		assert_eq!(hit[0].suggested_term, "new");
		assert_eq!(cache.len(), 1);
	}
}
