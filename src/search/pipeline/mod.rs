//! Debounced suggestion lookup as an explicit state machine.
//!
//! ```text
//! Idle -> Debouncing -> CacheHit -> Idle
//!                    -> Fetching -> Idle          (scored and cached)
//!                    -> Fetching -> Failed         (retryable)
//!                    -> Failed(Offline)            (no fetch attempted)
//! ```
//!
//! The pipeline never performs I/O. [`SuggestionPipeline::poll`] hands out a
//! [`FetchRequest`] when a fetch is due and the driver reports the outcome
//! through [`SuggestionPipeline::complete`]. Each request carries an id; only
//! the most recently issued one is authoritative, and any input change
//! revokes it, so late responses for superseded queries are dropped.

use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::cache::{SuggestionCache, normalize_term};
use super::config::SearchConfig;
use super::debounce::Debouncer;
use super::query::build_suggestion_query;
use super::scoring::{ScoringInput, score};
use crate::backend::RecordQuery;
use crate::error::{BackendError, SuggestionError};
use crate::types::{SearchSuggestion, SuggestionKind, TranslationRecord};

#[cfg(test)]
mod tests;

/// Where the pipeline is for the current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
	Idle,
	Debouncing,
	Fetching { request: u64 },
	Failed(SuggestionError),
}

/// A backend lookup the driver should run and report back.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
	pub id: u64,
	pub term: String,
	pub query: RecordQuery,
}

pub struct SuggestionPipeline {
	config: SearchConfig,
	debouncer: Debouncer,
	cache: SuggestionCache,
	state: PipelineState,
	input: String,
	next_request: u64,
	/// Id of the only request whose response may still be applied.
	authoritative: Option<u64>,
	in_flight_term: String,
	suggestions: Vec<SearchSuggestion>,
	offline: bool,
}

impl SuggestionPipeline {
	#[must_use]
	pub fn new(config: SearchConfig) -> Self {
		Self {
			debouncer: Debouncer::new(config.debounce),
			cache: SuggestionCache::new(config.cache_ttl),
			config,
			state: PipelineState::Idle,
			input: String::new(),
			next_request: 0,
			authoritative: None,
			in_flight_term: String::new(),
			suggestions: Vec::new(),
			offline: false,
		}
	}

	#[must_use]
	pub fn state(&self) -> &PipelineState {
		&self.state
	}

	#[must_use]
	pub fn input(&self) -> &str {
		&self.input
	}

	#[must_use]
	pub fn suggestions(&self) -> &[SearchSuggestion] {
		&self.suggestions
	}

	#[must_use]
	pub fn error(&self) -> Option<&SuggestionError> {
		match &self.state {
			PipelineState::Failed(err) => Some(err),
			_ => None,
		}
	}

	#[must_use]
	pub fn is_loading(&self) -> bool {
		matches!(
			self.state,
			PipelineState::Debouncing | PipelineState::Fetching { .. }
		)
	}

	/// Reachability observed at the last [`poll`](Self::poll).
	#[must_use]
	pub fn is_offline(&self) -> bool {
		self.offline
	}

	/// When the driver should next call [`poll`](Self::poll).
	#[must_use]
	pub fn deadline(&self) -> Option<Instant> {
		self.debouncer.deadline()
	}

	#[must_use]
	pub fn cache(&self) -> &SuggestionCache {
		&self.cache
	}

	fn is_too_short(&self, term: &str) -> bool {
		term.trim().chars().count() < self.config.min_query_chars
	}

	/// Register new input. Restarts the debounce timer and revokes any
	/// in-flight request.
	pub fn set_query(&mut self, term: &str, now: Instant) {
		self.input = term.to_string();
		if let Some(revoked) = self.authoritative.take() {
			debug!("input changed; response for request {revoked} will be discarded");
		}

		if self.is_too_short(term) {
			self.debouncer.cancel();
			self.suggestions.clear();
			self.state = PipelineState::Idle;
			return;
		}

		self.debouncer.touch(now);
		self.state = PipelineState::Debouncing;
	}

	/// Advance timers. Returns a request when a fetch should start now.
	pub fn poll(&mut self, now: Instant, online: bool) -> Option<FetchRequest> {
		self.offline = !online;

		if online && self.state == PipelineState::Failed(SuggestionError::Offline) {
			debug!("connectivity restored; resuming suggestions for '{}'", self.input);
			return self.begin(now);
		}

		if self.debouncer.fire(now) {
			return self.begin(now);
		}
		None
	}

	/// Re-run the lookup for the current input after a failure.
	pub fn retry(&mut self, now: Instant, online: bool) -> Option<FetchRequest> {
		self.offline = !online;
		if !matches!(self.state, PipelineState::Failed(_)) || self.is_too_short(&self.input) {
			return None;
		}
		self.debouncer.cancel();
		self.begin(now)
	}

	fn begin(&mut self, now: Instant) -> Option<FetchRequest> {
		let term = self.input.trim().to_string();

		if self.offline {
			debug!("offline; not fetching suggestions for '{term}'");
			self.state = PipelineState::Failed(SuggestionError::Offline);
			return None;
		}

		if let Some(cached) = self.cache.get(&term, now) {
			debug!("suggestion cache hit for '{}'", normalize_term(&term));
			self.suggestions = cached.to_vec();
			self.state = PipelineState::Idle;
			return None;
		}

		self.next_request += 1;
		let id = self.next_request;
		self.authoritative = Some(id);
		self.in_flight_term.clone_from(&term);
		self.state = PipelineState::Fetching { request: id };
		debug!("fetching suggestions for '{term}' (request {id})");

		Some(FetchRequest {
			id,
			query: build_suggestion_query(&term, self.config.suggestion_limit),
			term,
		})
	}

	/// Apply the outcome of request `id`. Recency is scored as of `scored_at`.
	///
	/// Returns `false` when the response was stale and ignored.
	pub fn complete(
		&mut self,
		id: u64,
		result: Result<Vec<TranslationRecord>, BackendError>,
		now: Instant,
		scored_at: DateTime<Utc>,
	) -> bool {
		if self.authoritative != Some(id) {
			debug!("discarding stale suggestion response {id}");
			return false;
		}
		self.authoritative = None;
		let term = std::mem::take(&mut self.in_flight_term);

		match result {
			Ok(records) => {
				let suggestions = build_suggestions(&term, &records, scored_at);
				self.cache.put(&term, suggestions.clone(), now);
				self.suggestions = suggestions;
				self.state = PipelineState::Idle;
			}
			Err(err) => {
				warn!("suggestion lookup for '{term}' failed: {err}");
				self.state = PipelineState::Failed(err.into());
			}
		}
		true
	}
}

impl Default for SuggestionPipeline {
	fn default() -> Self {
		Self::new(SearchConfig::default())
	}
}

/// Score each record as a related suggestion, best first.
#[must_use]
pub fn build_suggestions(
	term: &str,
	records: &[TranslationRecord],
	now: DateTime<Utc>,
) -> Vec<SearchSuggestion> {
	let mut suggestions: Vec<SearchSuggestion> = records
		.iter()
		.map(|record| SearchSuggestion {
			original_term: term.to_string(),
			suggested_term: record.title.clone(),
			kind: SuggestionKind::Related,
			score: score(&ScoringInput::from_record(record), term, now),
			record_id: record.id.clone(),
			category_id: record.category_id.clone(),
			view_count: record.view_count,
		})
		.collect();
	suggestions.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
	suggestions
}
