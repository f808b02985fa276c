use std::time::Duration;

use chrono::TimeZone;

use super::*;
use crate::backend::RecordSource;
use crate::clock::{Clock, ManualClock};
use crate::testing::CountingSource;

const QUIET: Duration = Duration::from_millis(300);

struct Harness {
	pipeline: SuggestionPipeline,
	clock: ManualClock,
	source: CountingSource,
	online: bool,
}

impl Harness {
	fn new() -> Self {
		Self::with_clock(ManualClock::new())
	}

	fn with_clock(clock: ManualClock) -> Self {
		Self {
			pipeline: SuggestionPipeline::default(),
			clock,
			source: CountingSource::library(),
			online: true,
		}
	}

	fn type_text(&mut self, term: &str) {
		self.pipeline.set_query(term, self.clock.now());
	}

	fn wait(&mut self, by: Duration) -> Option<FetchRequest> {
		self.clock.advance(by);
		self.pipeline.poll(self.clock.now(), self.online)
	}

	fn answer(&mut self, request: &FetchRequest) -> bool {
		let result = self.source.query(&request.query);
		self.pipeline.complete(request.id, result, self.clock.now(), self.clock.utc())
	}

	/// Wait out the debounce and answer whatever request comes out.
	fn settle(&mut self) {
		if let Some(request) = self.wait(QUIET) {
			self.answer(&request);
		}
	}

	fn titles(&self) -> Vec<&str> {
		self.pipeline
			.suggestions()
			.iter()
			.map(|suggestion| suggestion.suggested_term.as_str())
			.collect()
	}
}

#[test]
fn single_character_short_circuits() {
	let mut h = Harness::new();
	h.type_text("a");
	assert_eq!(h.pipeline.state(), &PipelineState::Idle);
	assert!(h.pipeline.suggestions().is_empty());
	assert!(h.wait(QUIET * 10).is_none());
	assert_eq!(h.source.calls(), 0);
	assert!(h.pipeline.cache().is_empty());
}

#[test]
fn whitespace_does_not_count_towards_minimum() {
	let mut h = Harness::new();
	h.type_text("  a  ");
	assert!(h.wait(QUIET).is_none());
	assert_eq!(h.source.calls(), 0);
}

#[test]
fn two_characters_fetch_once_after_quiet_period() {
	let mut h = Harness::new();
	h.type_text("ab");
	assert!(h.pipeline.is_loading());
	assert!(h.wait(Duration::from_millis(299)).is_none());

	let request = h.wait(Duration::from_millis(1)).expect("fetch due");
	assert_eq!(request.term, "ab");
	assert!(h.answer(&request));
	assert_eq!(h.source.calls(), 1);
	assert!(h.wait(QUIET * 10).is_none());
	assert_eq!(h.source.calls(), 1);
	assert_eq!(h.pipeline.state(), &PipelineState::Idle);
}

#[test]
fn keystrokes_restart_the_debounce() {
	let mut h = Harness::new();
	h.type_text("he");
	assert!(h.wait(Duration::from_millis(200)).is_none());
	h.type_text("hea");
	assert!(h.wait(Duration::from_millis(200)).is_none());
	h.type_text("heart");

	let request = h.wait(QUIET).expect("fetch due");
	assert_eq!(request.term, "heart");
	h.answer(&request);
	assert_eq!(h.source.calls(), 1);
	assert_eq!(h.titles(), vec!["WS001 Heart Sutra"]);
}

#[test]
fn recency_is_scored_against_the_injected_clock() {
	let mut h = Harness::with_clock(ManualClock::starting_at(
		Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap(),
	));
	h.type_text("heart sutra");
	h.settle();

	let heart = &h.pipeline.suggestions()[0];
	assert_eq!(heart.record_id, "1");
	assert!((heart.score.recency - (1.0 - 182.0 / 365.0)).abs() < 1e-9);
}

#[test]
fn suggestions_are_scored_related_results() {
	let mut h = Harness::new();
	h.type_text("sutra");
	h.settle();

	let suggestions = h.pipeline.suggestions();
	assert_eq!(suggestions.len(), 2);
	assert!(suggestions.iter().all(|s| s.kind == SuggestionKind::Related));
	assert!(suggestions.iter().all(|s| s.original_term == "sutra"));
	// Heart Sutra: title 1, tags 1/2, views saturated, category present.
	let heart = &suggestions[0];
	assert_eq!(heart.suggested_term, "WS001 Heart Sutra");
	let expected = (2.0 + 0.5 * 1.5 + 0.8 + 0.5) / 5.3;
	assert!((heart.score.total - expected).abs() < 1e-9);
	assert!(suggestions[0].score.total >= suggestions[1].score.total);
}

#[test]
fn identical_normalised_query_is_served_from_cache() {
	let mut h = Harness::new();
	h.type_text("Heart");
	h.settle();
	assert_eq!(h.source.calls(), 1);

	h.type_text("x");
	h.type_text("  heart ");
	assert!(h.wait(QUIET).is_none(), "cache hit must not issue a fetch");
	assert_eq!(h.source.calls(), 1);
	assert_eq!(h.titles(), vec!["WS001 Heart Sutra"]);
	assert_eq!(h.pipeline.state(), &PipelineState::Idle);
}

#[test]
fn expired_cache_entry_fetches_again() {
	let mut h = Harness::new();
	h.type_text("heart");
	h.settle();

	h.clock.advance(Duration::from_secs(301));
	h.type_text("heart");
	let request = h.wait(QUIET).expect("cache expired");
	h.answer(&request);
	assert_eq!(h.source.calls(), 2);
}

#[test]
fn stale_response_is_discarded() {
	let mut h = Harness::new();
	h.type_text("heart");
	let stale = h.wait(QUIET).expect("first fetch");

	h.type_text("lotus");
	let fresh = h.wait(QUIET).expect("second fetch");
	assert_ne!(stale.id, fresh.id);

	assert!(h.answer(&fresh));
	assert!(!h.answer(&stale), "late response must be ignored");
	assert_eq!(h.titles(), vec!["WS002 Lotus Sutra"]);
	assert!(h.pipeline.cache().get("heart", h.clock.now()).is_none());
}

#[test]
fn response_arriving_during_new_debounce_is_discarded() {
	let mut h = Harness::new();
	h.type_text("heart");
	let request = h.wait(QUIET).expect("fetch");
	h.type_text("heart s");

	assert!(!h.answer(&request));
	assert_eq!(h.pipeline.state(), &PipelineState::Debouncing);
	assert!(h.pipeline.suggestions().is_empty());
}

#[test]
fn offline_never_fetches() {
	let mut h = Harness::new();
	h.online = false;
	h.type_text("heart");
	assert!(h.wait(QUIET).is_none());

	assert!(h.pipeline.is_offline());
	assert_eq!(h.pipeline.error(), Some(&SuggestionError::Offline));
	assert!(h.pipeline.retry(h.clock.now(), false).is_none());
	assert_eq!(h.source.calls(), 0);
}

#[test]
fn reconnecting_resumes_the_pending_query() {
	let mut h = Harness::new();
	h.online = false;
	h.type_text("heart");
	assert!(h.wait(QUIET).is_none());

	h.online = true;
	let request = h.wait(Duration::ZERO).expect("resume after reconnect");
	assert_eq!(request.term, "heart");
	assert!(!h.pipeline.is_offline());
}

#[test]
fn failure_is_retryable_and_not_cached() {
	let mut h = Harness::new();
	h.type_text("lotus");
	h.source.fail_next(BackendError::Unavailable("timeout".into()));
	h.settle();

	let err = h.pipeline.error().expect("error surfaced").clone();
	assert!(err.is_retryable());
	assert!(!h.pipeline.is_loading());
	assert!(h.pipeline.cache().is_empty());
	assert!(h.wait(QUIET).is_none(), "no automatic refetch");

	let request = h.pipeline.retry(h.clock.now(), true).expect("retry issues fetch");
	assert_eq!(request.term, "lotus");
	h.answer(&request);
	assert_eq!(h.pipeline.error(), None);
	assert_eq!(h.titles(), vec!["WS002 Lotus Sutra"]);
	assert_eq!(h.source.calls(), 2);
}

#[test]
fn failure_keeps_last_good_suggestions() {
	let mut h = Harness::new();
	h.type_text("sutra");
	h.settle();
	let before = h.titles().len();

	h.type_text("sutras");
	h.source.fail_next(BackendError::Request("500".into()));
	h.settle();
	assert!(h.pipeline.error().is_some());
	assert_eq!(h.titles().len(), before);
}

#[test]
fn retry_is_a_no_op_when_nothing_failed() {
	let mut h = Harness::new();
	h.type_text("heart");
	h.settle();
	assert!(h.pipeline.retry(h.clock.now(), true).is_none());
}

#[test]
fn shortening_input_clears_suggestions() {
	let mut h = Harness::new();
	h.type_text("heart");
	h.settle();
	assert!(!h.pipeline.suggestions().is_empty());

	h.type_text("h");
	assert!(h.pipeline.suggestions().is_empty());
	assert_eq!(h.pipeline.deadline(), None);
}
