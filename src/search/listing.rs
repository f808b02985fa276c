//! Debounced record listing driven by [`FilterState`].

use std::time::Instant;

use log::{debug, warn};

use super::config::SearchConfig;
use super::debounce::Debouncer;
use super::filters::{DateRange, FilterState, SortSpec};
use super::grouping::{GroupedTranslation, group};
use super::query::{ListingOutcome, SearchStats, execute_listing};
use crate::backend::RecordSource;
use crate::clock::{Clock, SystemClock};
use crate::error::BackendError;

/// A listing query the driver should run and report back.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
	pub id: u64,
	pub filters: FilterState,
}

/// Filter state plus the grouped results of the last applied query.
///
/// Every filter change re-arms the debounce and revokes the request in
/// flight, so only the response for the latest snapshot is applied.
pub struct ListingSearch<C: Clock = SystemClock> {
	clock: C,
	debouncer: Debouncer,
	filters: FilterState,
	next_request: u64,
	authoritative: Option<u64>,
	results: Vec<GroupedTranslation>,
	stats: SearchStats,
	error: Option<BackendError>,
}

impl ListingSearch<SystemClock> {
	#[must_use]
	pub fn new(config: &SearchConfig) -> Self {
		Self::with_clock(config, SystemClock)
	}
}

impl<C: Clock> ListingSearch<C> {
	/// Start with default filters and an immediate first query.
	#[must_use]
	pub fn with_clock(config: &SearchConfig, clock: C) -> Self {
		Self::restore(FilterState::default(), config, clock)
	}

	/// Restore filters from a shared query string; the first query runs
	/// without waiting out the debounce.
	#[must_use]
	pub fn from_query_string(query: &str, config: &SearchConfig, clock: C) -> Self {
		Self::restore(FilterState::from_query_string(query), config, clock)
	}

	fn restore(filters: FilterState, config: &SearchConfig, clock: C) -> Self {
		let mut debouncer = Debouncer::new(config.debounce);
		debouncer.trigger(clock.now());
		Self {
			clock,
			debouncer,
			filters,
			next_request: 0,
			authoritative: None,
			results: Vec::new(),
			stats: SearchStats::default(),
			error: None,
		}
	}

	#[must_use]
	pub fn filters(&self) -> &FilterState {
		&self.filters
	}

	#[must_use]
	pub fn results(&self) -> &[GroupedTranslation] {
		&self.results
	}

	#[must_use]
	pub fn stats(&self) -> SearchStats {
		self.stats
	}

	#[must_use]
	pub fn error(&self) -> Option<&BackendError> {
		self.error.as_ref()
	}

	/// True while a change is debouncing or a query is in flight.
	#[must_use]
	pub fn is_searching(&self) -> bool {
		self.debouncer.is_pending() || self.authoritative.is_some()
	}

	#[must_use]
	pub fn deadline(&self) -> Option<Instant> {
		self.debouncer.deadline()
	}

	/// Current filters as a bookmarkable query string.
	#[must_use]
	pub fn share_query(&self) -> String {
		self.filters.to_query_string()
	}

	/// Apply an arbitrary change to the filters.
	pub fn update(&mut self, change: impl FnOnce(&mut FilterState)) {
		let before = self.filters.clone();
		change(&mut self.filters);
		if self.filters == before {
			return;
		}
		if let Some(revoked) = self.authoritative.take() {
			debug!("filters changed; listing response {revoked} will be discarded");
		}
		self.debouncer.touch(self.clock.now());
	}

	pub fn set_term(&mut self, term: &str) {
		self.update(|filters| filters.term = term.to_string());
	}

	pub fn toggle_tag(&mut self, tag: &str) {
		self.update(|filters| filters.toggle_tag(tag));
	}

	pub fn set_category(&mut self, category: Option<&str>) {
		self.update(|filters| filters.category = category.map(str::to_string));
	}

	pub fn set_date_range(&mut self, range: DateRange) {
		self.update(|filters| filters.date_range = range);
	}

	pub fn set_sort(&mut self, sort: SortSpec) {
		self.update(|filters| filters.sort = sort);
	}

	/// Returns a request when the debounce has elapsed.
	pub fn poll(&mut self) -> Option<ListingRequest> {
		if !self.debouncer.fire(self.clock.now()) {
			return None;
		}
		self.next_request += 1;
		let id = self.next_request;
		self.authoritative = Some(id);
		Some(ListingRequest {
			id,
			filters: self.filters.clone(),
		})
	}

	/// Apply the outcome of request `id`. Returns `false` for stale responses.
	pub fn complete(&mut self, id: u64, outcome: Result<ListingOutcome, BackendError>) -> bool {
		if self.authoritative != Some(id) {
			debug!("discarding stale listing response {id}");
			return false;
		}
		self.authoritative = None;

		match outcome {
			Ok(outcome) => {
				self.results = group(outcome.records);
				self.stats = outcome.stats;
				self.error = None;
			}
			Err(err) => {
				warn!("listing query failed: {err}");
				self.error = Some(err);
			}
		}
		true
	}

	/// Run a due query against `source` on the calling thread.
	pub fn run_due(&mut self, source: &dyn RecordSource) -> bool {
		let Some(request) = self.poll() else {
			return false;
		};
		let outcome = execute_listing(source, &request.filters);
		self.complete(request.id, outcome)
	}

	/// Skip the debounce and query right away.
	pub fn search_now(&mut self, source: &dyn RecordSource) -> bool {
		self.debouncer.trigger(self.clock.now());
		self.run_due(source)
	}
}
