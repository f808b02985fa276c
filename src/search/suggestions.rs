use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::config::SearchConfig;
use super::connectivity::Connectivity;
use super::history::HistoryStore;
use super::pipeline::{FetchRequest, PipelineState, SuggestionPipeline};
use super::worker::{self, FetchCommand, FetchResult};
use crate::backend::RecordSource;
use crate::clock::{Clock, SystemClock};
use crate::error::{BackendError, SuggestionError};
use crate::types::{HistoryEntry, SearchSuggestion};

/// Everything a search box needs: live suggestions, history, and the
/// loading/offline/error flags, backed by a fetch thread.
///
/// Drivers feed keystrokes through [`input`](Self::input) and call
/// [`pump`](Self::pump) from their event loop (or [`settle`](Self::settle)
/// when they can block).
pub struct SuggestionSession<C: Clock = SystemClock> {
	pipeline: SuggestionPipeline,
	history: HistoryStore,
	connectivity: Arc<dyn Connectivity>,
	clock: C,
	commands: Sender<FetchCommand>,
	results: Receiver<FetchResult>,
	latest: Arc<AtomicU64>,
}

impl SuggestionSession<SystemClock> {
	#[must_use]
	pub fn new(
		source: Arc<dyn RecordSource>,
		connectivity: Arc<dyn Connectivity>,
		history: HistoryStore,
		config: SearchConfig,
	) -> Self {
		Self::with_clock(source, connectivity, history, config, SystemClock)
	}
}

impl<C: Clock> SuggestionSession<C> {
	#[must_use]
	pub fn with_clock(
		source: Arc<dyn RecordSource>,
		connectivity: Arc<dyn Connectivity>,
		history: HistoryStore,
		config: SearchConfig,
		clock: C,
	) -> Self {
		let (commands, results, latest) = worker::spawn(source);
		Self {
			pipeline: SuggestionPipeline::new(config),
			history,
			connectivity,
			clock,
			commands,
			results,
			latest,
		}
	}

	#[must_use]
	pub fn suggestions(&self) -> &[SearchSuggestion] {
		self.pipeline.suggestions()
	}

	#[must_use]
	pub fn history(&self) -> Vec<HistoryEntry> {
		self.history.entries()
	}

	#[must_use]
	pub fn is_loading(&self) -> bool {
		self.pipeline.is_loading()
	}

	#[must_use]
	pub fn error(&self) -> Option<&SuggestionError> {
		self.pipeline.error()
	}

	#[must_use]
	pub fn is_offline(&self) -> bool {
		!self.connectivity.is_online()
	}

	#[must_use]
	pub fn query(&self) -> &str {
		self.pipeline.input()
	}

	/// Record a selected term. Returns `false` for blank terms.
	pub fn add_to_history(&mut self, term: &str) -> bool {
		self.history.add(term)
	}

	pub fn clear_history(&mut self) {
		self.history.clear();
	}

	pub fn clear_history_item(&mut self, term: &str) -> bool {
		self.history.remove(term)
	}

	/// Feed the current contents of the search box.
	pub fn input(&mut self, term: &str) {
		self.pipeline.set_query(term, self.clock.now());
		self.latest.store(0, Ordering::Release);
	}

	/// Re-run the failed lookup for the current input.
	pub fn retry(&mut self) {
		let online = self.connectivity.is_online();
		if let Some(request) = self.pipeline.retry(self.clock.now(), online) {
			self.dispatch(request);
		}
	}

	/// Apply finished fetches and start any fetch that has come due.
	/// Never blocks. Returns `true` when visible state may have changed.
	pub fn pump(&mut self) -> bool {
		let mut changed = false;
		loop {
			match self.results.try_recv() {
				Ok(result) => changed |= self.apply(result),
				Err(TryRecvError::Empty) => break,
				Err(TryRecvError::Disconnected) => {
					changed |= self.worker_gone();
					break;
				}
			}
		}

		let before = self.pipeline.state().clone();
		let online = self.connectivity.is_online();
		if let Some(request) = self.pipeline.poll(self.clock.now(), online) {
			self.dispatch(request);
		}
		changed || self.pipeline.state() != &before
	}

	/// Block until the current input is resolved or `timeout` elapses.
	///
	/// Returns `true` when the session is no longer loading.
	pub fn settle(&mut self, timeout: Duration) -> bool {
		let give_up = Instant::now() + timeout;
		loop {
			self.pump();
			let remaining = give_up.saturating_duration_since(Instant::now());
			if !self.is_loading() {
				return true;
			}
			if remaining.is_zero() {
				return false;
			}

			if matches!(self.pipeline.state(), PipelineState::Fetching { .. }) {
				match self.results.recv_timeout(remaining) {
					Ok(result) => {
						self.apply(result);
					}
					Err(RecvTimeoutError::Timeout) => {}
					Err(RecvTimeoutError::Disconnected) => {
						self.worker_gone();
					}
				}
			} else if let Some(deadline) = self.pipeline.deadline() {
				let wait = deadline.saturating_duration_since(self.clock.now());
				thread::sleep(wait.min(remaining).max(Duration::from_millis(1)));
			}
		}
	}

	fn apply(&mut self, result: FetchResult) -> bool {
		self.pipeline.complete(result.id, result.result, self.clock.now(), self.clock.utc())
	}

	fn dispatch(&mut self, request: FetchRequest) {
		let id = request.id;
		self.latest.store(id, Ordering::Release);
		debug!("dispatching suggestion fetch {id}");
		if self.commands.send(FetchCommand::Fetch(request)).is_err() {
			self.pipeline.complete(id, Err(worker_stopped()), self.clock.now(), self.clock.utc());
		}
	}

	fn worker_gone(&mut self) -> bool {
		let PipelineState::Fetching { request } = *self.pipeline.state() else {
			return false;
		};
		warn!("suggestion worker stopped while request {request} was in flight");
		self.pipeline.complete(request, Err(worker_stopped()), self.clock.now(), self.clock.utc())
	}
}

impl<C: Clock> Drop for SuggestionSession<C> {
	fn drop(&mut self) {
		let _ = self.commands.send(FetchCommand::Shutdown);
	}
}

fn worker_stopped() -> BackendError {
	BackendError::Unavailable("suggestion worker stopped".to_string())
}
