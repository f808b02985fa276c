//! Fixtures and backend doubles shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use crate::backend::{MemoryBackend, RecordQuery, RecordSource};
use crate::error::BackendError;
use crate::types::TranslationRecord;

pub(crate) fn day(day: u32) -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap()
}

pub(crate) fn library() -> Vec<TranslationRecord> {
	vec![
		TranslationRecord::new("1", "WS001 Heart Sutra", day(1))
			.with_tags(["sutra", "wisdom"])
			.with_views(1200)
			.with_category("sutra"),
		TranslationRecord::new("2", "WS001 Commentary", day(2))
			.with_tags(["commentary"])
			.with_views(50),
		TranslationRecord::new("3", "WS002 Lotus Sutra", day(3))
			.with_tags(["sutra"])
			.with_views(10)
			.with_category("sutra")
			.featured(true),
		TranslationRecord::new("4", "WS003 Heap of Jewels", day(4))
			.with_description("A Mahayana heart collection")
			.with_views(400),
	]
}

/// Wraps a source and counts how many queries reach it.
pub(crate) struct CountingSource<S = MemoryBackend> {
	inner: S,
	calls: AtomicUsize,
	fail_next: Mutex<Option<BackendError>>,
}

impl CountingSource<MemoryBackend> {
	pub(crate) fn library() -> Self {
		Self::new(MemoryBackend::with_records(library()))
	}
}

impl<S: RecordSource> CountingSource<S> {
	pub(crate) fn new(inner: S) -> Self {
		Self {
			inner,
			calls: AtomicUsize::new(0),
			fail_next: Mutex::new(None),
		}
	}

	pub(crate) fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Make the next query fail with `err`.
	pub(crate) fn fail_next(&self, err: BackendError) {
		*self.fail_next.lock().unwrap() = Some(err);
	}
}

impl<S: RecordSource> RecordSource for CountingSource<S> {
	fn query(&self, query: &RecordQuery) -> Result<Vec<TranslationRecord>, BackendError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.fail_next.lock().unwrap().take() {
			return Err(err);
		}
		self.inner.query(query)
	}
}
