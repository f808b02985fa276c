//! Live view counts pushed through [`ChangeSource`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use log::debug;
use pecha_stream::SubscriptionId;

use crate::backend::{ChangeSource, RecordChange};
use crate::types::TranslationRecord;

/// Tracks the view count of one record while it is on screen.
/// Dropping the watcher cancels the subscription.
pub struct ViewCountWatcher {
	source: Arc<dyn ChangeSource>,
	subscription: SubscriptionId,
	record_id: String,
	count: Arc<AtomicU64>,
	deleted: Arc<AtomicBool>,
}

impl ViewCountWatcher {
	#[must_use]
	pub fn watch(source: Arc<dyn ChangeSource>, record: &TranslationRecord) -> Self {
		let count = Arc::new(AtomicU64::new(record.view_count));
		let deleted = Arc::new(AtomicBool::new(false));
		let (handler_count, handler_deleted) = (Arc::clone(&count), Arc::clone(&deleted));

		let subscription = source.subscribe(
			&record.id,
			Box::new(move |change| match &change.payload {
				RecordChange::Inserted(record) | RecordChange::Updated(record) => {
					handler_count.store(record.view_count, Ordering::Release);
				}
				RecordChange::Deleted { .. } => handler_deleted.store(true, Ordering::Release),
			}),
		);
		debug!("watching view count of {} ({subscription})", record.id);

		Self {
			source,
			subscription,
			record_id: record.id.clone(),
			count,
			deleted,
		}
	}

	#[must_use]
	pub fn record_id(&self) -> &str {
		&self.record_id
	}

	#[must_use]
	pub fn view_count(&self) -> u64 {
		self.count.load(Ordering::Acquire)
	}

	/// Whether the record has been deleted since watching began.
	#[must_use]
	pub fn is_deleted(&self) -> bool {
		self.deleted.load(Ordering::Acquire)
	}
}

impl Drop for ViewCountWatcher {
	fn drop(&mut self) {
		self.source.unsubscribe(self.subscription);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::{MemoryBackend, RecordStore};
	use crate::moderation::record_view;
	use crate::testing::library;

	#[test]
	fn follows_views_until_dropped() {
		let backend = Arc::new(MemoryBackend::with_records(library()));
		let record = backend.get("3").unwrap();
		let watcher = ViewCountWatcher::watch(Arc::clone(&backend) as Arc<dyn ChangeSource>, &record);
		assert_eq!(watcher.view_count(), 10);

		record_view(backend.as_ref(), "3").unwrap();
		record_view(backend.as_ref(), "3").unwrap();
		record_view(backend.as_ref(), "1").unwrap();
		assert_eq!(watcher.view_count(), 12);
		assert_eq!(backend.subscriber_count(), 1);

		drop(watcher);
		assert_eq!(backend.subscriber_count(), 0);
	}

	#[test]
	fn notices_deletion() {
		let backend = Arc::new(MemoryBackend::with_records(library()));
		let record = backend.get("2").unwrap();
		let watcher = ViewCountWatcher::watch(Arc::clone(&backend) as Arc<dyn ChangeSource>, &record);
		backend.delete("2").unwrap();
		assert!(watcher.is_deleted());
	}
}
