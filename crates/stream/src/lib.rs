//! Keyed change notifications for delivering backend updates to consumers.
//!
//! A [`ChangeFeed`] fans published payloads out to every subscriber
//! registered for the matching key. Subscribers are plain callbacks, so the
//! producer stays independent of whatever transport delivered the change in
//! the first place (a realtime socket, a polling loop, or an in-process
//! store).
//!
//! Handlers run on the publishing thread after the feed has released its
//! internal lock, which means a handler may subscribe or unsubscribe without
//! deadlocking.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use pecha_stream::ChangeFeed;
//!
//! let feed: ChangeFeed<&str, u64> = ChangeFeed::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let id = feed.subscribe("views", move |change| sink.lock().unwrap().push(change.payload));
//!
//! assert_eq!(feed.publish("views", 42), 1);
//! assert_eq!(feed.publish("titles", 7), 0);
//! assert!(feed.unsubscribe(id));
//! assert_eq!(*seen.lock().unwrap(), vec![42]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

type ChangeHandler<K, P> = Arc<dyn Fn(&ChangeEnvelope<K, P>) + Send + Sync>;

/// Message delivered to subscribers whenever a keyed value changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEnvelope<K, P> {
	/// Monotonic sequence number assigned by the feed at publish time.
	pub sequence: u64,
	/// Key the change was published under.
	pub key: K,
	/// New state of the value.
	pub payload: P,
}

/// Handle returned by [`ChangeFeed::subscribe`] used to cancel a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
	/// Raw identifier value.
	#[must_use]
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SubscriptionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sub#{}", self.0)
	}
}

struct Subscriber<K, P> {
	id: SubscriptionId,
	key: K,
	handler: ChangeHandler<K, P>,
}

struct FeedState<K, P> {
	next_subscription: u64,
	sequence: u64,
	subscribers: Vec<Subscriber<K, P>>,
}

/// Fan-out hub mapping keys to change callbacks.
pub struct ChangeFeed<K, P> {
	state: Mutex<FeedState<K, P>>,
}

impl<K, P> Default for ChangeFeed<K, P> {
	fn default() -> Self {
		Self {
			state: Mutex::new(FeedState {
				next_subscription: 0,
				sequence: 0,
				subscribers: Vec::new(),
			}),
		}
	}
}

impl<K, P> fmt::Debug for ChangeFeed<K, P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChangeFeed")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

impl<K, P> ChangeFeed<K, P> {
	/// Create an empty feed.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of live subscriptions across all keys.
	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.lock().subscribers.len()
	}

	/// Remove a subscription. Returns `false` when the id was unknown.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut state = self.lock();
		let before = state.subscribers.len();
		state.subscribers.retain(|subscriber| subscriber.id != id);
		state.subscribers.len() != before
	}

	fn lock(&self) -> MutexGuard<'_, FeedState<K, P>> {
		// Handlers never run under the lock, so a poisoned state is still intact.
		self.state
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

impl<K: PartialEq + Clone, P> ChangeFeed<K, P> {
	/// Register `handler` for changes published under `key`.
	pub fn subscribe(
		&self,
		key: K,
		handler: impl Fn(&ChangeEnvelope<K, P>) + Send + Sync + 'static,
	) -> SubscriptionId {
		let mut state = self.lock();
		state.next_subscription += 1;
		let id = SubscriptionId(state.next_subscription);
		state.subscribers.push(Subscriber {
			id,
			key,
			handler: Arc::new(handler),
		});
		id
	}

	/// Deliver `payload` to every subscriber of `key`.
	///
	/// Returns the number of handlers invoked.
	pub fn publish(&self, key: K, payload: P) -> usize {
		let (envelope, handlers) = {
			let mut state = self.lock();
			state.sequence += 1;
			let handlers: Vec<ChangeHandler<K, P>> = state
				.subscribers
				.iter()
				.filter(|subscriber| subscriber.key == key)
				.map(|subscriber| Arc::clone(&subscriber.handler))
				.collect();
			let envelope = ChangeEnvelope {
				sequence: state.sequence,
				key,
				payload,
			};
			(envelope, handlers)
		};

		for handler in &handlers {
			handler(&envelope);
		}
		handlers.len()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[test]
	fn publish_only_reaches_matching_key() {
		let feed: ChangeFeed<String, u32> = ChangeFeed::new();
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&hits);
		feed.subscribe("a".to_string(), move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		});

		assert_eq!(feed.publish("b".to_string(), 1), 0);
		assert_eq!(feed.publish("a".to_string(), 2), 1);
		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn unsubscribe_stops_delivery() {
		let feed: ChangeFeed<&str, u32> = ChangeFeed::new();
		let id = feed.subscribe("k", |_| {});
		assert_eq!(feed.subscriber_count(), 1);
		assert!(feed.unsubscribe(id));
		assert!(!feed.unsubscribe(id));
		assert_eq!(feed.publish("k", 1), 0);
	}

	#[test]
	fn sequence_numbers_increase_per_publish() {
		let feed: ChangeFeed<&str, &str> = ChangeFeed::new();
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&seen);
		feed.subscribe("k", move |change| sink.lock().unwrap().push(change.clone()));
		feed.publish("k", "first");
		feed.publish("other", "skipped");
		feed.publish("k", "second");

		let seen = seen.lock().unwrap();
		let (first, second) = (&seen[0], &seen[1]);
		assert_eq!(first.payload, "first");
		assert_eq!(second.payload, "second");
		assert!(second.sequence > first.sequence);
		assert_eq!(second.sequence, 3);
	}

	#[test]
	fn handler_may_unsubscribe_itself() {
		let feed: Arc<ChangeFeed<&str, u32>> = Arc::new(ChangeFeed::new());
		let slot = Arc::new(Mutex::new(None::<SubscriptionId>));
		let handler_feed = Arc::clone(&feed);
		let handler_slot = Arc::clone(&slot);
		let id = feed.subscribe("k", move |_| {
			if let Some(id) = handler_slot.lock().unwrap().take() {
				handler_feed.unsubscribe(id);
			}
		});
		*slot.lock().unwrap() = Some(id);

		assert_eq!(feed.publish("k", 1), 1);
		assert_eq!(feed.subscriber_count(), 0);
	}
}
