use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

/// Reports whether the backend is reachable.
pub trait Connectivity: Send + Sync {
	fn is_online(&self) -> bool;
}

/// Shared reachability flag. Clones observe the same state, so whatever
/// watches the network can flip it while pipelines read it.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
	online: Arc<AtomicBool>,
}

impl ConnectivityMonitor {
	#[must_use]
	pub fn new(online: bool) -> Self {
		Self {
			online: Arc::new(AtomicBool::new(online)),
		}
	}

	/// Update reachability. Returns `true` when the state changed.
	pub fn set_online(&self, online: bool) -> bool {
		let previous = self.online.swap(online, Ordering::AcqRel);
		if previous != online {
			info!("connectivity changed: {}", if online { "online" } else { "offline" });
		}
		previous != online
	}
}

impl Default for ConnectivityMonitor {
	fn default() -> Self {
		Self::new(true)
	}
}

impl Connectivity for ConnectivityMonitor {
	fn is_online(&self) -> bool {
		self.online.load(Ordering::Acquire)
	}
}
