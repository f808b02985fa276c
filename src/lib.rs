//! Search, suggestion and moderation core for a library of translated texts.
//!
//! The hosted backend is reached only through the traits in [`backend`];
//! [`backend::MemoryBackend`] implements all of them in-process. Everything a
//! search page needs lives in [`search`], while [`session`] and
//! [`moderation`] gate and perform admin edits.

pub mod app_dirs;
pub mod backend;
pub mod clock;
pub mod error;
pub mod live;
pub mod logging;
pub mod moderation;
pub mod search;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use backend::{MemoryBackend, RecordQuery, RecordSource, RecordStore, StorageUrls};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{
	AuthorizationError, BackendError, ModerationError, SuggestionError, ValidationError,
};
pub use live::ViewCountWatcher;
pub use moderation::{MetadataEdit, Moderator, record_view};
pub use search::{
	ConnectivityMonitor, FilterState, GroupedTranslation, HistoryStore, ListingSearch,
	SearchConfig, SuggestionSession,
};
pub use session::{AdminCapability, AdminPolicy, Identity, Role, SessionContext};
pub use types::{Category, HistoryEntry, SearchSuggestion, TranslationRecord};
