//! Interfaces to the hosted backend that owns records, categories and
//! documents, plus an in-process implementation of all of them.
//!
//! Queries are described declaratively with [`RecordQuery`] so any transport
//! (a REST client, an SDK, the bundled [`MemoryBackend`]) can evaluate them.

mod memory;
mod pattern;
mod storage;

use std::fmt;

use chrono::{DateTime, Utc};
use pecha_stream::{ChangeEnvelope, SubscriptionId};

use crate::error::BackendError;
use crate::types::{Category, NewRecord, RecordPatch, TranslationRecord};

pub use memory::{Dataset, MemoryBackend};
pub use pattern::{escape_like, ilike};
pub use storage::StorageUrls;

/// Columns a filter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
	Id,
	Title,
	TibetanTitle,
	Description,
	CategoryId,
	Tags,
	CreatedAt,
	UpdatedAt,
	Featured,
	ViewCount,
}

impl RecordField {
	/// Column name as the backend spells it.
	#[must_use]
	pub fn column(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::Title => "title",
			Self::TibetanTitle => "tibetan_title",
			Self::Description => "description",
			Self::CategoryId => "category_id",
			Self::Tags => "tags",
			Self::CreatedAt => "created_at",
			Self::UpdatedAt => "updated_at",
			Self::Featured => "featured",
			Self::ViewCount => "view_count",
		}
	}
}

impl fmt::Display for RecordField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.column())
	}
}

/// Right-hand side of an equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
	Text(String),
	Bool(bool),
}

/// A single predicate. All filters of a query must hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
	Eq { field: RecordField, value: FilterValue },
	/// Case-insensitive pattern match using `%`/`_` wildcards.
	ILike { field: RecordField, pattern: String },
	/// Logical OR of ilike clauses.
	AnyILike(Vec<(RecordField, String)>),
	/// Array column contains every listed value verbatim.
	ContainsAll { field: RecordField, values: Vec<String> },
	Gte { field: RecordField, value: DateTime<Utc> },
	Lte { field: RecordField, value: DateTime<Utc> },
}

/// Sort instruction. The field name is passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
	pub field: String,
	pub ascending: bool,
}

/// Declarative record query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
	pub filters: Vec<Filter>,
	pub order: Option<OrderBy>,
	pub limit: Option<usize>,
}

impl RecordQuery {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn filter(mut self, filter: Filter) -> Self {
		self.filters.push(filter);
		self
	}

	#[must_use]
	pub fn order_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
		self.order = Some(OrderBy {
			field: field.into(),
			ascending,
		});
		self
	}

	#[must_use]
	pub fn limit(mut self, limit: usize) -> Self {
		self.limit = Some(limit);
		self
	}
}

/// Change published for a record, keyed by record id.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
	Inserted(TranslationRecord),
	Updated(TranslationRecord),
	Deleted { id: String },
}

/// Envelope delivered to [`ChangeSource`] subscribers.
pub type RecordChangeEnvelope = ChangeEnvelope<String, RecordChange>;

/// Callback invoked with each change.
pub type RecordChangeHandler = Box<dyn Fn(&RecordChangeEnvelope) + Send + Sync>;

/// Read side of the record table.
pub trait RecordSource: Send + Sync {
	fn query(&self, query: &RecordQuery) -> Result<Vec<TranslationRecord>, BackendError>;
}

/// Write side of the record table.
pub trait RecordStore: Send + Sync {
	fn get(&self, id: &str) -> Result<TranslationRecord, BackendError>;
	fn insert(&self, record: NewRecord) -> Result<TranslationRecord, BackendError>;
	fn update(&self, id: &str, patch: &RecordPatch) -> Result<TranslationRecord, BackendError>;
	fn delete(&self, id: &str) -> Result<(), BackendError>;
}

/// Category listing with server-computed translation counts.
pub trait CategorySource: Send + Sync {
	fn categories(&self) -> Result<Vec<Category>, BackendError>;
}

/// Realtime change notifications, keyed by record id.
pub trait ChangeSource: Send + Sync {
	fn subscribe(&self, record_id: &str, handler: RecordChangeHandler) -> SubscriptionId;
	fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
