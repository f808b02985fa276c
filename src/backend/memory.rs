use std::cmp::Ordering;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use pecha_stream::{ChangeFeed, SubscriptionId};
use serde::{Deserialize, Serialize};

use super::pattern::ilike;
use super::{
	CategorySource, ChangeSource, Filter, FilterValue, OrderBy, RecordChange, RecordChangeHandler,
	RecordField, RecordQuery, RecordSource, RecordStore,
};
use crate::error::BackendError;
use crate::types::{Category, NewRecord, RecordPatch, TranslationRecord};

/// On-disk shape of the dataset served by [`MemoryBackend`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
	#[serde(default)]
	pub categories: Vec<Category>,
	#[serde(default)]
	pub records: Vec<TranslationRecord>,
}

/// In-process backend evaluating [`RecordQuery`] over a [`Dataset`].
///
/// Every mutation publishes a [`RecordChange`] under the record id.
pub struct MemoryBackend {
	data: RwLock<Dataset>,
	changes: ChangeFeed<String, RecordChange>,
	next_id: AtomicU64,
}

impl MemoryBackend {
	#[must_use]
	pub fn new(dataset: Dataset) -> Self {
		let next_id = dataset
			.records
			.iter()
			.filter_map(|record| allocated_number(&record.id))
			.max()
			.map_or(1, |highest| highest.saturating_add(1));
		Self {
			data: RwLock::new(dataset),
			changes: ChangeFeed::new(),
			next_id: AtomicU64::new(next_id),
		}
	}

	#[must_use]
	pub fn with_records(records: Vec<TranslationRecord>) -> Self {
		Self::new(Dataset {
			categories: Vec::new(),
			records,
		})
	}

	/// Live change subscriptions across all records.
	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.changes.subscriber_count()
	}

	/// Load a JSON dataset from disk.
	pub fn load(path: &Path) -> Result<Self> {
		let bytes = fs::read(path)
			.with_context(|| format!("failed to read dataset: {}", path.display()))?;
		let dataset: Dataset = serde_json::from_slice(&bytes)
			.with_context(|| format!("failed to parse dataset: {}", path.display()))?;
		debug!(
			"loaded {} records and {} categories from {}",
			dataset.records.len(),
			dataset.categories.len(),
			path.display()
		);
		Ok(Self::new(dataset))
	}

	/// Write the current dataset back to disk atomically.
	pub fn save(&self, path: &Path) -> Result<()> {
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			fs::create_dir_all(dir)
				.with_context(|| format!("failed to create dataset directory: {}", dir.display()))?;
		}

		let data = serde_json::to_vec_pretty(&*self.read())
			.context("failed to serialize dataset")?;
		let tmp_path = path.with_extension("tmp");
		{
			let mut file = fs::File::create(&tmp_path)
				.with_context(|| format!("failed to create dataset file: {}", tmp_path.display()))?;
			file.write_all(&data)
				.with_context(|| format!("failed to write dataset file: {}", tmp_path.display()))?;
			file.sync_all().ok();
		}

		fs::rename(&tmp_path, path).with_context(|| {
			format!(
				"failed to move dataset file from {} to {}",
				tmp_path.display(),
				path.display()
			)
		})
	}

	/// Snapshot of the full dataset.
	#[must_use]
	pub fn snapshot(&self) -> Dataset {
		self.read().clone()
	}

	fn read(&self) -> RwLockReadGuard<'_, Dataset> {
		self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn write(&self) -> RwLockWriteGuard<'_, Dataset> {
		self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Next `rec-NNNNNN` id not held by any record in `records`.
	fn allocate_id(&self, records: &[TranslationRecord]) -> String {
		loop {
			let id = format!(
				"{ID_PREFIX}{:06}",
				self.next_id.fetch_add(1, AtomicOrdering::Relaxed)
			);
			if !records.iter().any(|record| record.id == id) {
				return id;
			}
		}
	}
}

const ID_PREFIX: &str = "rec-";

/// Numeric suffix of an id handed out by [`MemoryBackend`].
fn allocated_number(id: &str) -> Option<u64> {
	id.strip_prefix(ID_PREFIX)?.parse().ok()
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new(Dataset::default())
	}
}

impl RecordSource for MemoryBackend {
	fn query(&self, query: &RecordQuery) -> Result<Vec<TranslationRecord>, BackendError> {
		let data = self.read();
		let mut rows: Vec<TranslationRecord> = data
			.records
			.iter()
			.filter(|record| query.filters.iter().all(|filter| matches_filter(record, filter)))
			.cloned()
			.collect();
		drop(data);

		if let Some(order) = &query.order {
			sort_records(&mut rows, order);
		}
		if let Some(limit) = query.limit {
			rows.truncate(limit);
		}
		Ok(rows)
	}
}

impl RecordStore for MemoryBackend {
	fn get(&self, id: &str) -> Result<TranslationRecord, BackendError> {
		self.read()
			.records
			.iter()
			.find(|record| record.id == id)
			.cloned()
			.ok_or_else(|| BackendError::NotFound { id: id.to_string() })
	}

	fn insert(&self, record: NewRecord) -> Result<TranslationRecord, BackendError> {
		let now = Utc::now();
		let mut data = self.write();
		let created = TranslationRecord {
			id: self.allocate_id(&data.records),
			title: record.title,
			tibetan_title: record.tibetan_title,
			description: record.description,
			category_id: record.category_id,
			tags: record.tags,
			view_count: 0,
			featured: false,
			created_at: now,
			updated_at: now,
			source: record.source,
			metadata: record.metadata,
			source_file_path: record.source_file_path,
			translation_file_path: record.translation_file_path,
		};
		data.records.push(created.clone());
		drop(data);
		self.changes
			.publish(created.id.clone(), RecordChange::Inserted(created.clone()));
		Ok(created)
	}

	fn update(&self, id: &str, patch: &RecordPatch) -> Result<TranslationRecord, BackendError> {
		let updated = {
			let mut data = self.write();
			let record = data
				.records
				.iter_mut()
				.find(|record| record.id == id)
				.ok_or_else(|| BackendError::NotFound { id: id.to_string() })?;
			if patch.apply_to(record) {
				record.updated_at = Utc::now();
			}
			record.clone()
		};
		self.changes
			.publish(updated.id.clone(), RecordChange::Updated(updated.clone()));
		Ok(updated)
	}

	fn delete(&self, id: &str) -> Result<(), BackendError> {
		{
			let mut data = self.write();
			let before = data.records.len();
			data.records.retain(|record| record.id != id);
			if data.records.len() == before {
				return Err(BackendError::NotFound { id: id.to_string() });
			}
		}
		self.changes
			.publish(id.to_string(), RecordChange::Deleted { id: id.to_string() });
		Ok(())
	}
}

impl CategorySource for MemoryBackend {
	fn categories(&self) -> Result<Vec<Category>, BackendError> {
		let data = self.read();
		Ok(data
			.categories
			.iter()
			.map(|category| {
				let count = data
					.records
					.iter()
					.filter(|record| record.category_id.as_deref() == Some(category.id.as_str()))
					.count();
				Category {
					translation_count: count as u64,
					..category.clone()
				}
			})
			.collect())
	}
}

impl ChangeSource for MemoryBackend {
	fn subscribe(&self, record_id: &str, handler: RecordChangeHandler) -> SubscriptionId {
		self.changes.subscribe(record_id.to_string(), handler)
	}

	fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.changes.unsubscribe(id)
	}
}

fn text_field(record: &TranslationRecord, field: RecordField) -> Option<String> {
	match field {
		RecordField::Id => Some(record.id.clone()),
		RecordField::Title => Some(record.title.clone()),
		RecordField::TibetanTitle => record.tibetan_title.clone(),
		RecordField::Description => record.description.clone(),
		RecordField::CategoryId => record.category_id.clone(),
		RecordField::ViewCount => Some(record.view_count.to_string()),
		RecordField::Featured => Some(record.featured.to_string()),
		RecordField::CreatedAt => Some(record.created_at.to_rfc3339()),
		RecordField::UpdatedAt => Some(record.updated_at.to_rfc3339()),
		RecordField::Tags => None,
	}
}

fn time_field(record: &TranslationRecord, field: RecordField) -> Option<DateTime<Utc>> {
	match field {
		RecordField::CreatedAt => Some(record.created_at),
		RecordField::UpdatedAt => Some(record.updated_at),
		_ => None,
	}
}

fn matches_filter(record: &TranslationRecord, filter: &Filter) -> bool {
	match filter {
		Filter::Eq {
			field: RecordField::Featured,
			value: FilterValue::Bool(expected),
		} => record.featured == *expected,
		Filter::Eq {
			field,
			value: FilterValue::Text(expected),
		} => text_field(record, *field).is_some_and(|value| value == *expected),
		Filter::Eq { .. } => false,
		Filter::ILike { field, pattern } => {
			text_field(record, *field).is_some_and(|value| ilike(pattern, &value))
		}
		Filter::AnyILike(clauses) => clauses.iter().any(|(field, pattern)| {
			text_field(record, *field).is_some_and(|value| ilike(pattern, &value))
		}),
		Filter::ContainsAll {
			field: RecordField::Tags,
			values,
		} => values.iter().all(|value| record.tags.contains(value)),
		Filter::ContainsAll { .. } => false,
		Filter::Gte { field, value } => time_field(record, *field).is_some_and(|at| at >= *value),
		Filter::Lte { field, value } => time_field(record, *field).is_some_and(|at| at <= *value),
	}
}

fn sort_records(rows: &mut [TranslationRecord], order: &OrderBy) {
	let compare: fn(&TranslationRecord, &TranslationRecord) -> Ordering = match order.field.as_str() {
		"created_at" => |a, b| a.created_at.cmp(&b.created_at),
		"updated_at" => |a, b| a.updated_at.cmp(&b.updated_at),
		"view_count" => |a, b| a.view_count.cmp(&b.view_count),
		"featured" => |a, b| a.featured.cmp(&b.featured),
		"title" => |a, b| a.title.cmp(&b.title),
		other => {
			debug!("ignoring unknown sort field '{other}'");
			return;
		}
	};

	if order.ascending {
		rows.sort_by(compare);
	} else {
		rows.sort_by(|a, b| compare(b, a));
	}
}
