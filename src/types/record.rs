use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author/url a translation was sourced from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribution {
	#[serde(default)]
	pub author: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
}

/// A source/translation document pair plus its metadata, as stored by the
/// backend. Clients only ever hold transient copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub tibetan_title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub category_id: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub view_count: u64,
	#[serde(default)]
	pub featured: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub source: Option<SourceAttribution>,
	/// Free-form key/value data, including the original file names.
	#[serde(default)]
	pub metadata: Map<String, Value>,
	#[serde(default)]
	pub source_file_path: Option<String>,
	#[serde(default)]
	pub translation_file_path: Option<String>,
}

impl TranslationRecord {
	/// Minimal record with both timestamps set to `created_at`.
	#[must_use]
	pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
		Self {
			id: id.into(),
			title: title.into(),
			tibetan_title: None,
			description: None,
			category_id: None,
			tags: Vec::new(),
			view_count: 0,
			featured: false,
			created_at,
			updated_at: created_at,
			source: None,
			metadata: Map::new(),
			source_file_path: None,
			translation_file_path: None,
		}
	}

	#[must_use]
	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn with_views(mut self, views: u64) -> Self {
		self.view_count = views;
		self
	}

	#[must_use]
	pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
		self.category_id = Some(category_id.into());
		self
	}

	#[must_use]
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	#[must_use]
	pub fn with_tibetan_title(mut self, title: impl Into<String>) -> Self {
		self.tibetan_title = Some(title.into());
		self
	}

	#[must_use]
	pub fn featured(mut self, featured: bool) -> Self {
		self.featured = featured;
		self
	}

	/// Grouping key: everything before the first whitespace character of the
	/// title, or the whole title when it has none.
	#[must_use]
	pub fn code(&self) -> &str {
		title_code(&self.title)
	}

	/// Whether the record resolves to a category.
	#[must_use]
	pub fn has_category(&self) -> bool {
		self.category_id.is_some()
	}
}

pub(crate) fn title_code(title: &str) -> &str {
	match title.find(char::is_whitespace) {
		Some(end) => &title[..end],
		None => title,
	}
}

/// Fields accepted when creating a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
	pub title: String,
	#[serde(default)]
	pub tibetan_title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub category_id: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub source: Option<SourceAttribution>,
	#[serde(default)]
	pub metadata: Map<String, Value>,
	#[serde(default)]
	pub source_file_path: Option<String>,
	#[serde(default)]
	pub translation_file_path: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
///
/// Optional record fields use a nested option so they can be cleared:
/// `Some(None)` removes the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
	pub title: Option<String>,
	pub tibetan_title: Option<Option<String>>,
	pub description: Option<Option<String>>,
	pub tags: Option<Vec<String>>,
	pub featured: Option<bool>,
	pub view_count: Option<u64>,
}

impl RecordPatch {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Apply the patch in place. Returns whether anything changed.
	pub fn apply_to(&self, record: &mut TranslationRecord) -> bool {
		let before = record.clone();
		if let Some(title) = &self.title {
			record.title.clone_from(title);
		}
		if let Some(tibetan_title) = &self.tibetan_title {
			record.tibetan_title.clone_from(tibetan_title);
		}
		if let Some(description) = &self.description {
			record.description.clone_from(description);
		}
		if let Some(tags) = &self.tags {
			record.tags.clone_from(tags);
		}
		if let Some(featured) = self.featured {
			record.featured = featured;
		}
		if let Some(view_count) = self.view_count {
			record.view_count = view_count;
		}
		*record != before
	}
}

/// A category of translations. `translation_count` is always computed by the
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub tibetan_title: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub translation_count: u64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;

	fn at() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
	}

	#[test]
	fn code_is_leading_token() {
		let record = TranslationRecord::new("1", "WS001 Heart Sutra", at());
		assert_eq!(record.code(), "WS001");
	}

	#[test]
	fn code_without_whitespace_is_whole_title() {
		assert_eq!(title_code("Bodhicaryavatara"), "Bodhicaryavatara");
		assert_eq!(title_code(""), "");
		assert_eq!(title_code("WS9\tTabbed"), "WS9");
		assert_eq!(title_code(" leading"), "");
	}

	#[test]
	fn patch_reports_changes() {
		let mut record = TranslationRecord::new("1", "Old", at());
		let patch = RecordPatch {
			title: Some("New".into()),
			description: Some(Some("About".into())),
			..RecordPatch::default()
		};
		assert!(patch.apply_to(&mut record));
		assert_eq!(record.title, "New");
		assert_eq!(record.description.as_deref(), Some("About"));
		assert!(!patch.apply_to(&mut record));

		let clear = RecordPatch {
			description: Some(None),
			..RecordPatch::default()
		};
		assert!(clear.apply_to(&mut record));
		assert_eq!(record.description, None);
	}

	#[test]
	fn record_deserializes_with_defaults() {
		let json = r#"{
			"id": "r1",
			"title": "WS001 Heart Sutra",
			"created_at": "2024-03-01T12:00:00Z",
			"updated_at": "2024-03-01T12:00:00Z",
			"metadata": {"source_filename": "heart.pdf"}
		}"#;
		let record: TranslationRecord = serde_json::from_str(json).expect("parse");
		assert!(record.tags.is_empty());
		assert_eq!(record.view_count, 0);
		assert!(!record.featured);
		assert_eq!(record.metadata["source_filename"], "heart.pdf");
	}
}
