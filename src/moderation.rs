//! Admin edits to translation metadata.
//!
//! Raw form input is validated locally; nothing reaches the backend until it
//! parses. Every mutating call takes an [`AdminCapability`].

use log::info;

use crate::backend::RecordStore;
use crate::error::{BackendError, ModerationError, ValidationError};
use crate::session::AdminCapability;
use crate::types::{RecordPatch, TranslationRecord};

/// Unvalidated metadata form. `None` leaves a field untouched; an empty
/// Tibetan title or description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataEdit {
	pub title: Option<String>,
	pub tibetan_title: Option<String>,
	pub description: Option<String>,
	pub tags: Option<Vec<String>>,
	pub featured: Option<bool>,
	pub view_count: Option<String>,
}

impl MetadataEdit {
	/// Turn the form into a patch, or say which field is wrong.
	pub fn validate(&self) -> Result<RecordPatch, ValidationError> {
		let title = match &self.title {
			Some(title) if title.trim().is_empty() => return Err(ValidationError::EmptyTitle),
			Some(title) => Some(title.trim().to_string()),
			None => None,
		};
		let view_count = self.view_count.as_deref().map(parse_view_count).transpose()?;

		Ok(RecordPatch {
			title,
			tibetan_title: self.tibetan_title.as_deref().map(optional_text),
			description: self.description.as_deref().map(optional_text),
			tags: self.tags.as_ref().map(|tags| normalize_tags(tags.as_slice())),
			featured: self.featured,
			view_count,
		})
	}
}

fn optional_text(value: &str) -> Option<String> {
	let value = value.trim();
	(!value.is_empty()).then(|| value.to_string())
}

/// Parse a view count typed by a moderator.
pub fn parse_view_count(raw: &str) -> Result<u64, ValidationError> {
	raw.trim()
		.parse::<u64>()
		.map_err(|_| ValidationError::InvalidViewCount {
			value: raw.to_string(),
		})
}

/// Trim tags, drop blanks and keep the first occurrence of duplicates.
#[must_use]
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
	let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
	for tag in tags {
		let tag = tag.as_ref().trim();
		if !tag.is_empty() && !normalized.iter().any(|existing| existing == tag) {
			normalized.push(tag.to_string());
		}
	}
	normalized
}

/// Moderation actions against a record store.
pub struct Moderator<'a> {
	store: &'a dyn RecordStore,
}

impl<'a> Moderator<'a> {
	#[must_use]
	pub fn new(store: &'a dyn RecordStore) -> Self {
		Self { store }
	}

	pub fn update_metadata(
		&self,
		admin: &AdminCapability,
		id: &str,
		edit: &MetadataEdit,
	) -> Result<TranslationRecord, ModerationError> {
		let patch = edit.validate()?;
		if patch.is_empty() {
			return Ok(self.store.get(id)?);
		}
		info!("{} updated metadata of {id}", admin.email());
		Ok(self.store.update(id, &patch)?)
	}

	pub fn set_featured(
		&self,
		admin: &AdminCapability,
		id: &str,
		featured: bool,
	) -> Result<TranslationRecord, ModerationError> {
		let patch = RecordPatch {
			featured: Some(featured),
			..RecordPatch::default()
		};
		info!("{} set featured={featured} on {id}", admin.email());
		Ok(self.store.update(id, &patch)?)
	}

	pub fn add_tag(
		&self,
		admin: &AdminCapability,
		id: &str,
		tag: &str,
	) -> Result<TranslationRecord, ModerationError> {
		let tag = tag.trim();
		if tag.is_empty() {
			return Err(ValidationError::EmptyTag.into());
		}
		let record = self.store.get(id)?;
		if record.tags.iter().any(|existing| existing == tag) {
			return Ok(record);
		}
		let mut tags = record.tags;
		tags.push(tag.to_string());
		info!("{} tagged {id} with '{tag}'", admin.email());
		Ok(self.store.update(id, &tags_patch(tags))?)
	}

	pub fn remove_tag(
		&self,
		admin: &AdminCapability,
		id: &str,
		tag: &str,
	) -> Result<TranslationRecord, ModerationError> {
		let tag = tag.trim();
		let record = self.store.get(id)?;
		if !record.tags.iter().any(|existing| existing == tag) {
			return Ok(record);
		}
		let tags = record.tags.into_iter().filter(|existing| existing != tag).collect();
		info!("{} removed tag '{tag}' from {id}", admin.email());
		Ok(self.store.update(id, &tags_patch(tags))?)
	}

	pub fn set_view_count(
		&self,
		admin: &AdminCapability,
		id: &str,
		raw: &str,
	) -> Result<TranslationRecord, ModerationError> {
		let view_count = parse_view_count(raw)?;
		let patch = RecordPatch {
			view_count: Some(view_count),
			..RecordPatch::default()
		};
		info!("{} set view count of {id} to {view_count}", admin.email());
		Ok(self.store.update(id, &patch)?)
	}

	pub fn delete(&self, admin: &AdminCapability, id: &str) -> Result<(), ModerationError> {
		self.store.delete(id)?;
		info!("{} deleted {id}", admin.email());
		Ok(())
	}
}

fn tags_patch(tags: Vec<String>) -> RecordPatch {
	RecordPatch {
		tags: Some(tags),
		..RecordPatch::default()
	}
}

/// Count one view of a record. Open to every session.
pub fn record_view(store: &dyn RecordStore, id: &str) -> Result<TranslationRecord, BackendError> {
	let record = store.get(id)?;
	let patch = RecordPatch {
		view_count: Some(record.view_count.saturating_add(1)),
		..RecordPatch::default()
	};
	store.update(id, &patch)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::MemoryBackend;
	use crate::error::AuthorizationError;
	use crate::session::{AdminPolicy, Identity, SessionContext};
	use crate::testing::library;

	fn admin() -> AdminCapability {
		let policy = AdminPolicy::new(["editor@example.org"]);
		SessionContext::resolve(Some(Identity::new("u1", "editor@example.org")), &policy)
			.require_admin()
			.unwrap()
	}

	#[test]
	fn view_count_must_be_a_whole_number() {
		assert_eq!(parse_view_count(" 42 "), Ok(42));
		for bad in ["-1", "abc", "", "1.5"] {
			assert_eq!(
				parse_view_count(bad),
				Err(ValidationError::InvalidViewCount { value: bad.into() })
			);
		}
	}

	#[test]
	fn edit_validation_normalizes_fields() {
		let edit = MetadataEdit {
			title: Some("  WS001 Heart Sutra ".into()),
			description: Some("   ".into()),
			tags: Some(vec![" sutra".into(), "".into(), "sutra".into(), "wisdom".into()]),
			view_count: Some("7".into()),
			..MetadataEdit::default()
		};
		let patch = edit.validate().unwrap();
		assert_eq!(patch.title.as_deref(), Some("WS001 Heart Sutra"));
		assert_eq!(patch.description, Some(None));
		assert_eq!(patch.tags, Some(vec!["sutra".to_string(), "wisdom".to_string()]));
		assert_eq!(patch.view_count, Some(7));
		assert_eq!(patch.tibetan_title, None);
	}

	#[test]
	fn invalid_edit_never_reaches_backend() {
		let backend = MemoryBackend::with_records(library());
		let moderator = Moderator::new(&backend);
		let edit = MetadataEdit {
			title: Some("Renamed".into()),
			view_count: Some("many".into()),
			..MetadataEdit::default()
		};
		let err = moderator.update_metadata(&admin(), "1", &edit).unwrap_err();
		assert!(matches!(err, ModerationError::Validation(_)));
		assert_eq!(backend.get("1").unwrap().title, "WS001 Heart Sutra");

		let err = moderator
			.update_metadata(
				&admin(),
				"1",
				&MetadataEdit {
					title: Some(" ".into()),
					..MetadataEdit::default()
				},
			)
			.unwrap_err();
		assert_eq!(err, ModerationError::Validation(ValidationError::EmptyTitle));
	}

	#[test]
	fn tag_moderation() {
		let backend = MemoryBackend::with_records(library());
		let moderator = Moderator::new(&backend);
		let record = moderator.add_tag(&admin(), "2", " mahayana ").unwrap();
		assert_eq!(record.tags, vec!["commentary", "mahayana"]);
		let record = moderator.add_tag(&admin(), "2", "mahayana").unwrap();
		assert_eq!(record.tags.len(), 2);
		let record = moderator.remove_tag(&admin(), "2", "commentary").unwrap();
		assert_eq!(record.tags, vec!["mahayana"]);
		assert_eq!(
			moderator.add_tag(&admin(), "2", "  "),
			Err(ModerationError::Validation(ValidationError::EmptyTag))
		);
	}

	#[test]
	fn featured_views_and_delete() {
		let backend = MemoryBackend::with_records(library());
		let moderator = Moderator::new(&backend);
		assert!(moderator.set_featured(&admin(), "1", true).unwrap().featured);
		assert_eq!(moderator.set_view_count(&admin(), "1", "5").unwrap().view_count, 5);
		moderator.delete(&admin(), "1").unwrap();
		assert_eq!(
			moderator.delete(&admin(), "1"),
			Err(ModerationError::Backend(BackendError::NotFound { id: "1".into() }))
		);
	}

	#[test]
	fn readers_cannot_obtain_a_capability() {
		let session = SessionContext::resolve(
			Some(Identity::new("u2", "reader@example.org")),
			&AdminPolicy::new(["editor@example.org"]),
		);
		let err: ModerationError = session.require_admin().unwrap_err().into();
		assert!(matches!(
			err,
			ModerationError::Authorization(AuthorizationError::NotAdmin { .. })
		));
	}

	#[test]
	fn views_increment_without_capability() {
		let backend = MemoryBackend::with_records(library());
		assert_eq!(record_view(&backend, "3").unwrap().view_count, 11);
		assert_eq!(record_view(&backend, "3").unwrap().view_count, 12);
		assert!(record_view(&backend, "missing").is_err());
	}
}
