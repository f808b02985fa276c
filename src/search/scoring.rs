//! Relevance scoring for suggestion candidates.
//!
//! The total is a fixed-weight linear combination normalised by the sum of
//! the weights:
//!
//! ```text
//! total = (title * 2.0 + tags * 1.5 + views * 0.8 + category * 1.0) / 5.3
//! ```
//!
//! Every factor lies in `[0, 1]`, so the total does too.

use chrono::{DateTime, Utc};

use crate::types::{ScoreBreakdown, TranslationRecord};

pub const TITLE_WEIGHT: f64 = 2.0;
pub const TAG_WEIGHT: f64 = 1.5;
pub const VIEW_WEIGHT: f64 = 0.8;
pub const CATEGORY_WEIGHT: f64 = 1.0;
pub const WEIGHT_SUM: f64 = 5.3;

/// View count at which the popularity factor saturates.
pub const VIEW_SATURATION: f64 = 1000.0;
/// Flat factor for any record with a resolved category.
pub const CATEGORY_PRESENCE: f64 = 0.5;
/// Age over which the informational recency factor decays to zero.
const RECENCY_HORIZON_DAYS: f64 = 365.0;

/// The parts of a candidate the scorer looks at.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
	pub suggested_term: &'a str,
	pub tags: &'a [String],
	pub view_count: u64,
	pub has_category: bool,
	pub featured: bool,
	pub created_at: Option<DateTime<Utc>>,
}

impl<'a> ScoringInput<'a> {
	/// Candidate suggesting the record's own title.
	#[must_use]
	pub fn from_record(record: &'a TranslationRecord) -> Self {
		Self {
			suggested_term: &record.title,
			tags: &record.tags,
			view_count: record.view_count,
			has_category: record.has_category(),
			featured: record.featured,
			created_at: Some(record.created_at),
		}
	}
}

/// 1.0 when the suggested term contains the query, ignoring case.
#[must_use]
pub fn title_match(suggested_term: &str, query: &str) -> f64 {
	if suggested_term.to_lowercase().contains(&query.to_lowercase()) {
		1.0
	} else {
		0.0
	}
}

/// Word/tag containment count normalised by `max(words, tags)`.
///
/// A single tag may contain several query words, so the raw ratio can exceed
/// one; it is capped at 1.0.
#[must_use]
pub fn tag_similarity(tags: &[String], query: &str) -> f64 {
	if tags.is_empty() {
		return 0.0;
	}

	let query = query.to_lowercase();
	let words: Vec<&str> = query.split_whitespace().collect();
	let tags: Vec<String> = tags.iter().map(|tag| tag.to_lowercase()).collect();

	let matches = words
		.iter()
		.map(|word| tags.iter().filter(|tag| tag.contains(word)).count())
		.sum::<usize>();

	let denominator = words.len().max(tags.len());
	(matches as f64 / denominator as f64).min(1.0)
}

/// Saturating linear popularity factor.
#[must_use]
pub fn view_proximity(view_count: u64) -> f64 {
	(view_count as f64 / VIEW_SATURATION).min(1.0)
}

#[must_use]
pub fn category_match(has_category: bool) -> f64 {
	if has_category { CATEGORY_PRESENCE } else { 0.0 }
}

fn recency(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
	let Some(created_at) = created_at else {
		return 0.0;
	};
	let age_days = (now - created_at).num_seconds().max(0) as f64 / 86_400.0;
	(1.0 - age_days / RECENCY_HORIZON_DAYS).clamp(0.0, 1.0)
}

/// Score `candidate` against `query` as of `now`.
#[must_use]
pub fn score(candidate: &ScoringInput<'_>, query: &str, now: DateTime<Utc>) -> ScoreBreakdown {
	let title_match = title_match(candidate.suggested_term, query);
	let tag_match = tag_similarity(candidate.tags, query);
	let view_count = view_proximity(candidate.view_count);
	let category_match = category_match(candidate.has_category);

	let total = (title_match * TITLE_WEIGHT
		+ tag_match * TAG_WEIGHT
		+ view_count * VIEW_WEIGHT
		+ category_match * CATEGORY_WEIGHT)
		/ WEIGHT_SUM;

	ScoreBreakdown {
		total,
		title_match,
		tag_match,
		recency: recency(candidate.created_at, now),
		view_count,
		featured: if candidate.featured { 1.0 } else { 0.0 },
		category_match,
	}
}
