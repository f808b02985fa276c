use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a suggestion relates to the typed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
	Correction,
	Related,
}

/// Relevance of a record for a query, with the factors that produced it.
///
/// Only `title_match`, `tag_match`, `view_count` and `category_match`
/// contribute to `total`; `recency` and `featured` are informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
	pub total: f64,
	pub title_match: f64,
	pub tag_match: f64,
	pub recency: f64,
	pub view_count: f64,
	pub featured: f64,
	pub category_match: f64,
}

/// A scored candidate shown under the search box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSuggestion {
	pub original_term: String,
	pub suggested_term: String,
	pub kind: SuggestionKind,
	pub score: ScoreBreakdown,
	pub record_id: String,
	pub category_id: Option<String>,
	pub view_count: u64,
}

/// A previously selected search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
	pub term: String,
	pub timestamp: DateTime<Utc>,
}
