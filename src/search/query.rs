//! Translate filter state into backend queries.

use std::time::{Duration, Instant};

use log::debug;
use serde::Serialize;

use super::filters::FilterState;
use crate::backend::{Filter, FilterValue, RecordField, RecordQuery, RecordSource, escape_like};
use crate::error::BackendError;
use crate::types::TranslationRecord;

/// Fields the free-text term is matched against.
pub const TEXT_FIELDS: [RecordField; 3] = [
	RecordField::Title,
	RecordField::TibetanTitle,
	RecordField::Description,
];

/// Substring ilike pattern for `term` with wildcards escaped.
#[must_use]
pub fn substring_pattern(term: &str) -> String {
	format!("%{}%", escape_like(term))
}

/// Listing query for the given filter state.
#[must_use]
pub fn build_listing_query(filters: &FilterState) -> RecordQuery {
	let mut query = RecordQuery::new();

	let term = filters.term.trim();
	if !term.is_empty() {
		let pattern = substring_pattern(term);
		query = query.filter(Filter::AnyILike(
			TEXT_FIELDS
				.iter()
				.map(|field| (*field, pattern.clone()))
				.collect(),
		));
	}

	if !filters.tags.is_empty() {
		query = query.filter(Filter::ContainsAll {
			field: RecordField::Tags,
			values: filters.tags.clone(),
		});
	}

	if let Some(category) = filters.category.as_deref().filter(|id| !id.is_empty()) {
		query = query.filter(Filter::Eq {
			field: RecordField::CategoryId,
			value: FilterValue::Text(category.to_string()),
		});
	}

	if let Some((start, end)) = filters.date_range.bounds() {
		query = query
			.filter(Filter::Gte {
				field: RecordField::CreatedAt,
				value: start,
			})
			.filter(Filter::Lte {
				field: RecordField::CreatedAt,
				value: end,
			});
	}

	query.order_by(
		filters.sort.field.as_str(),
		filters.sort.direction.is_ascending(),
	)
}

/// Title lookup issued by the suggestion pipeline.
#[must_use]
pub fn build_suggestion_query(term: &str, limit: usize) -> RecordQuery {
	RecordQuery::new()
		.filter(Filter::ILike {
			field: RecordField::Title,
			pattern: substring_pattern(term.trim()),
		})
		.limit(limit)
}

/// Result count and wall-clock time of one listing query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SearchStats {
	pub count: usize,
	pub time_seconds: f64,
}

impl SearchStats {
	#[must_use]
	pub fn new(count: usize, elapsed: Duration) -> Self {
		Self {
			count,
			time_seconds: elapsed.as_secs_f64(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingOutcome {
	pub records: Vec<TranslationRecord>,
	pub stats: SearchStats,
}

/// Run one listing query and time it.
pub fn execute_listing(
	source: &dyn RecordSource,
	filters: &FilterState,
) -> Result<ListingOutcome, BackendError> {
	let query = build_listing_query(filters);
	let started = Instant::now();
	let records = source.query(&query)?;
	let stats = SearchStats::new(records.len(), started.elapsed());
	debug!(
		"listing query returned {} records in {:.3}s",
		stats.count, stats.time_seconds
	);
	Ok(ListingOutcome { records, stats })
}
