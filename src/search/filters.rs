//! Filter state for the record listing and its shareable query-string form.
//!
//! The query string uses `q`, `sort`, `tags` (comma separated), `category`,
//! `start` and `end` (both `YYYY-MM-DD`). Sort is written as the field name
//! for descending order and `field:asc` for ascending order.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::warn;
use serde::Serialize;
use url::form_urlencoded;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sortable column. Unknown names pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SortField {
	#[default]
	CreatedAt,
	UpdatedAt,
	ViewCount,
	Featured,
	Title,
	Other(String),
}

impl SortField {
	#[must_use]
	pub fn parse(name: &str) -> Self {
		match name {
			"created_at" => Self::CreatedAt,
			"updated_at" => Self::UpdatedAt,
			"view_count" => Self::ViewCount,
			"featured" => Self::Featured,
			"title" => Self::Title,
			other => Self::Other(other.to_string()),
		}
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			Self::CreatedAt => "created_at",
			Self::UpdatedAt => "updated_at",
			Self::ViewCount => "view_count",
			Self::Featured => "featured",
			Self::Title => "title",
			Self::Other(name) => name,
		}
	}
}

impl fmt::Display for SortField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}

impl SortDirection {
	/// `"asc"` is ascending; anything else is descending.
	#[must_use]
	pub fn parse(value: &str) -> Self {
		if value == "asc" { Self::Asc } else { Self::Desc }
	}

	#[must_use]
	pub fn is_ascending(self) -> bool {
		self == Self::Asc
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SortSpec {
	pub field: SortField,
	pub direction: SortDirection,
}

impl SortSpec {
	#[must_use]
	pub fn new(field: SortField, direction: SortDirection) -> Self {
		Self { field, direction }
	}

	/// `field` for descending, `field:asc` for ascending. A field name that
	/// itself contains `:` always carries an explicit direction suffix.
	fn encode(&self) -> String {
		let field = self.field.as_str();
		match self.direction {
			SortDirection::Asc => format!("{field}:asc"),
			SortDirection::Desc if field.contains(':') => format!("{field}:desc"),
			SortDirection::Desc => field.to_string(),
		}
	}

	/// Only a trailing `:asc` or `:desc` is read as a direction.
	fn decode(value: &str) -> Self {
		match value.rsplit_once(':') {
			Some((field, direction @ ("asc" | "desc"))) => {
				Self::new(SortField::parse(field), SortDirection::parse(direction))
			}
			_ => Self::new(SortField::parse(value), SortDirection::Desc),
		}
	}
}

/// Inclusive creation-date window. Only applied when both ends are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
	pub start: Option<NaiveDate>,
	pub end: Option<NaiveDate>,
}

impl DateRange {
	#[must_use]
	pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
		Self { start, end }
	}

	/// First and last instant covered, or `None` unless both dates are set.
	#[must_use]
	pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
		let start = self.start?.and_hms_opt(0, 0, 0)?;
		let end = self.end?.and_hms_nano_opt(23, 59, 59, 999_999_999)?;
		Some((Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end)))
	}
}

/// Everything that shapes one listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterState {
	pub term: String,
	pub tags: Vec<String>,
	pub category: Option<String>,
	pub date_range: DateRange,
	pub sort: SortSpec,
}

impl FilterState {
	#[must_use]
	pub fn with_term(mut self, term: impl Into<String>) -> Self {
		self.term = term.into();
		self
	}

	#[must_use]
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.toggle_tag(tag);
		self
	}

	#[must_use]
	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	#[must_use]
	pub fn with_sort(mut self, field: SortField, direction: SortDirection) -> Self {
		self.sort = SortSpec::new(field, direction);
		self
	}

	#[must_use]
	pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
		self.date_range = DateRange::new(start, end);
		self
	}

	/// Select `tag` if absent, deselect it otherwise.
	pub fn toggle_tag(&mut self, tag: impl Into<String>) {
		let tag = tag.into();
		if let Some(position) = self.tags.iter().position(|existing| *existing == tag) {
			self.tags.remove(position);
		} else if !tag.is_empty() {
			self.tags.push(tag);
		}
	}

	/// Encode as a URL query string (without the leading `?`).
	#[must_use]
	pub fn to_query_string(&self) -> String {
		let mut query = form_urlencoded::Serializer::new(String::new());
		let term = self.term.trim();
		if !term.is_empty() {
			query.append_pair("q", term);
		}
		if self.sort != SortSpec::default() {
			query.append_pair("sort", &self.sort.encode());
		}
		if !self.tags.is_empty() {
			query.append_pair("tags", &self.tags.join(","));
		}
		if let Some(category) = &self.category {
			query.append_pair("category", category);
		}
		if let Some(start) = self.date_range.start {
			query.append_pair("start", &start.format(DATE_FORMAT).to_string());
		}
		if let Some(end) = self.date_range.end {
			query.append_pair("end", &end.format(DATE_FORMAT).to_string());
		}
		query.finish()
	}

	/// Restore state from a query string. Unknown keys and malformed dates
	/// are skipped.
	#[must_use]
	pub fn from_query_string(query: &str) -> Self {
		let query = query.trim().trim_start_matches('?');
		let mut state = Self::default();
		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			match key.as_ref() {
				"q" => state.term = value.into_owned(),
				"sort" if !value.is_empty() => state.sort = SortSpec::decode(&value),
				"tags" => {
					for tag in value.split(',').map(str::trim).filter(|tag| !tag.is_empty()) {
						if !state.tags.iter().any(|existing| existing == tag) {
							state.tags.push(tag.to_string());
						}
					}
				}
				"category" if !value.is_empty() => state.category = Some(value.into_owned()),
				"start" => state.date_range.start = parse_date("start", &value),
				"end" => state.date_range.end = parse_date("end", &value),
				_ => {}
			}
		}
		state
	}
}

fn parse_date(key: &str, value: &str) -> Option<NaiveDate> {
	if value.is_empty() {
		return None;
	}
	match NaiveDate::parse_from_str(value, DATE_FORMAT) {
		Ok(date) => Some(date),
		Err(err) => {
			warn!("ignoring {key}={value}: {err}");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn direction_defaults_to_descending() {
		assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
		assert_eq!(SortDirection::parse("ASC"), SortDirection::Desc);
		assert_eq!(SortDirection::parse("desc"), SortDirection::Desc);
		assert_eq!(SortDirection::parse(""), SortDirection::Desc);
	}

	#[test]
	fn unknown_sort_fields_pass_through() {
		assert_eq!(SortField::parse("view_count"), SortField::ViewCount);
		assert_eq!(SortField::parse("popularity").as_str(), "popularity");
	}

	#[test]
	fn date_range_requires_both_ends() {
		assert!(DateRange::new(Some(date(2024, 1, 1)), None).bounds().is_none());
		assert!(DateRange::new(None, Some(date(2024, 1, 1))).bounds().is_none());

		let (start, end) = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)))
			.bounds()
			.unwrap();
		assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
		assert_eq!(end.date_naive(), date(2024, 1, 31));
		assert!(end > Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap());
	}

	#[test]
	fn default_state_encodes_to_empty_string() {
		assert_eq!(FilterState::default().to_query_string(), "");
	}

	#[test]
	fn encodes_every_parameter() {
		let state = FilterState::default()
			.with_term("heart sutra")
			.with_tag("sutra")
			.with_tag("wisdom")
			.with_category("cat-1")
			.with_sort(SortField::ViewCount, SortDirection::Asc)
			.with_dates(Some(date(2024, 1, 1)), Some(date(2024, 2, 1)));

		assert_eq!(
			state.to_query_string(),
			"q=heart+sutra&sort=view_count%3Aasc&tags=sutra%2Cwisdom&category=cat-1&start=2024-01-01&end=2024-02-01"
		);
	}

	#[test]
	fn restores_shared_state() {
		let state = FilterState::default()
			.with_term("100% & more")
			.with_tag("sutra")
			.with_category("cat 1")
			.with_sort(SortField::Featured, SortDirection::Desc)
			.with_dates(Some(date(2023, 12, 24)), Some(date(2024, 1, 2)));

		let restored = FilterState::from_query_string(&format!("?{}", state.to_query_string()));
		assert_eq!(restored, state);
	}

	#[test]
	fn sort_fields_containing_colons_survive_sharing() {
		for direction in [SortDirection::Asc, SortDirection::Desc] {
			let state =
				FilterState::default().with_sort(SortField::parse("metadata:lang"), direction);
			let restored = FilterState::from_query_string(&state.to_query_string());
			assert_eq!(restored.sort, state.sort);
		}

		let restored = FilterState::from_query_string("sort=metadata%3Alang");
		assert_eq!(restored.sort.field.as_str(), "metadata:lang");
		assert_eq!(restored.sort.direction, SortDirection::Desc);
	}

	#[test]
	fn lenient_parsing() {
		let state = FilterState::from_query_string("q=lotus&tags=a,,b,a&start=yesterday&end=2024-01-01&x=1");
		assert_eq!(state.term, "lotus");
		assert_eq!(state.tags, vec!["a", "b"]);
		assert_eq!(state.date_range.start, None);
		assert_eq!(state.date_range.end, Some(date(2024, 1, 1)));
		assert_eq!(state.sort, SortSpec::default());
	}

	#[test]
	fn toggle_tag_adds_and_removes() {
		let mut state = FilterState::default();
		state.toggle_tag("sutra");
		state.toggle_tag("tantra");
		state.toggle_tag("sutra");
		assert_eq!(state.tags, vec!["tantra"]);
	}
}
