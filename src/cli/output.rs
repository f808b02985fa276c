use std::fmt::Write;

use anyhow::Result;
use pecha::types::TranslationRecord;

use crate::workflow::Outcome;

/// Print a plain-text representation of a command outcome.
pub(crate) fn print_plain(outcome: &Outcome) {
	print!("{}", format_plain(outcome));
}

pub(crate) fn format_plain(outcome: &Outcome) -> String {
	let mut out = String::new();
	match outcome {
		Outcome::Listing {
			query,
			groups,
			stats,
			error,
		} => {
			if let Some(error) = error {
				let _ = writeln!(out, "error: {error}");
			}
			for group in groups {
				let code = if group.code.is_empty() { "(untitled)" } else { &group.code };
				let _ = writeln!(out, "{code}");
				for record in &group.records {
					let _ = writeln!(out, "  {}", record_line(record));
				}
			}
			let _ = writeln!(
				out,
				"{} result{} in {:.3}s",
				stats.count,
				if stats.count == 1 { "" } else { "s" },
				stats.time_seconds
			);
			if !query.is_empty() {
				let _ = writeln!(out, "share: ?{query}");
			}
		}
		Outcome::Suggestions {
			term,
			suggestions,
			offline,
			error,
			selected,
		} => {
			if *offline {
				let _ = writeln!(out, "offline: suggestions unavailable");
			} else if let Some(error) = error {
				let _ = writeln!(out, "error: {error}");
			}
			if suggestions.is_empty() && error.is_none() {
				let _ = writeln!(out, "No suggestions for '{term}'");
			}
			for (position, suggestion) in suggestions.iter().enumerate() {
				let _ = writeln!(
					out,
					"{:>2}. {}  ({:.3})",
					position + 1,
					suggestion.suggested_term,
					suggestion.score.total
				);
			}
			if let Some(selected) = selected {
				let _ = writeln!(out, "Remembered '{selected}'");
			}
		}
		Outcome::History { entries } => {
			if entries.is_empty() {
				let _ = writeln!(out, "History is empty");
			}
			for entry in entries {
				let _ = writeln!(
					out,
					"{}  {}",
					entry.timestamp.format("%Y-%m-%d %H:%M"),
					entry.term
				);
			}
		}
		Outcome::Categories { categories } => {
			for category in categories {
				let _ = writeln!(
					out,
					"{}  {} ({})",
					category.id, category.title, category.translation_count
				);
			}
		}
		Outcome::Record { record } => {
			let _ = writeln!(out, "Updated {}", record_line(record));
		}
		Outcome::Deleted { id } => {
			let _ = writeln!(out, "Deleted {id}");
		}
		Outcome::Viewed {
			record,
			live_view_count,
			source_url,
			translation_url,
		} => {
			let _ = writeln!(out, "{}", record_line(record));
			let _ = writeln!(out, "views: {live_view_count}");
			if let Some(url) = source_url {
				let _ = writeln!(out, "source: {url}");
			}
			if let Some(url) = translation_url {
				let _ = writeln!(out, "translation: {url}");
			}
		}
	}
	out
}

fn record_line(record: &TranslationRecord) -> String {
	let mut line = format!("[{}] {}", record.id, record.title);
	if let Some(tibetan) = &record.tibetan_title {
		let _ = write!(line, " / {tibetan}");
	}
	let _ = write!(line, "  ({} views", record.view_count);
	if record.featured {
		line.push_str(", featured");
	}
	line.push(')');
	for tag in &record.tags {
		let _ = write!(line, " #{tag}");
	}
	line
}

/// Format the outcome as a JSON string.
pub(crate) fn format_outcome_json(outcome: &Outcome) -> Result<String> {
	Ok(serde_json::to_string_pretty(outcome)?)
}

/// Print the JSON representation of the outcome.
pub(crate) fn print_json(outcome: &Outcome) -> Result<()> {
	println!("{}", format_outcome_json(outcome)?);
	Ok(())
}
