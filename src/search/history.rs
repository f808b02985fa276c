use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::types::HistoryEntry;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;
const HISTORY_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct HistoryPayload {
	version: u32,
	entries: Vec<HistoryEntry>,
}

/// Newest-first log of selected search terms.
///
/// Re-selecting a term moves it to the front instead of duplicating it, and
/// the oldest entry is evicted once `capacity` is exceeded. When backed by a
/// file every mutation is written through; write failures are logged and the
/// in-memory state is kept.
#[derive(Debug)]
pub struct HistoryStore {
	entries: VecDeque<HistoryEntry>,
	capacity: usize,
	path: Option<PathBuf>,
}

impl HistoryStore {
	/// History that lives only as long as the process.
	#[must_use]
	pub fn in_memory(capacity: usize) -> Self {
		Self {
			entries: VecDeque::new(),
			capacity: capacity.max(1),
			path: None,
		}
	}

	/// Open the history persisted at `path`.
	///
	/// A missing file yields an empty history. An unreadable or corrupt file
	/// is logged and treated as empty; it is overwritten by the next change.
	#[must_use]
	pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
		let path = path.into();
		let mut store = Self {
			entries: VecDeque::new(),
			capacity: capacity.max(1),
			path: None,
		};

		match read_entries(&path) {
			Ok(entries) => {
				store.entries = entries.into_iter().take(store.capacity).collect();
			}
			Err(err) => warn!("ignoring search history at {}: {err:#}", path.display()),
		}
		store.path = Some(path);
		store
	}

	#[must_use]
	pub fn entries(&self) -> Vec<HistoryEntry> {
		self.entries.iter().cloned().collect()
	}

	#[must_use]
	pub fn terms(&self) -> Vec<&str> {
		self.entries.iter().map(|entry| entry.term.as_str()).collect()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	#[must_use]
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Record `term` as selected now. Blank terms are ignored.
	pub fn add(&mut self, term: &str) -> bool {
		self.add_at(term, Utc::now())
	}

	pub fn add_at(&mut self, term: &str, timestamp: DateTime<Utc>) -> bool {
		let term = term.trim();
		if term.is_empty() {
			return false;
		}

		self.entries.retain(|entry| entry.term != term);
		self.entries.push_front(HistoryEntry {
			term: term.to_string(),
			timestamp,
		});
		self.entries.truncate(self.capacity);
		self.persist();
		true
	}

	/// Remove a single term. Returns whether it was present.
	pub fn remove(&mut self, term: &str) -> bool {
		let term = term.trim();
		let before = self.entries.len();
		self.entries.retain(|entry| entry.term != term);
		let removed = self.entries.len() != before;
		if removed {
			self.persist();
		}
		removed
	}

	pub fn clear(&mut self) {
		self.entries.clear();
		self.persist();
	}

	fn persist(&self) {
		let Some(path) = &self.path else {
			return;
		};
		match write_entries(path, &self.entries) {
			Ok(()) => info!("saved {} history entries to {}", self.entries.len(), path.display()),
			Err(err) => warn!("failed to save search history: {err:#}"),
		}
	}
}

fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => {
			return Err(err).with_context(|| format!("failed to read {}", path.display()));
		}
	};
	let payload: HistoryPayload =
		serde_json::from_slice(&bytes).context("history file is not valid JSON")?;
	anyhow::ensure!(
		payload.version == HISTORY_VERSION,
		"unsupported history version {}",
		payload.version
	);
	Ok(payload.entries)
}

fn write_entries(path: &Path, entries: &VecDeque<HistoryEntry>) -> Result<()> {
	if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
		fs::create_dir_all(dir)
			.with_context(|| format!("failed to create history directory: {}", dir.display()))?;
	}

	let payload = HistoryPayload {
		version: HISTORY_VERSION,
		entries: entries.iter().cloned().collect(),
	};
	let data = serde_json::to_vec(&payload).context("failed to serialize history")?;
	let tmp_path = path.with_extension("tmp");
	{
		let mut file = fs::File::create(&tmp_path)
			.with_context(|| format!("failed to create history file: {}", tmp_path.display()))?;
		file.write_all(&data)
			.with_context(|| format!("failed to write history file: {}", tmp_path.display()))?;
		file.sync_all().ok();
	}

	fs::rename(&tmp_path, path).with_context(|| {
		format!(
			"failed to move history file from {} to {}",
			tmp_path.display(),
			path.display()
		)
	})
}
