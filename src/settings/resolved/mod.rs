use std::path::PathBuf;

use pecha::backend::StorageUrls;
use pecha::search::SearchConfig;
use pecha::session::AdminPolicy;

mod errors;
mod sources;
mod summary;
mod validation;

pub(crate) use errors::SettingsError;
pub(crate) use sources::{ConfigSources, SettingSource};

/// Application-ready configuration derived from user input, config files and
/// defaults.
#[derive(Debug)]
pub(crate) struct ResolvedConfig {
	pub(crate) data_file: Option<PathBuf>,
	pub(crate) search: SearchConfig,
	/// `None` keeps history in memory only.
	pub(crate) history_file: Option<PathBuf>,
	pub(crate) admin: AdminPolicy,
	pub(crate) admin_emails: Vec<String>,
	pub(crate) storage: Option<StorageUrls>,
	pub(crate) log_level: Option<String>,
}

impl ResolvedConfig {
	pub(super) fn validate(&self, sources: &ConfigSources) -> Result<(), SettingsError> {
		validation::validate(self, sources)
	}

	/// Print a human readable summary of the effective configuration.
	pub(crate) fn print_summary(&self) {
		summary::print_summary(self);
	}
}
