use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Error, Result};
use pecha::backend::StorageUrls;
use pecha::search::SearchConfig;
use pecha::session::AdminPolicy;
use serde::Deserialize;

use super::resolved::{ConfigSources, ResolvedConfig, SettingSource};
use super::sources::ENV_PREFIX;
use crate::cli::CliArgs;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
	pub(super) backend: BackendSection,
	pub(super) search: SearchSection,
	pub(super) admin: AdminSection,
	pub(super) storage: StorageSection,
	pub(super) logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct BackendSection {
	pub(super) data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct SearchSection {
	pub(super) debounce_ms: Option<u64>,
	pub(super) min_query_chars: Option<usize>,
	pub(super) cache_ttl_secs: Option<u64>,
	pub(super) suggestion_limit: Option<usize>,
	pub(super) history_capacity: Option<usize>,
	pub(super) history_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminSection {
	pub(super) emails: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct StorageSection {
	pub(super) public_base_url: Option<String>,
	pub(super) bucket: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoggingSection {
	pub(super) level: Option<String>,
}

const DEFAULT_BUCKET: &str = "translations";

impl RawConfig {
	/// Apply CLI overrides on top of the raw configuration values.
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(path) = cli.data_file.clone() {
			self.backend.data_file = Some(path);
		}
		if let Some(level) = cli.log_level.clone() {
			self.logging.level = Some(level);
		}
	}

	/// Convert the raw configuration into a [`ResolvedConfig`], validating and
	/// filling defaults where required.
	pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
		let sources = ConfigSources {
			data_file: detect_source(
				cli.data_file.is_some(),
				self.backend.data_file.is_some(),
				"--data-file",
				"backend.data_file",
			),
			log_level: detect_source(
				cli.log_level.is_some(),
				self.logging.level.is_some(),
				"--log-level",
				"logging.level",
			),
		};

		let defaults = SearchConfig::default();
		let search = &self.search;
		let search_config = SearchConfig {
			debounce: search
				.debounce_ms
				.map_or(defaults.debounce, Duration::from_millis),
			min_query_chars: search.min_query_chars.unwrap_or(defaults.min_query_chars),
			cache_ttl: search
				.cache_ttl_secs
				.map_or(defaults.cache_ttl, Duration::from_secs),
			suggestion_limit: search.suggestion_limit.unwrap_or(defaults.suggestion_limit),
			history_capacity: search.history_capacity.unwrap_or(defaults.history_capacity),
		};

		let history_file = match self.search.history_file {
			Some(path) => Some(path),
			None => pecha::app_dirs::default_history_file().ok(),
		};

		let admin_emails = self.admin.emails.unwrap_or_default();

		let storage = match self.storage.public_base_url.as_deref() {
			Some(base) if !base.trim().is_empty() => {
				let bucket = self.storage.bucket.as_deref().unwrap_or(DEFAULT_BUCKET);
				Some(
					StorageUrls::new(base.trim(), bucket)
						.with_context(|| format!("invalid storage.public_base_url '{base}'"))?,
				)
			}
			_ => None,
		};

		let config = ResolvedConfig {
			data_file: self.backend.data_file,
			search: search_config,
			history_file,
			admin: AdminPolicy::new(&admin_emails),
			admin_emails,
			storage,
			log_level: self.logging.level,
		};

		config.validate(&sources).map_err(Error::new)?;

		Ok(config)
	}
}

/// Environment variable the `config` crate maps onto `key`.
pub(super) fn env_var_for(key: &str) -> String {
	format!("{ENV_PREFIX}__{}", key.replace('.', "__").to_uppercase())
}

pub(super) fn detect_source(
	cli_present: bool,
	value_present: bool,
	cli_flag: &'static str,
	key: &'static str,
) -> Option<SettingSource> {
	if !value_present {
		return None;
	}

	if cli_present {
		return Some(SettingSource::CliFlag(cli_flag));
	}

	Some(origin_of(key))
}

/// Where a value that has no CLI flag came from.
pub(super) fn origin_of(key: &'static str) -> SettingSource {
	let var = env_var_for(key);
	if env::var_os(&var).is_some() {
		SettingSource::Environment(var)
	} else {
		SettingSource::ConfigKey(key)
	}
}

#[cfg(test)]
mod tests;
