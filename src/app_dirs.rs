//! Resolve configuration, cache, and data directories for `pecha`.
//!
//! Environment overrides win; otherwise the platform locations from the
//! `directories` crate are used.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "pecha";
const APPLICATION: &str = "pecha";

const CONFIG_DIR_ENV: &str = "PECHA_CONFIG_DIR";
const DATA_DIR_ENV: &str = "PECHA_DATA_DIR";
const CACHE_DIR_ENV: &str = "PECHA_CACHE_DIR";

const HISTORY_FILE: &str = "history.json";

fn project_dirs() -> Result<ProjectDirs> {
	ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
		.ok_or_else(|| anyhow!("unable to determine project directories for pecha"))
}

/// Resolve an override directory from an environment variable.
///
/// An empty value counts as unset.
fn dir_from_env(name: &str) -> Option<PathBuf> {
	let value = env::var_os(name)?;
	if value.is_empty() {
		None
	} else {
		Some(PathBuf::from(value))
	}
}

/// Directory holding `config.toml`.
pub fn get_config_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(CONFIG_DIR_ENV) {
		return Ok(dir);
	}

	Ok(project_dirs()?.config_local_dir().to_path_buf())
}

/// Directory for persisted client state such as search history.
pub fn get_data_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(DATA_DIR_ENV) {
		return Ok(dir);
	}

	Ok(project_dirs()?.data_local_dir().to_path_buf())
}

/// Directory for disposable files.
pub fn get_cache_dir() -> Result<PathBuf> {
	if let Some(dir) = dir_from_env(CACHE_DIR_ENV) {
		return Ok(dir);
	}

	Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// Default location of the persisted search history.
pub fn default_history_file() -> Result<PathBuf> {
	Ok(get_data_dir()?.join(HISTORY_FILE))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn history_file_lives_in_data_dir() {
		let (Ok(data), Ok(history)) = (get_data_dir(), default_history_file()) else {
			return;
		};
		assert_eq!(history.parent(), Some(data.as_path()));
		assert!(history.ends_with(HISTORY_FILE));
	}
}
