use std::time::Duration;

use super::super::raw::origin_of;
use super::{ConfigSources, ResolvedConfig, SettingsError};

pub(super) fn validate(config: &ResolvedConfig, sources: &ConfigSources) -> Result<(), SettingsError> {
	if let Some(path) = &config.data_file
		&& path.is_dir()
	{
		return Err(SettingsError::invalid(
			"backend.data_file",
			path.display().to_string(),
			sources.source_for_data_file(),
			"must be a JSON file, not a directory",
		));
	}

	if let Some(level) = &config.log_level
		&& level.trim().is_empty()
	{
		return Err(SettingsError::invalid(
			"logging.level",
			level.clone(),
			sources.source_for_log_level(),
			"must not be empty",
		));
	}

	let search = &config.search;
	if search.min_query_chars == 0 {
		return Err(SettingsError::invalid(
			"search.min_query_chars",
			"0",
			origin_of("search.min_query_chars"),
			"must be at least 1",
		));
	}
	if search.cache_ttl == Duration::ZERO {
		return Err(SettingsError::invalid(
			"search.cache_ttl_secs",
			"0",
			origin_of("search.cache_ttl_secs"),
			"must be greater than zero",
		));
	}
	if search.suggestion_limit == 0 {
		return Err(SettingsError::invalid(
			"search.suggestion_limit",
			"0",
			origin_of("search.suggestion_limit"),
			"must be greater than zero",
		));
	}
	if search.history_capacity == 0 {
		return Err(SettingsError::invalid(
			"search.history_capacity",
			"0",
			origin_of("search.history_capacity"),
			"must be greater than zero",
		));
	}

	if let Some(email) = config.admin_emails.iter().find(|email| !looks_like_email(email)) {
		return Err(SettingsError::invalid(
			"admin.emails",
			email.clone(),
			origin_of("admin.emails"),
			"is not an email address",
		));
	}

	Ok(())
}

fn looks_like_email(value: &str) -> bool {
	match value.trim().split_once('@') {
		Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use pecha::search::SearchConfig;
	use pecha::session::AdminPolicy;

	use super::super::SettingSource;
	use super::*;

	fn config() -> ResolvedConfig {
		ResolvedConfig {
			data_file: None,
			search: SearchConfig::default(),
			history_file: None,
			admin: AdminPolicy::default(),
			admin_emails: Vec::new(),
			storage: None,
			log_level: None,
		}
	}

	#[test]
	fn defaults_are_valid() {
		assert!(validate(&config(), &ConfigSources::default()).is_ok());
	}

	#[test]
	fn validation_rejects_zero_ttl() {
		let mut config = config();
		config.search.cache_ttl = Duration::ZERO;
		let err = validate(&config, &ConfigSources::default()).unwrap_err();
		assert_eq!(err.key, "search.cache_ttl_secs");
		assert!(err.to_string().contains("value: 0"));
	}

	#[test]
	fn validation_rejects_directory_data_file() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = config();
		config.data_file = Some(PathBuf::from(dir.path()));
		let sources = ConfigSources {
			data_file: Some(SettingSource::CliFlag("--data-file")),
			..ConfigSources::default()
		};

		let err = validate(&config, &sources).unwrap_err();
		assert_eq!(err.key, "backend.data_file");
		assert!(err.to_string().contains("CLI flag"));
	}

	#[test]
	fn validation_rejects_malformed_admin_email() {
		let mut config = config();
		config.admin_emails = vec!["editor@example.org".into(), "nobody".into()];
		let err = validate(&config, &ConfigSources::default()).unwrap_err();
		assert_eq!(err.key, "admin.emails");
		assert!(err.to_string().contains("value: nobody"));
	}

	#[test]
	fn email_shape() {
		assert!(looks_like_email(" editor@example.org "));
		assert!(!looks_like_email("@example.org"));
		assert!(!looks_like_email("editor@"));
		assert!(!looks_like_email("a@b@c"));
	}
}
