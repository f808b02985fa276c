use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::{RawConfig, env_var_for};
use crate::cli::CliArgs;
use crate::settings::sources::build_config;

#[test]
fn cli_overrides_take_precedence() {
	let cli = CliArgs::parse_from([
		"pecha",
		"--data-file",
		"/tmp/library.json",
		"--log-level",
		"debug",
		"categories",
	]);

	let mut config = RawConfig::default();
	config.backend.data_file = Some(PathBuf::from("/srv/other.json"));
	config.apply_cli_overrides(&cli);

	assert_eq!(config.backend.data_file, Some(PathBuf::from("/tmp/library.json")));
	assert_eq!(config.logging.level.as_deref(), Some("debug"));
}

#[test]
fn config_file_sections_resolve() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("pecha.toml");
	fs::write(
		&path,
		r#"
[search]
debounce_ms = 150
cache_ttl_secs = 60
history_file = "/tmp/pecha-history.json"

[admin]
emails = ["Editor@Example.org"]

[storage]
public_base_url = "https://library.example.org"
bucket = "docs"
"#,
	)
	.unwrap();

	let cli = CliArgs::parse_from(["pecha", "--no-config", "--config", path.to_str().unwrap(), "categories"]);
	let raw: RawConfig = build_config(&cli).unwrap().try_deserialize().unwrap();
	let resolved = raw.resolve(&cli).unwrap();

	assert_eq!(resolved.search.debounce, Duration::from_millis(150));
	assert_eq!(resolved.search.cache_ttl, Duration::from_secs(60));
	assert_eq!(resolved.search.min_query_chars, 2);
	assert_eq!(resolved.search.suggestion_limit, 8);
	assert_eq!(resolved.history_file, Some(PathBuf::from("/tmp/pecha-history.json")));
	assert!(resolved.admin.allows("editor@example.org"));
	let storage = resolved.storage.expect("storage configured");
	assert_eq!(
		storage.public_url("a/b.pdf").as_str(),
		"https://library.example.org/storage/v1/object/public/docs/a/b.pdf"
	);
}

#[test]
fn invalid_values_are_rejected_with_their_key() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("pecha.toml");
	fs::write(&path, "[search]\nhistory_capacity = 0\n").unwrap();

	let cli = CliArgs::parse_from(["pecha", "--no-config", "--config", path.to_str().unwrap(), "categories"]);
	let raw: RawConfig = build_config(&cli).unwrap().try_deserialize().unwrap();
	let err = raw.resolve(&cli).unwrap_err();
	assert!(err.to_string().contains("search.history_capacity"));
}

#[test]
fn env_var_names_follow_separator() {
	assert_eq!(env_var_for("search.cache_ttl_secs"), "PECHA__SEARCH__CACHE_TTL_SECS");
}
