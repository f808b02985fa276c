use pecha::app_dirs;

use super::ResolvedConfig;

pub(super) fn print_summary(config: &ResolvedConfig) {
	println!("Effective configuration:");
	match &config.data_file {
		Some(path) => println!("  Data file: {}", path.display()),
		None => println!("  Data file: (none, empty library)"),
	}
	println!("  Debounce: {} ms", config.search.debounce.as_millis());
	println!("  Minimum query length: {}", config.search.min_query_chars);
	println!("  Cache TTL: {} s", config.search.cache_ttl.as_secs());
	println!("  Suggestion limit: {}", config.search.suggestion_limit);
	println!("  History capacity: {}", config.search.history_capacity);
	match &config.history_file {
		Some(path) => println!("  History file: {}", path.display()),
		None => println!("  History file: (in memory)"),
	}
	if config.admin.emails().is_empty() {
		println!("  Admins: (none)");
	} else {
		println!("  Admins: {}", config.admin.emails().join(", "));
	}
	match &config.storage {
		Some(storage) => println!("  Storage: {}", storage.public_url("").as_str()),
		None => println!("  Storage: (not configured)"),
	}
	println!(
		"  Log level: {}",
		config.log_level.as_deref().unwrap_or("(RUST_LOG or warn)")
	);
	if let Ok(dir) = app_dirs::get_cache_dir() {
		println!("  Cache directory: {}", dir.display());
	}
}
