//! Process-wide logger setup.
//!
//! Library code only talks to the `log` facade; the binary calls
//! [`initialize`] once at startup.

use env_logger::{Builder, Env};

const DEFAULT_FILTER: &str = "warn";

/// Install `env_logger` as the global logger.
///
/// `RUST_LOG` takes precedence unless an explicit `level` override is given.
/// Calling this more than once is harmless; later calls are ignored.
pub fn initialize(level: Option<&str>) {
	let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
	if let Some(level) = level {
		builder.parse_filters(level);
	}
	builder.format_timestamp_millis();
	let _ = builder.try_init();
}
