use std::fmt::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{
	ArgAction, Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum,
	builder::{
		BoolishValueParser, Styles,
		styling::{AnsiColor, Effects},
	},
};
use pecha::app_dirs;

/// Produce the full version banner including config and data directories.
fn long_version() -> &'static str {
	let config_dir = match app_dirs::get_config_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};
	let data_dir = match app_dirs::get_data_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};

	let mut details = format!("pecha {}", env!("CARGO_PKG_VERSION"));
	let _ = writeln!(details);
	let _ = writeln!(details, "config directory: {config_dir}");
	let _ = writeln!(details, "data directory: {data_dir}");

	Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub(crate) fn parse_cli() -> CliArgs {
	let mut matches = CliArgs::command().get_matches();
	CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

#[derive(Parser, Debug)]
#[command(
	name = "pecha",
	version,
	long_version = long_version(),
	about = "Search, browse and curate a library of translated texts",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
/// Command-line arguments accepted by the `pecha` binary.
pub(crate) struct CliArgs {
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "PECHA_CONFIG",
		action = ArgAction::Append,
		global = true,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		global = true,
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short = 'd',
		long = "data-file",
		value_name = "PATH",
		global = true,
		help = "JSON dataset to serve records from (default: backend.data_file)"
	)]
	pub(crate) data_file: Option<PathBuf>,
	#[arg(
		long = "log-level",
		value_name = "FILTER",
		global = true,
		help = "Log filter such as `debug` or `pecha=trace` (default: warn)"
	)]
	pub(crate) log_level: Option<String>,
	#[arg(
		long = "as",
		value_name = "EMAIL",
		env = "PECHA_USER",
		global = true,
		help = "Act as the signed-in user with this email (default: anonymous)"
	)]
	pub(crate) user: Option<String>,
	#[arg(
		long,
		global = true,
		help = "Pretend the backend is unreachable (default: disabled)"
	)]
	pub(crate) offline: bool,
	#[arg(
		short = 'p',
		long = "print-config",
		global = true,
		help = "Print the resolved configuration before running (default: disabled)"
	)]
	pub(crate) print_config: bool,
	#[arg(
		short = 'o',
		long = "format",
		value_enum,
		default_value_t = OutputFormat::Plain,
		global = true,
		help = "Choose how to print the result"
	)]
	pub(crate) format: OutputFormat,
	#[command(subcommand)]
	pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
	/// Search the listing with filters and print grouped results.
	Search(SearchArgs),
	/// Show scored suggestions for a partial query.
	Suggest(SuggestArgs),
	/// Inspect or edit the search history.
	History {
		#[command(subcommand)]
		action: Option<HistoryAction>,
	},
	/// List categories with their translation counts.
	Categories,
	/// Edit a record's metadata (admin only).
	Edit(EditArgs),
	/// Delete a record (admin only).
	Delete {
		#[arg(value_name = "ID")]
		id: String,
	},
	/// Count a view and print the record with its document URLs.
	View {
		#[arg(value_name = "ID")]
		id: String,
	},
}

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
	#[arg(value_name = "QUERY", help = "Text matched against titles and descriptions")]
	pub(crate) query: Option<String>,
	#[arg(
		short = 't',
		long = "tag",
		value_name = "TAG",
		action = ArgAction::Append,
		help = "Require a tag; repeat to require several (default: none)"
	)]
	pub(crate) tags: Vec<String>,
	#[arg(long, value_name = "ID", help = "Restrict to one category (default: all)")]
	pub(crate) category: Option<String>,
	#[arg(long, value_name = "YYYY-MM-DD", help = "First creation date, inclusive")]
	pub(crate) start: Option<NaiveDate>,
	#[arg(long, value_name = "YYYY-MM-DD", help = "Last creation date, inclusive")]
	pub(crate) end: Option<NaiveDate>,
	#[arg(
		short = 's',
		long,
		value_name = "FIELD",
		help = "Sort field such as created_at, view_count or featured (default: created_at)"
	)]
	pub(crate) sort: Option<String>,
	#[arg(long, help = "Sort ascending (default: descending)")]
	pub(crate) asc: bool,
	#[arg(
		long,
		value_name = "QUERYSTRING",
		help = "Restore filters from a shared query string before applying flags"
	)]
	pub(crate) url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
	#[arg(value_name = "TERM")]
	pub(crate) term: String,
	#[arg(
		long,
		value_name = "N",
		help = "Pick the Nth suggestion and remember it in history"
	)]
	pub(crate) select: Option<usize>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum HistoryAction {
	/// Print remembered terms, newest first.
	List,
	/// Forget every term.
	Clear,
	/// Forget a single term.
	Remove {
		#[arg(value_name = "TERM")]
		term: String,
	},
}

#[derive(Args, Debug, Default)]
pub(crate) struct EditArgs {
	#[arg(value_name = "ID")]
	pub(crate) id: String,
	#[arg(long, value_name = "TEXT")]
	pub(crate) title: Option<String>,
	#[arg(long = "tibetan-title", value_name = "TEXT", help = "Empty clears the value")]
	pub(crate) tibetan_title: Option<String>,
	#[arg(long, value_name = "TEXT", help = "Empty clears the value")]
	pub(crate) description: Option<String>,
	#[arg(
		long,
		value_delimiter = ',',
		value_name = "TAG",
		help = "Replace all tags with a comma-separated list"
	)]
	pub(crate) tags: Option<Vec<String>>,
	#[arg(long = "add-tag", value_name = "TAG", action = ArgAction::Append)]
	pub(crate) add_tags: Vec<String>,
	#[arg(long = "remove-tag", value_name = "TAG", action = ArgAction::Append)]
	pub(crate) remove_tags: Vec<String>,
	#[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
	pub(crate) featured: Option<bool>,
	#[arg(long, value_name = "N", allow_hyphen_values = true, help = "New view count")]
	pub(crate) views: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
/// Output formats supported by the CLI utility.
pub(crate) enum OutputFormat {
	Plain,
	Json,
}
