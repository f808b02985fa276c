mod cli;
mod settings;
mod workflow;

use anyhow::Result;
use cli::{OutputFormat, parse_cli, print_json, print_plain};
use workflow::Library;

fn main() -> Result<()> {
	let cli = parse_cli();
	let resolved = settings::load(&cli)?;
	pecha::logging::initialize(resolved.log_level.as_deref());

	if cli.print_config {
		resolved.print_summary();
	}

	let format = cli.format;
	let library = Library::open(&cli, resolved)?;
	let outcome = library.run(cli.command)?;

	match format {
		OutputFormat::Plain => print_plain(&outcome),
		OutputFormat::Json => print_json(&outcome)?,
	}

	Ok(())
}
