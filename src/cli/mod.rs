mod args;
mod output;

pub(crate) use args::{
	CliArgs, CliCommand, EditArgs, HistoryAction, OutputFormat, SearchArgs, SuggestArgs, parse_cli,
};
pub(crate) use output::{print_json, print_plain};
