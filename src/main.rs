mod common;
mod split;
mod ui;

use clap::Parser;

use crate::split::{SplitCommands, handle_split_command};
use crate::ui::prelude::{Level, OutputFormat, emit};

/// Split long mixes into one audio file per track
#[derive(Parser, Debug)]
#[command(name = "mixsplit", author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for messages
    #[arg(long = "output-format", value_enum, default_value = "text", global = true)]
    output_format: OutputFormat,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: SplitCommands,
}

fn main() {
    let cli = Cli::parse();

    ui::init(cli.output_format, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = handle_split_command(cli.command) {
        emit(Level::Error, "mixsplit.error", &format!("Error: {err:#}"), None);
        std::process::exit(1);
    }
}
