//! # Action Pins CLI
//!
//! Binary entry point for the `action-pins` command-line tool. It parses
//! arguments, sets up logging and hands off to the library; errors bubble up
//! through `anyhow` and end the process with a non-zero status.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
