//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;

use action_pins::output::OutputConfig;

use crate::commands;

/// Action Pins - Update pinned action and workflow references to the latest commit
#[derive(Parser, Debug)]
#[command(name = "action-pins")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    update: commands::update::UpdateArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        commands::update::execute(self.update, &output)
    }
}

/// Send log records to stderr. `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
