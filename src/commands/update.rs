//! # Update Command Implementation
//!
//! Scans a directory for pinned `owner/repo/path@revision` references and
//! moves each one to the newest commit that touched its path.
//!
//! ## Functionality
//!
//! - **Dry Run**: `--dry-run` prints every planned change and writes nothing.
//! - **Apply**: Without `--dry-run`, files are rewritten in place and the same
//!   report is printed for what was actually changed.
//! - **Unresolved paths**: Reported as warnings; they never fail the run.
//! - **Write failures**: Reported per file after all other files were
//!   processed, then the command exits with a non-zero status.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use action_pins::apply::Mode;
use action_pins::config;
use action_pins::orchestrator::{self, RunOptions};
use action_pins::output::OutputConfig;

/// Arguments for updating pinned references
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Directory to scan for pinned references
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Repository whose history resolves referenced paths (defaults to the
    /// current directory)
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Path to config file (defaults to ./.action-pins.yaml when present)
    #[arg(short, long, value_name = "PATH", env = "ACTION_PINS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of worker threads for history lookups and file writes
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Only print warnings, failures and the final status line
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the update command
pub fn execute(args: UpdateArgs, output: &OutputConfig) -> Result<()> {
    if !args.directory.is_dir() {
        anyhow::bail!(
            "Provided path is not a directory: {}",
            args.directory.display()
        );
    }

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;

    let mut config = config::load(args.config.as_deref(), &current_dir)?;
    if let Some(jobs) = args.jobs {
        if jobs == 0 {
            anyhow::bail!("--jobs must be at least 1");
        }
        config.jobs = Some(jobs);
    }

    let options = RunOptions {
        directory: args.directory,
        repository: args.repo.unwrap_or(current_dir),
        mode: if args.dry_run {
            Mode::DryRun
        } else {
            Mode::Apply
        },
        config,
    };

    let summary = orchestrator::execute(&options)?;

    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", summary.render(output, args.quiet));
    }

    if !summary.is_success() {
        anyhow::bail!(
            "{} file(s) could not be written",
            summary.failures.len()
        );
    }
    Ok(())
}
