//! Run orchestration
//!
//! One run is: check the repository, scan, plan, apply. Everything a run
//! needs (configuration, resolution cache, worker pool) is created here and
//! dropped when the run ends, so nothing leaks between runs.
//!
//! All fatal conditions surface before the apply step, which means a run that
//! fails never leaves a partially rewritten tree behind.

use std::path::PathBuf;

use log::info;
use rayon::ThreadPool;

use crate::apply::{self, Mode};
use crate::cache::ResolutionCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{GitHistory, HistoryResolver};
use crate::plan;
use crate::scanner::Scanner;
use crate::summary::RunSummary;

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Tree to scan for references.
    pub directory: PathBuf,
    /// Working tree whose history resolves referenced paths.
    pub repository: PathBuf,
    pub mode: Mode,
    pub config: Config,
}

/// Execute a run against the git history of `options.repository`.
pub fn execute(options: &RunOptions) -> Result<RunSummary> {
    let history = GitHistory::open(&options.repository)?;
    execute_with(options, &history)
}

/// Execute a run with an explicit history resolver.
pub fn execute_with<R>(options: &RunOptions, resolver: &R) -> Result<RunSummary>
where
    R: HistoryResolver + ?Sized,
{
    if !options.directory.is_dir() {
        return Err(Error::Scan {
            path: options.directory.clone(),
            message: "not a directory".to_string(),
        });
    }

    let scanner = Scanner::from_config(&options.config)?;
    info!("Scanning {}", options.directory.display());
    let references = scanner
        .scan(&options.directory)
        .collect::<Result<Vec<_>>>()?;
    info!("Found {} reference(s)", references.len());

    let pool = build_pool(options.config.jobs)?;
    let cache = ResolutionCache::new();
    let plan = plan::plan(references, resolver, &cache, &pool)?;
    info!(
        "Planned {} edit(s) across {} file(s)",
        plan.edit_count(),
        plan.files.len()
    );

    Ok(apply::apply(&plan, options.mode, &pool))
}

fn build_pool(jobs: Option<usize>) -> Result<ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = jobs {
        builder = builder.num_threads(jobs);
    }
    Ok(builder.build()?)
}
