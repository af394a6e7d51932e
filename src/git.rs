//! Git history queries
//!
//! The resolver answers one question: which commit last touched a path? It
//! uses the system `git` binary against a local checkout and never touches
//! the network or the working tree.
//!
//! History is looked up for the exact path only. Renames are not followed,
//! and a path that was deleted at HEAD still resolves to the commit that
//! deleted it. In a repository without any commit every path is unresolved.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;

use crate::cache::Resolution;
use crate::error::{Error, Result};
use crate::reference::{is_contained_path, is_revision};

/// Maps a repository-relative path to the newest revision that modified it.
///
/// Implementations must be safe to call from several worker threads.
pub trait HistoryResolver: Send + Sync {
    /// Resolve `relative_path`. A path without history is
    /// [`Resolution::Unresolved`], not an error.
    fn resolve(&self, relative_path: &str) -> Result<Resolution>;
}

/// History resolver backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitHistory {
    root: PathBuf,
    /// `false` while HEAD is unborn; `git log` refuses to run then.
    has_commits: bool,
}

impl GitHistory {
    /// Open the working tree at `root`, failing with
    /// [`Error::RepositoryInvalid`] if it is not one.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        verify_work_tree(&root)?;
        let has_commits = head_exists(&root)?;
        if !has_commits {
            debug!("{} has no commits yet", root.display());
        }
        Ok(Self { root, has_commits })
    }
}

impl HistoryResolver for GitHistory {
    fn resolve(&self, relative_path: &str) -> Result<Resolution> {
        if !is_contained_path(relative_path) {
            debug!("Not querying history for '{}': outside repository", relative_path);
            return Ok(Resolution::Unresolved);
        }
        if !self.has_commits {
            return Ok(Resolution::Unresolved);
        }

        let command = "log -n 1 --pretty=format:%H";
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["--literal-pathspecs", "log", "-n", "1", "--pretty=format:%H", "--"])
            .arg(relative_path)
            .output()
            .map_err(|e| Error::HistoryUnavailable {
                path: relative_path.to_string(),
                command: command.to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::HistoryUnavailable {
                path: relative_path.to_string(),
                command: command.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let revision = stdout.trim();
        if revision.is_empty() {
            debug!("No history for '{}'", relative_path);
            return Ok(Resolution::Unresolved);
        }
        if !is_revision(revision) {
            return Err(Error::HistoryUnavailable {
                path: relative_path.to_string(),
                command: command.to_string(),
                stderr: format!("unexpected revision format: '{}'", revision),
            });
        }

        debug!("'{}' last changed in {}", relative_path, revision);
        Ok(Resolution::Resolved(revision.to_string()))
    }
}

/// Check that `root` is inside a git working tree.
pub fn verify_work_tree(root: &Path) -> Result<()> {
    if !root.is_dir() {
        return Err(Error::RepositoryInvalid {
            path: root.to_path_buf(),
            message: "directory does not exist".to_string(),
        });
    }

    let output = rev_parse(root, &["--is-inside-work-tree"])?;
    let inside = String::from_utf8_lossy(&output.stdout).trim() == "true";
    if output.status.success() && inside {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(Error::RepositoryInvalid {
            path: root.to_path_buf(),
            message: if stderr.is_empty() {
                "not inside a working tree".to_string()
            } else {
                stderr
            },
        })
    }
}

/// Whether HEAD points at a commit.
fn head_exists(root: &Path) -> Result<bool> {
    Ok(rev_parse(root, &["-q", "--verify", "HEAD^{commit}"])?
        .status
        .success())
}

fn rev_parse(root: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .arg("-C")
        .arg(root)
        .arg("rev-parse")
        .args(args)
        .output()
        .map_err(|e| Error::HistoryUnavailable {
            path: root.display().to_string(),
            command: format!("rev-parse {}", args.join(" ")),
            stderr: e.to_string(),
        })
}
