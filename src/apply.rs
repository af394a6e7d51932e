//! # Applying a Rewrite Plan
//!
//! In dry-run mode nothing on disk is opened; the summary is built from the
//! plan alone. In apply mode every file with edits goes through one
//! read-modify-write cycle:
//!
//! 1.  **Read** the whole file once.
//! 2.  **Verify** that each edit's old text is still at its recorded offset.
//!     If any is not, the file changed after it was scanned and is left alone.
//! 3.  **Splice** all edits in offset order into a new buffer.
//! 4.  **Write** the buffer to a temporary file next to the target and rename
//!     it into place, keeping the original permissions.
//!
//! Files are independent: a failure on one is recorded in the summary and the
//! others still get written. Each file is written at most once per run.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::plan::{Edit, FileEdits, Outcome, RewritePlan};
use crate::summary::{Change, FileFailure, RunSummary, UnresolvedReference};

/// Whether the applier may touch the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report planned changes only.
    DryRun,
    /// Rewrite files.
    Apply,
}

/// Execute `plan` and summarize the result.
pub fn apply(plan: &RewritePlan, mode: Mode, pool: &ThreadPool) -> RunSummary {
    let results: Vec<Result<()>> = match mode {
        Mode::DryRun => plan.files.iter().map(|_| Ok(())).collect(),
        Mode::Apply => pool.install(|| plan.files.par_iter().map(rewrite_file).collect()),
    };

    let mut summary = RunSummary {
        dry_run: mode == Mode::DryRun,
        scanned: plan.references.len(),
        already_current: plan.count(|o| *o == Outcome::AlreadyCurrent),
        ..RunSummary::default()
    };

    summary.unresolved = plan
        .references
        .iter()
        .filter(|r| r.outcome == Outcome::Unresolved)
        .map(|r| UnresolvedReference {
            file: r.reference.file.clone(),
            line: r.reference.line,
            path: r.reference.path.clone(),
            reference: r.reference.matched.clone(),
        })
        .collect();

    for (file, result) in plan.files.iter().zip(results) {
        match result {
            Ok(()) => summary.changes.extend(file.edits.iter().map(|edit| Change {
                file: file.path.clone(),
                line: edit.line,
                old: edit.old.clone(),
                new: edit.new.clone(),
            })),
            Err(e) => {
                warn!("{}", e);
                summary.failures.push(FileFailure {
                    file: file.path.clone(),
                    message: e.to_string(),
                    references: file.edits.len(),
                });
            }
        }
    }

    summary
}

/// Apply all edits of one file in a single read-modify-write cycle.
pub fn rewrite_file(file: &FileEdits) -> Result<()> {
    let write_failure = |message: String| Error::WriteFailure {
        path: file.path.clone(),
        message,
    };

    let original = fs::read(&file.path).map_err(|e| write_failure(format!("read failed: {}", e)))?;
    let rewritten = splice(&original, &file.edits).map_err(write_failure)?;
    write_atomic(&file.path, &rewritten).map_err(|e| write_failure(e.to_string()))?;

    info!("Rewrote {} reference(s) in {}", file.edits.len(), file.path.display());
    Ok(())
}

/// Replace every edit's old text with its new text.
///
/// `edits` must be sorted by offset. Fails without producing output if an
/// edit overlaps the previous one or its old text is not at its offset.
pub fn splice(content: &[u8], edits: &[Edit]) -> std::result::Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(content.len());
    let mut cursor = 0;

    for edit in edits {
        if edit.offset < cursor {
            return Err(format!(
                "overlapping edits at line {} (offset {})",
                edit.line, edit.offset
            ));
        }
        let end = edit.offset + edit.old.len();
        match content.get(edit.offset..end) {
            Some(found) if found == edit.old.as_bytes() => {}
            _ => {
                return Err(format!(
                    "content changed since scan: '{}' no longer at line {}",
                    edit.old, edit.line
                ))
            }
        }
        out.extend_from_slice(&content[cursor..edit.offset]);
        out.extend_from_slice(edit.new.as_bytes());
        cursor = end;
    }

    out.extend_from_slice(&content[cursor..]);
    Ok(out)
}

/// Replace `path` with `data` so readers see either the old or the new file.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let target = fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or(Path::new("."));
    let permissions = fs::metadata(&target)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
