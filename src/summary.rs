//! # Run Summary
//!
//! A [`RunSummary`] is what one invocation reports: counts plus every change,
//! unresolved reference and file failure. Dry runs and real runs render with
//! the same line format, so the output of a dry run can be diffed against the
//! output of the run that follows it.
//!
//! ```text
//! Applying updates:
//! - .github/workflows/ci.yml:12: XRPLF/actions/get-nproc@aaaa… -> XRPLF/actions/get-nproc@bbbb…
//! ! .github/workflows/ci.yml:20: XRPLF/actions/gone@cccc… (unresolved: no history for gone)
//! x .github/workflows/build.yml: Failed to write … (1 reference(s) not updated)
//!
//! Scanned 3 reference(s): 1 updated, 1 skipped (0 already current, 1 unresolved), 1 failed
//! Updated 1 reference(s) in 1 file(s)
//! ```

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;

use console::Style;
use serde::Serialize;

use crate::error::Result;
use crate::output::{emoji, paint, OutputConfig};

/// One rewritten (or, in a dry run, rewritable) reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub file: PathBuf,
    pub line: usize,
    pub old: String,
    pub new: String,
}

/// A reference whose path has no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub file: PathBuf,
    pub line: usize,
    pub path: String,
    pub reference: String,
}

/// A file whose edits could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub message: String,
    /// Number of edits that were not applied.
    pub references: usize,
}

/// Everything a run reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    /// References found by the scanner.
    pub scanned: usize,
    /// References already pinned to the newest revision.
    pub already_current: usize,
    pub changes: Vec<Change>,
    pub unresolved: Vec<UnresolvedReference>,
    pub failures: Vec<FileFailure>,
}

#[derive(Serialize)]
struct Counts {
    scanned: usize,
    updated: usize,
    skipped: usize,
    already_current: usize,
    unresolved: usize,
    failed: usize,
    files_changed: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    dry_run: bool,
    counts: Counts,
    changes: &'a [Change],
    unresolved: &'a [UnresolvedReference],
    failures: &'a [FileFailure],
}

impl RunSummary {
    /// References updated (or that would be, in a dry run).
    pub fn updated(&self) -> usize {
        self.changes.len()
    }

    /// References left as they are: already current or unresolved.
    pub fn skipped(&self) -> usize {
        self.already_current + self.unresolved.len()
    }

    /// References whose file could not be written.
    pub fn failed(&self) -> usize {
        self.failures.iter().map(|f| f.references).sum()
    }

    /// Distinct files with at least one change.
    pub fn files_changed(&self) -> usize {
        self.changes
            .iter()
            .map(|c| &c.file)
            .collect::<HashSet<_>>()
            .len()
    }

    /// `true` unless a file could not be written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn counts(&self) -> Counts {
        Counts {
            scanned: self.scanned,
            updated: self.updated(),
            skipped: self.skipped(),
            already_current: self.already_current,
            unresolved: self.unresolved.len(),
            failed: self.failed(),
            files_changed: self.files_changed(),
        }
    }

    /// Machine-readable form of the summary.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&JsonReport {
            dry_run: self.dry_run,
            counts: self.counts(),
            changes: &self.changes,
            unresolved: &self.unresolved,
            failures: &self.failures,
        })?)
    }

    /// Human-readable report. `quiet` keeps only problems and the final line.
    pub fn render(&self, output: &OutputConfig, quiet: bool) -> String {
        let mut out = String::new();

        if !quiet {
            let header = if self.dry_run {
                "Updates to be applied:"
            } else {
                "Applying updates:"
            };
            let _ = writeln!(out, "{}", header);
            for change in &self.changes {
                let _ = writeln!(
                    out,
                    "- {}:{}: {} -> {}",
                    change.file.display(),
                    change.line,
                    change.old,
                    change.new
                );
            }
        }
        for unresolved in &self.unresolved {
            let _ = writeln!(
                out,
                "! {}:{}: {} (unresolved: no history for {})",
                unresolved.file.display(),
                unresolved.line,
                unresolved.reference,
                unresolved.path
            );
        }
        for failure in &self.failures {
            let _ = writeln!(
                out,
                "x {}: {} ({} reference(s) not updated)",
                failure.file.display(),
                failure.message,
                failure.references
            );
        }

        if !quiet {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Scanned {} reference(s): {} updated, {} skipped ({} already current, {} unresolved), {} failed",
                self.scanned,
                self.updated(),
                self.skipped(),
                self.already_current,
                self.unresolved.len(),
                self.failed()
            );
        }

        let status = if self.dry_run {
            format!(
                "{}Dry run complete: {} update(s) would be applied across {} file(s)",
                emoji(output, "🔎 ", ""),
                self.updated(),
                self.files_changed()
            )
        } else if self.is_success() {
            format!(
                "{}Updated {} reference(s) in {} file(s)",
                emoji(output, "✅ ", ""),
                self.updated(),
                self.files_changed()
            )
        } else {
            format!(
                "{}Updated {} reference(s) in {} file(s), {} file(s) failed",
                emoji(output, "❌ ", ""),
                self.updated(),
                self.files_changed(),
                self.failures.len()
            )
        };
        let style = if self.is_success() {
            Style::new().green()
        } else {
            Style::new().red()
        };
        let _ = writeln!(out, "{}", paint(output, &status, style));

        if self.dry_run && !quiet && self.updated() > 0 {
            let _ = writeln!(out, "Run without --dry-run to apply changes");
        }
        out
    }
}
