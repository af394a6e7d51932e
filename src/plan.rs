//! # Rewrite Planning
//!
//! Turns scanned references into a [`RewritePlan`]: the complete set of text
//! substitutions for one run, plus the outcome of every reference.
//!
//! ## Process
//!
//! 1.  **Group**: Collect the distinct referenced paths in scan order.
//! 2.  **Resolve**: Look up each distinct path exactly once through the run's
//!     [`ResolutionCache`]. Lookups run on a bounded `rayon` pool and the
//!     planner waits for all of them before emitting anything, so a fatal
//!     history error aborts the run before any file is written.
//! 3.  **Decide**: Every reference becomes `Updated`, `AlreadyCurrent` or
//!     `Unresolved`. Only `Updated` references produce an [`Edit`].
//!
//! Outcomes keep scan order and file edits keep first-seen file order, so the
//! same tree and history always give the same plan.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;

use crate::cache::{Resolution, ResolutionCache};
use crate::error::Result;
use crate::git::HistoryResolver;
use crate::reference::Reference;

/// What happens to one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The pin moves to `revision`.
    Updated { revision: String },
    /// The pin already names the newest revision.
    AlreadyCurrent,
    /// The referenced path has no history; the pin is left alone.
    Unresolved,
}

/// A reference together with its planned outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedReference {
    pub reference: Reference,
    pub outcome: Outcome,
}

/// One exact substitution inside a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// Byte offset of `old` in the scanned content.
    pub offset: usize,
    /// 1-based line of the edit, for reporting.
    pub line: usize,
    /// Text expected at `offset`.
    pub old: String,
    /// Replacement text. Differs from `old` only in the revision.
    pub new: String,
}

/// All edits for one file, sorted by offset and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEdits {
    pub path: PathBuf,
    pub edits: Vec<Edit>,
}

/// The complete, precomputed set of substitutions for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewritePlan {
    /// Every scanned reference, in scan order.
    pub references: Vec<PlannedReference>,
    /// Files with at least one edit, in first-seen order.
    pub files: Vec<FileEdits>,
}

impl RewritePlan {
    /// `true` when no file needs to change.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of edits across all files.
    pub fn edit_count(&self) -> usize {
        self.files.iter().map(|f| f.edits.len()).sum()
    }

    /// Number of references with the given outcome kind.
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.references
            .iter()
            .filter(|r| predicate(&r.outcome))
            .count()
    }
}

/// Build the rewrite plan for `references`.
///
/// `resolver` is called at most once per distinct referenced path for the
/// lifetime of `cache`.
pub fn plan<R>(
    references: Vec<Reference>,
    resolver: &R,
    cache: &ResolutionCache,
    pool: &ThreadPool,
) -> Result<RewritePlan>
where
    R: HistoryResolver + ?Sized,
{
    let references = dedup_sites(references);

    let distinct: Vec<String> = {
        let mut seen = HashSet::new();
        references
            .iter()
            .filter(|r| seen.insert(r.path.as_str()))
            .map(|r| r.path.clone())
            .collect()
    };
    info!(
        "Resolving {} distinct path(s) for {} reference(s)",
        distinct.len(),
        references.len()
    );

    let resolutions: HashMap<String, Resolution> = pool.install(|| {
        distinct
            .par_iter()
            .map(|path| {
                cache
                    .get_or_resolve(path, || resolver.resolve(path))
                    .map(|resolution| (path.clone(), resolution))
            })
            .collect::<Result<HashMap<_, _>>>()
    })?;

    let mut plan = RewritePlan::default();
    let mut file_index: HashMap<PathBuf, usize> = HashMap::new();

    for reference in references {
        let outcome = match resolutions.get(reference.path.as_str()) {
            Some(Resolution::Resolved(latest)) if *latest == reference.revision => {
                Outcome::AlreadyCurrent
            }
            Some(Resolution::Resolved(latest)) => Outcome::Updated {
                revision: latest.clone(),
            },
            Some(Resolution::Unresolved) | None => {
                warn!(
                    "{}:{}: no history for '{}', leaving {} unchanged",
                    reference.file.display(),
                    reference.line,
                    reference.path,
                    reference.matched
                );
                Outcome::Unresolved
            }
        };

        if let Outcome::Updated { revision } = &outcome {
            let edit = Edit {
                offset: reference.offset,
                line: reference.line,
                old: reference.matched.clone(),
                new: reference.with_revision(revision),
            };
            debug!(
                "{}:{}: {} -> {}",
                reference.file.display(),
                edit.line,
                edit.old,
                edit.new
            );
            let index = *file_index
                .entry(reference.file.clone())
                .or_insert_with(|| {
                    plan.files.push(FileEdits {
                        path: reference.file.clone(),
                        edits: Vec::new(),
                    });
                    plan.files.len() - 1
                });
            plan.files[index].edits.push(edit);
        }

        plan.references.push(PlannedReference { reference, outcome });
    }

    for file in &mut plan.files {
        file.edits.sort_by_key(|e| e.offset);
    }

    Ok(plan)
}

/// Drop repeated (file, offset) sites, keeping the first occurrence.
fn dedup_sites(references: Vec<Reference>) -> Vec<Reference> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|r| seen.insert((r.file.clone(), r.offset)))
        .collect()
}
