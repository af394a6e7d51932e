//! # Reference Scanner
//!
//! Walks a directory tree and extracts every pinned reference from eligible
//! files. A file is eligible when its extension is one of the configured
//! configuration extensions (`yml` and `yaml` by default) and it is not
//! excluded by a configured glob pattern.
//!
//! Scanning is read-only and lazy: [`Scanner::scan`] returns an iterator that
//! reads one file at a time. Directory entries are visited in file-name order
//! so repeated scans of an unchanged tree yield identical sequences.
//!
//! Files that are not text (they contain a NUL byte or are not valid UTF-8)
//! are skipped without error. The `.git` directory is never entered.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reference::{Reference, ReferencePattern};

/// Extracts pinned references from a directory tree.
#[derive(Debug, Clone)]
pub struct Scanner {
    pattern: ReferencePattern,
    extensions: Vec<String>,
    exclude: Vec<Pattern>,
}

impl Scanner {
    /// Create a scanner with an explicit grammar, extension list and exclude globs.
    pub fn new(pattern: ReferencePattern, extensions: &[String], exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            pattern,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            exclude,
        })
    }

    /// Create a scanner from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            ReferencePattern::new(&config.prefix)?,
            &config.extensions,
            &config.exclude,
        )
    }

    /// Lazily scan `root` and yield every reference in walk order.
    ///
    /// Unreadable directories and files surface as `Err` items; callers that
    /// need all-or-nothing behaviour collect into `Result<Vec<_>>`.
    ///
    /// Symlinked files are read through the link; symlinked directories are
    /// not entered. A file reachable under several names is scanned once,
    /// under the first name in walk order.
    pub fn scan<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = Result<Reference>> + 'a {
        let mut seen: HashSet<PathBuf> = HashSet::new();

        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !self.is_pruned(root, e))
            .filter_map(move |entry| match entry {
                Ok(entry) if is_file(&entry) && self.is_eligible(entry.path()) => {
                    let target = fs::canonicalize(entry.path())
                        .unwrap_or_else(|_| entry.path().to_path_buf());
                    if !seen.insert(target) {
                        debug!("Already scanned {} under another name", entry.path().display());
                        return None;
                    }
                    Some(self.scan_file(entry.path()))
                }
                Ok(_) => None,
                Err(e) => Some(Err(Error::Scan {
                    path: e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf()),
                    message: e.to_string(),
                })),
            })
            .flat_map(|result| match result {
                Ok(references) => references.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
    }

    /// Read one file and return its references. Binary files yield none.
    pub fn scan_file(&self, path: &Path) -> Result<Vec<Reference>> {
        let bytes = fs::read(path).map_err(|e| Error::Scan {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if bytes.contains(&0) {
            warn!("Skipping binary file {}", path.display());
            return Ok(Vec::new());
        }
        let Ok(content) = String::from_utf8(bytes) else {
            warn!("Skipping non-UTF-8 file {}", path.display());
            return Ok(Vec::new());
        };

        let references = self.scan_content(path, &content);
        if !references.is_empty() {
            debug!("Found {} reference(s) in {}", references.len(), path.display());
        }
        Ok(references)
    }

    /// Extract references from already-loaded file content.
    pub fn scan_content(&self, path: &Path, content: &str) -> Vec<Reference> {
        let mut line = 1;
        let mut counted_to = 0;

        self.pattern
            .find_iter(content)
            .map(|m| {
                line += content[counted_to..m.start].matches('\n').count();
                counted_to = m.start;
                Reference {
                    file: path.to_path_buf(),
                    line,
                    offset: m.start,
                    owner_repo: self.pattern.prefix().to_string(),
                    path: m.path.to_string(),
                    revision: m.revision.to_string(),
                    matched: m.text.to_string(),
                }
            })
            .collect()
    }

    fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }

    fn is_pruned(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        if entry.file_type().is_dir() && entry.file_name() == ".git" {
            return true;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// Regular files, and symlinks that resolve to one.
fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}
