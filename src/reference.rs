//! # Pinned Reference Grammar
//!
//! A pinned reference names a path inside a fixed owner/repository and the
//! commit it is pinned to:
//!
//! ```text
//! XRPLF/actions/get-nproc@0123456789abcdef0123456789abcdef01234567
//! XRPLF/actions/.github/workflows/pre-commit.yml@0123456789abcdef0123456789abcdef01234567
//! ```
//!
//! The grammar is deliberately small:
//!
//! - the owner/repo prefix is a constant supplied by configuration,
//! - the path is either `.github/workflows/<anything but '@' or whitespace>` or
//!   a run of `[a-z0-9._/-]`,
//! - the revision is exactly [`REVISION_LEN`] lowercase hex characters.
//!
//! Matches are additionally checked against boundary rules so that a
//! reference glued to a longer token is ignored: the byte before the prefix
//! may not be part of a word or path, and the byte after the revision may not
//! be a word character (a 41st hex digit, for example).

use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Owner/repository prefix used when no configuration overrides it.
pub const DEFAULT_PREFIX: &str = "XRPLF/actions";

/// Length of a full commit identifier.
pub const REVISION_LEN: usize = 40;

/// A located occurrence of a pinned reference in a scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// File the reference was found in.
    pub file: PathBuf,
    /// 1-based line number of the match.
    pub line: usize,
    /// Byte offset of the match within the file.
    pub offset: usize,
    /// Owner/repository prefix, e.g. `XRPLF/actions`.
    pub owner_repo: String,
    /// Path inside the owning repository, e.g. `get-nproc`.
    pub path: String,
    /// Revision the reference is currently pinned to.
    pub revision: String,
    /// The exact text that was matched.
    pub matched: String,
}

impl Reference {
    /// The reference text with its revision replaced.
    ///
    /// Owner, repository and path are copied from the original match.
    pub fn with_revision(&self, revision: &str) -> String {
        format!("{}/{}@{}", self.owner_repo, self.path, revision)
    }

    /// Byte range of the whole match within the file.
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.matched.len()
    }

    /// Whether the referenced path stays inside the owning repository.
    ///
    /// Absolute paths and paths with `..` segments are never looked up.
    pub fn is_contained(&self) -> bool {
        is_contained_path(&self.path)
    }
}

/// Returns `true` for relative paths without parent-directory segments.
pub fn is_contained_path(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Returns `true` if `s` is a full-length lowercase hex revision.
pub fn is_revision(s: &str) -> bool {
    s.len() == REVISION_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// One raw grammar match inside a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch<'t> {
    /// Byte offset of the first byte of the prefix.
    pub start: usize,
    /// Referenced path.
    pub path: &'t str,
    /// Current revision.
    pub revision: &'t str,
    /// The full matched text.
    pub text: &'t str,
}

/// Compiled reference grammar for one owner/repository prefix.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    prefix: String,
    regex: Regex,
}

impl ReferencePattern {
    /// Compile the grammar for `prefix` (`owner/repo`).
    pub fn new(prefix: &str) -> Result<Self> {
        validate_prefix(prefix)?;
        let pattern = format!(
            r"{}/((?:\.github/workflows/[^@\s]+|[a-z0-9._/-]+))@([a-f0-9]{{{}}})",
            regex::escape(prefix),
            REVISION_LEN
        );
        Ok(Self {
            prefix: prefix.to_string(),
            regex: Regex::new(&pattern)?,
        })
    }

    /// The owner/repository prefix this pattern matches.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// All references in `text` that satisfy the boundary rules, in order.
    pub fn find_iter<'p, 't>(&'p self, text: &'t str) -> impl Iterator<Item = PatternMatch<'t>> + 'p
    where
        't: 'p,
    {
        let bytes = text.as_bytes();
        self.regex.captures_iter(text).filter_map(move |caps| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?;
            let revision = caps.get(2)?;

            if whole.start() > 0 && is_leading_joiner(bytes[whole.start() - 1]) {
                return None;
            }
            if bytes.get(whole.end()).is_some_and(|b| is_trailing_joiner(*b)) {
                return None;
            }

            Some(PatternMatch {
                start: whole.start(),
                path: path.as_str(),
                revision: revision.as_str(),
                text: whole.as_str(),
            })
        })
    }
}

fn is_leading_joiner(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/')
}

fn is_trailing_joiner(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn validate_prefix(prefix: &str) -> Result<()> {
    let mut parts = prefix.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(repo), None) if is_name(owner) && is_name(repo)
    );
    if valid {
        Ok(())
    } else {
        Err(Error::ConfigParse {
            message: format!("Invalid reference prefix '{}'", prefix),
            hint: Some("The prefix must look like 'owner/repo', e.g. 'XRPLF/actions'".to_string()),
        })
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const NEW: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn pattern() -> ReferencePattern {
        ReferencePattern::new(DEFAULT_PREFIX).unwrap()
    }

    #[test]
    fn test_matches_action_reference() {
        let text = format!("      uses: XRPLF/actions/get-nproc@{}\n", OLD);
        let matches: Vec<_> = pattern().find_iter(&text).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "get-nproc");
        assert_eq!(matches[0].revision, OLD);
        assert_eq!(matches[0].start, 12);
        assert_eq!(matches[0].text, format!("XRPLF/actions/get-nproc@{}", OLD));
    }

    #[test]
    fn test_matches_workflow_reference() {
        let text = format!(
            "    uses: XRPLF/actions/.github/workflows/pre-commit.yml@{}",
            OLD
        );
        let matches: Vec<_> = pattern().find_iter(&text).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, ".github/workflows/pre-commit.yml");
    }

    #[test]
    fn test_matches_nested_action_path() {
        let text = format!("uses: XRPLF/actions/setup/conan-v2@{}", OLD);
        let matches: Vec<_> = pattern().find_iter(&text).collect();
        assert_eq!(matches[0].path, "setup/conan-v2");
    }

    #[test]
    fn test_matches_inside_quotes_and_comments() {
        let text = format!(
            "uses: \"XRPLF/actions/a@{}\" # XRPLF/actions/b@{}",
            OLD, NEW
        );
        let paths: Vec<_> = pattern().find_iter(&text).map(|m| m.path).collect();
        assert_eq!(paths, vec!["a", "b"]);
    }

    #[test]
    fn test_multiple_references_keep_offsets() {
        let first = format!("XRPLF/actions/a@{}", OLD);
        let text = format!("{} {}", first, first);
        let starts: Vec<_> = pattern().find_iter(&text).map(|m| m.start).collect();
        assert_eq!(starts, vec![0, first.len() + 1]);
    }

    #[test]
    fn test_rejects_short_revision() {
        let text = "uses: XRPLF/actions/get-nproc@aaaa";
        assert_eq!(pattern().find_iter(text).count(), 0);
    }

    #[test]
    fn test_rejects_overlong_hex_run() {
        let text = format!("uses: XRPLF/actions/get-nproc@{}a", OLD);
        assert_eq!(pattern().find_iter(&text).count(), 0);
    }

    #[test]
    fn test_rejects_uppercase_revision() {
        let text = format!("uses: XRPLF/actions/get-nproc@{}", OLD.to_uppercase());
        assert_eq!(pattern().find_iter(&text).count(), 0);
    }

    #[test]
    fn test_rejects_glued_prefix() {
        let glued = format!("uses: myXRPLF/actions/get-nproc@{}", OLD);
        assert_eq!(pattern().find_iter(&glued).count(), 0);

        let nested = format!("uses: other/XRPLF/actions/get-nproc@{}", OLD);
        assert_eq!(pattern().find_iter(&nested).count(), 0);
    }

    #[test]
    fn test_accepts_trailing_punctuation() {
        let text = format!("(XRPLF/actions/get-nproc@{}).", OLD);
        assert_eq!(pattern().find_iter(&text).count(), 1);
    }

    #[test]
    fn test_other_owner_is_ignored() {
        let text = format!("uses: actions/checkout@{}", OLD);
        assert_eq!(pattern().find_iter(&text).count(), 0);
    }

    #[test]
    fn test_custom_prefix_is_escaped() {
        let pattern = ReferencePattern::new("my.org/tools").unwrap();
        let text = format!("myXorg/tools/x@{} my.org/tools/x@{}", OLD, OLD);
        let matches: Vec<_> = pattern.find_iter(&text).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, format!("my.org/tools/x@{}", OLD));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        for prefix in ["", "XRPLF", "XRPLF/actions/extra", "XRPLF/", "a b/c"] {
            assert!(
                matches!(ReferencePattern::new(prefix), Err(Error::ConfigParse { .. })),
                "prefix {:?} should be rejected",
                prefix
            );
        }
    }

    #[test]
    fn test_with_revision_changes_only_revision() {
        let reference = Reference {
            file: PathBuf::from("ci.yml"),
            line: 1,
            offset: 0,
            owner_repo: DEFAULT_PREFIX.to_string(),
            path: "get-nproc".to_string(),
            revision: OLD.to_string(),
            matched: format!("XRPLF/actions/get-nproc@{}", OLD),
        };
        assert_eq!(
            reference.with_revision(NEW),
            format!("XRPLF/actions/get-nproc@{}", NEW)
        );
        assert_eq!(reference.span(), 0..reference.matched.len());
    }

    #[test]
    fn test_contained_paths() {
        assert!(is_contained_path("get-nproc"));
        assert!(is_contained_path(".github/workflows/pre-commit.yml"));
        assert!(!is_contained_path("../secrets"));
        assert!(!is_contained_path("a/../../b"));
        assert!(!is_contained_path("/etc/passwd"));
        assert!(!is_contained_path(""));
    }

    #[test]
    fn test_is_revision() {
        assert!(is_revision(OLD));
        assert!(!is_revision("abc"));
        assert!(!is_revision(&OLD.to_uppercase()));
        assert!(!is_revision(&format!("{}0", OLD)));
    }
}
