//! Shared test utilities for CLI end-to-end tests.
//!
//! The fixtures build throwaway git repositories with the system `git`
//! binary, so the tests exercise real history lookups.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let repo = GitFixture::new();
//!     let revision = repo.commit_file("get-nproc/action.yml", "name: nproc");
//!     repo.command().arg(".").assert().success();
//! }
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{pinned, GitFixture, OLD_REVISION};
}

/// A revision that no fixture commit will ever have.
pub const OLD_REVISION: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// `XRPLF/actions/<path>@<revision>`
#[allow(dead_code)]
pub fn pinned(path: &str, revision: &str) -> String {
    format!("XRPLF/actions/{}@{}", path, revision)
}

/// A temporary git repository.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
}

impl GitFixture {
    /// Create an empty repository.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture.git(&["init", "-q"]);
        fixture
    }

    /// Run git in the repository and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
            ])
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write a file without committing it.
    pub fn write(&self, path: &str, content: &str) {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Write and commit a file, returning the new HEAD revision.
    pub fn commit_file(&self, path: &str, content: &str) -> String {
        self.write(path, content);
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", path]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Read a file in the repository.
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Get the path to the repository root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A command for the binary, run from the repository root with colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("action-pins");
        cmd.current_dir(self.path())
            .env_remove("ACTION_PINS_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}
