//! # Action Pins Library
//!
//! This library keeps pinned references to reusable actions and workflows up
//! to date. A pinned reference looks like
//! `XRPLF/actions/get-nproc@<40 hex characters>`; the library moves each one
//! to the newest commit that modified the referenced path.
//!
//! ## Quick Example
//!
//! ```
//! use action_pins::config::Config;
//! use action_pins::scanner::Scanner;
//! use std::path::Path;
//!
//! let scanner = Scanner::from_config(&Config::default()).unwrap();
//! let content = "uses: XRPLF/actions/get-nproc@0123456789abcdef0123456789abcdef01234567\n";
//! let references = scanner.scan_content(Path::new("ci.yml"), content);
//!
//! assert_eq!(references.len(), 1);
//! assert_eq!(references[0].path, "get-nproc");
//! ```
//!
//! ## Core Concepts
//!
//! - **Grammar (`reference`)**: What a pinned reference looks like and where it
//!   may start and end.
//! - **Scanner (`scanner`)**: Walks a tree and extracts references from
//!   configuration files.
//! - **History (`git`, `cache`)**: Resolves a path to the last commit that
//!   touched it, memoized per run.
//! - **Planner (`plan`)**: Decides, per reference, whether it is updated,
//!   already current or unresolved, and produces exact substitutions.
//! - **Applier (`apply`)**: Executes the plan (or only reports it in a dry run)
//!   and produces a [`summary::RunSummary`].
//!
//! ## Execution Flow
//!
//! [`orchestrator::execute`] runs the steps in order:
//!
//! 1.  **Repository check**: The history root must be a git working tree.
//! 2.  **Scan**: Collect every reference under the target directory.
//! 3.  **Plan**: Resolve each distinct path once and build the edit list.
//! 4.  **Apply**: Rewrite files, one read-modify-write per file.

pub mod apply;
pub mod cache;
pub mod config;
pub mod error;
pub mod git;
pub mod orchestrator;
pub mod output;
pub mod plan;
pub mod reference;
pub mod scanner;
pub mod summary;

#[cfg(test)]
mod reference_proptest;
