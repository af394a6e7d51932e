//! # Error Handling
//!
//! This module defines the centralized error type for `action-pins`. It uses
//! `thiserror` to describe every failure mode with a readable message.
//!
//! Errors fall into two groups:
//!
//! - **Fatal**: [`Error::RepositoryInvalid`], [`Error::HistoryUnavailable`],
//!   configuration and scan errors. These abort the run before any file is
//!   written.
//! - **Per file**: [`Error::WriteFailure`]. The applier records these in the
//!   run summary and keeps going with the other files.
//!
//! A path without history is not an error at all; it is reported as
//! [`crate::cache::Resolution::Unresolved`].

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for action-pins operations
#[derive(Error, Debug)]
pub enum Error {
    /// The history root is not a usable git working tree.
    #[error("Not a git working tree: {}: {message}", path.display())]
    RepositoryInvalid { path: PathBuf, message: String },

    /// The history query itself could not run (missing `git`, broken repository,
    /// unexpected output).
    #[error("History unavailable for '{path}': {command} - {stderr}")]
    HistoryUnavailable {
        path: String,
        command: String,
        stderr: String,
    },

    /// Writing the rewritten content of one file failed.
    #[error("Failed to write {}: {message}", path.display())]
    WriteFailure { path: PathBuf, message: String },

    /// An error occurred while parsing the `.action-pins.yaml` configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The directory tree could not be walked or a file could not be read.
    #[error("Scan error at {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    /// An error indicating that a mutex has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
