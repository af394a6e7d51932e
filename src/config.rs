//! # Configuration
//!
//! `action-pins` works without any configuration. An optional
//! `.action-pins.yaml` file can adjust what is scanned:
//!
//! ```yaml
//! # Owner/repository whose pins are maintained
//! prefix: XRPLF/actions
//! # File extensions that may contain pins
//! extensions: [yml, yaml]
//! # Glob patterns (relative to the scanned directory) to skip
//! exclude:
//!   - "vendor/**"
//! # Worker threads for history lookups and file writes
//! jobs: 4
//! ```
//!
//! Every key is optional and unknown keys are rejected, so a typo never
//! silently falls back to a default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reference::{ReferencePattern, DEFAULT_PREFIX};

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".action-pins.yaml";

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Owner/repository prefix of maintained references.
    pub prefix: String,
    /// Eligible file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Glob patterns for paths to skip, relative to the scanned directory.
    pub exclude: Vec<String>,
    /// Worker threads; `None` lets rayon pick.
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            extensions: vec!["yml".to_string(), "yaml".to_string()],
            exclude: Vec::new(),
            jobs: None,
        }
    }
}

impl Config {
    /// Check values that deserialization alone cannot.
    pub fn validate(&self) -> Result<()> {
        ReferencePattern::new(&self.prefix)?;

        if self.extensions.is_empty() {
            return Err(Error::ConfigParse {
                message: "'extensions' must not be empty".to_string(),
                hint: Some("Remove the key to scan .yml and .yaml files".to_string()),
            });
        }
        if self.jobs == Some(0) {
            return Err(Error::ConfigParse {
                message: "'jobs' must be at least 1".to_string(),
                hint: None,
            });
        }
        for pattern in &self.exclude {
            glob::Pattern::new(pattern)?;
        }
        Ok(())
    }
}

/// Parse configuration from a YAML string.
///
/// An empty or comment-only document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let has_content = yaml_content
        .lines()
        .map(str::trim)
        .any(|l| !l.is_empty() && !l.starts_with('#') && l != "---");
    if !has_content {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("Valid keys are: prefix, extensions, exclude, jobs".to_string()),
    })?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Load configuration for a run.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
/// `search_dir` is used when present, otherwise the defaults.
pub fn load(explicit: Option<&Path>, search_dir: &Path) -> Result<Config> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(Error::ConfigParse {
                    message: format!("Configuration file not found: {}", path.display()),
                    hint: None,
                });
            }
            from_file(path)
        }
        None => {
            let default_path: PathBuf = search_dir.join(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                log::debug!("Using configuration {}", default_path.display());
                from_file(default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}
