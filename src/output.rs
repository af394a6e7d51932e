//! # Output Configuration
//!
//! This module controls how reports look on the terminal: whether the status
//! line carries colors and emoji, based on terminal capabilities and user
//! preferences. The report lines themselves never change with this setting,
//! so planned and applied runs stay diffable.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```
//! use action_pins::output::{emoji, OutputConfig};
//!
//! let config = OutputConfig::from_env_and_flag("never");
//! assert_eq!(emoji(&config, "✅ ", ""), "");
//! ```

use std::env;

use console::Style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `always`: colors on, even when `NO_COLOR` is set
    /// - `never`: colors off
    /// - anything else: treated as `auto`
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Decide on colors from the environment, for `--color=auto`.
    ///
    /// The report goes to stdout, so that is the stream whose terminal
    /// capabilities count. Variables are checked in precedence order.
    fn detect_color_support() -> bool {
        // NO_COLOR wins whenever it is present, even if empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        // CLICOLOR=0 opts out
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        // CLICOLOR_FORCE opts in, also when stdout is piped
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        // Otherwise ask console whether stdout is a color-capable TTY
        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    ///
    /// Mostly useful in tests that assert on styled output.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
///
/// # Arguments
/// * `config` - The output configuration
/// * `emoji_str` - Shown on color-capable terminals
/// * `plain` - Shown everywhere else, usually an empty string or a tag
///   such as `[OK]`
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Apply `style` to `text` when colors are enabled.
///
/// The result depends only on `config`, never on `console`'s own terminal
/// detection.
pub fn paint(config: &OutputConfig, text: &str, style: Style) -> String {
    if config.use_color {
        style.force_styling(true).apply_to(text).to_string()
    } else {
        text.to_string()
    }
}
