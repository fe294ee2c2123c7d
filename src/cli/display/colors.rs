//! Level colour mapping for CLI output.
//!
//! `console` disables styling on its own when stdout is not a terminal or
//! `NO_COLOR` is set.

use console::{style, StyledObject};

use crate::domain::models::Level;

/// Error = red bold, Warning = yellow, Info = default, Unknown = dim.
pub fn colorize_level(level: Level) -> StyledObject<&'static str> {
    let label = level.as_str();
    match level {
        Level::Error => style(label).red().bold(),
        Level::Warning => style(label).yellow(),
        Level::Info => style(label),
        Level::Unknown => style(label).dim(),
    }
}
