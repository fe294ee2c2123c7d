//! Command-line edge: argument parsing, config loading and output.

pub mod commands;
pub mod display;
pub mod output;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::models::AppConfig;
use crate::infrastructure::config::ConfigLoader;
pub use types::{Cli, Commands, SubjectArgs};

/// Load configuration for a CLI invocation.
///
/// `--config` replaces the project files; `--server` is applied last.
pub fn load_config(path: Option<&Path>, server: Option<&str>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    match server {
        Some(origin) => ConfigLoader::rebase(config, origin)
            .with_context(|| format!("Failed to point client at {origin}")),
        None => Ok(config),
    }
}

/// Report a failed command and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("{}", output::action_failure(&format!("{err:#}")));
    }
    std::process::exit(1);
}
