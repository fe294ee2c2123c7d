//! `studyfeed hide` / `studyfeed show`

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use crate::application::{ClientContext, Dashboard};
use crate::cli::output::{action_success, output, CommandOutput};
use crate::cli::types::SubjectArgs;
use crate::domain::models::{AppConfig, LevelMask, Subject};

/// Arguments for `hide` and `show`.
#[derive(Args, Debug)]
pub struct VisibilityArgs {
    /// Study or category to toggle.
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Level to toggle (INFO, WARNING, ERROR or * for all)
    #[arg(short, long, default_value = "*")]
    pub level: LevelMask,
}

/// Result of a visibility toggle.
#[derive(Debug, Serialize)]
pub struct VisibilityOutput {
    /// Subject that was toggled.
    pub subject: Subject,
    /// Requested visibility.
    pub visible: bool,
    /// Level selector, `*` for all.
    pub level: String,
    /// Records the server reported as changed.
    pub affected: u64,
    /// Records left in the refreshed view.
    pub remaining: usize,
}

impl CommandOutput for VisibilityOutput {
    fn to_human(&self) -> String {
        let verb = if self.visible { "Showed" } else { "Hid" };
        action_success(&format!(
            "{verb} {} {} record(s) for {}, {} now listed",
            self.affected, self.level, self.subject, self.remaining
        ))
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Toggle visibility for the subject, then refetch it.
pub async fn execute(
    args: VisibilityArgs,
    visible: bool,
    config: Arc<AppConfig>,
    json_mode: bool,
) -> Result<()> {
    let subject = args.subject.subject()?;
    let context = ClientContext::from_config(config).context("Failed to initialize client")?;
    let dashboard = Dashboard::new(context, subject);
    let reconciler = dashboard.reconciler();

    let affected = reconciler
        .set_visibility(visible, args.level)
        .await
        .with_context(|| format!("Failed to change visibility for {subject}"))?;

    output(
        &VisibilityOutput {
            subject,
            visible,
            level: args.level.to_string(),
            affected,
            remaining: reconciler.view().len(),
        },
        json_mode,
    );
    Ok(())
}
