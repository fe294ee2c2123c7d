//! `studyfeed logout`

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::application::ClientContext;
use crate::cli::output::{action_success, output, CommandOutput};
use crate::domain::models::AppConfig;

/// Result of `logout`.
#[derive(Debug, Serialize)]
pub struct LogoutOutput {
    /// Always `true`; logout cannot fail.
    pub success: bool,
    /// Whether a token was stored before logging out.
    pub had_token: bool,
}

impl CommandOutput for LogoutOutput {
    fn to_human(&self) -> String {
        if self.had_token {
            action_success("Logged out")
        } else {
            action_success("No stored token, nothing to do")
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Forget the stored token.
pub async fn execute(config: Arc<AppConfig>, json_mode: bool) -> Result<()> {
    let context = ClientContext::from_config(config).context("Failed to initialize client")?;
    let had_token = context.credentials().has_valid();
    context.session().logout().await;

    output(
        &LogoutOutput {
            success: true,
            had_token,
        },
        json_mode,
    );
    Ok(())
}
