//! `studyfeed whoami`

use anyhow::{Context, Result};
use std::sync::Arc;

use super::IdentityOutput;
use crate::application::ClientContext;
use crate::cli::output::output;
use crate::domain::models::AppConfig;

/// Ask the server who the stored token belongs to.
pub async fn execute(config: Arc<AppConfig>, json_mode: bool) -> Result<()> {
    let context = ClientContext::from_config(config).context("Failed to initialize client")?;
    let session = context.session();
    session.refresh_identity().await;

    output(&IdentityOutput::from(session.current_user()), json_mode);
    Ok(())
}
