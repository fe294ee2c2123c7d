//! `studyfeed login`

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use super::IdentityOutput;
use crate::application::ClientContext;
use crate::cli::output::output;
use crate::domain::models::AppConfig;

/// Arguments for `login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account name
    #[arg(short, long)]
    pub username: String,

    /// Account password
    #[arg(short, long, env = "STUDYFEED_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Exchange credentials for a token and report who is logged in.
pub async fn execute(args: LoginArgs, config: Arc<AppConfig>, json_mode: bool) -> Result<()> {
    let context = ClientContext::from_config(config).context("Failed to initialize client")?;
    let session = context.session();

    // The server's rejection text is the message the user sees.
    session.login(&args.username, &args.password).await?;
    session.refresh_identity().await;

    output(&IdentityOutput::from(session.current_user()), json_mode);
    Ok(())
}
