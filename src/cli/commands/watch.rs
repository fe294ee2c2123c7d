//! `studyfeed watch`

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use super::IdentityOutput;
use crate::application::{ClientContext, Dashboard};
use crate::cli::display::render_page;
use crate::cli::output::{output, CommandOutput};
use crate::cli::types::SubjectArgs;
use crate::domain::models::{AppConfig, LiveView};

/// Arguments for `watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Study or category to follow.
    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Only list records from the last N seconds (0 = whole log)
    #[arg(long, value_name = "SECS")]
    pub lookback_secs: Option<u64>,

    /// Print the current snapshot and exit instead of following pushes
    #[arg(long)]
    pub once: bool,
}

/// One rendered page of the live view.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct LiveViewOutput(pub LiveView);

impl CommandOutput for LiveViewOutput {
    fn to_human(&self) -> String {
        render_page(&self.0)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Follow the live log until ctrl-c, or print one page with `--once`.
pub async fn execute(args: WatchArgs, config: Arc<AppConfig>, json_mode: bool) -> Result<()> {
    let subject = args.subject.subject()?;
    let config = match args.lookback_secs {
        Some(secs) => {
            let mut config = (*config).clone();
            config.lookback_secs = secs;
            Arc::new(config)
        }
        None => config,
    };

    let context = ClientContext::from_config(config).context("Failed to initialize client")?;
    let dashboard = Dashboard::new(context, subject);

    if args.once {
        dashboard
            .reconciler()
            .full_refresh()
            .await
            .with_context(|| format!("Failed to fetch feedback log for {subject}"))?;
        output(&LiveViewOutput(dashboard.reconciler().view()), json_mode);
        return Ok(());
    }

    let mut snapshots = dashboard.reconciler().watch();
    let mut identity = dashboard.context().session().watch_current_user();
    let renderer = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = snapshots.borrow_and_update().clone();
                    output(&LiveViewOutput(view), json_mode);
                }
                changed = identity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let user = identity.borrow_and_update().clone();
                    if !json_mode {
                        eprintln!("{}", IdentityOutput::from(user).to_human());
                    }
                }
            }
        }
    });

    let state = dashboard.start().await;
    tracing::info!(%subject, %state, "watching feedback log");

    dashboard.run_until_shutdown().await;
    dashboard.stop().await;
    renderer.abort();
    Ok(())
}
