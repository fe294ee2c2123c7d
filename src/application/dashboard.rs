//! Live dashboard for one subject.
//!
//! Owns the reconciler for the mounted subject on top of a
//! [`ClientContext`], starts and stops everything symmetrically and turns
//! reload requests from the session into a full client reset.

use std::future::Future;
use std::sync::Arc;

use crate::application::context::ClientContext;
use crate::domain::models::{rows_that_fit, ConnectionState, Subject};
use crate::services::{LiveListReconciler, ReconcilerConfig};

/// Live view of one subject plus the session around it.
pub struct Dashboard {
    context: ClientContext,
    reconciler: Arc<LiveListReconciler>,
}

impl Dashboard {
    /// Create a dashboard; nothing runs until [`start`](Self::start).
    pub fn new(context: ClientContext, subject: Subject) -> Self {
        let config = context.config();
        let reconciler = Arc::new(LiveListReconciler::new(
            subject,
            Arc::clone(context.feedback()),
            Arc::clone(context.bus()),
            ReconcilerConfig {
                lookback: config.lookback(),
                page_size: rows_that_fit(config.viewport.height, config.viewport.row_height),
            },
        ));
        Self {
            context,
            reconciler,
        }
    }

    /// Services shared with other dashboards.
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// Reconciler of this dashboard's subject.
    pub fn reconciler(&self) -> &Arc<LiveListReconciler> {
        &self.reconciler
    }

    /// Start consumers before the producer so no connectivity event is missed.
    pub async fn start(&self) -> ConnectionState {
        tracing::info!(subject = %self.reconciler.subject(), "starting dashboard");
        self.context.session().start();
        self.reconciler.start();
        self.context.connection().start();
        self.context.connection().connect().await
    }

    /// Stop the channel first, then the consumers.
    pub async fn stop(&self) {
        self.reconciler.stop();
        self.context.session().stop();
        self.context.connection().stop().await;
        tracing::info!(subject = %self.reconciler.subject(), "dashboard stopped");
    }

    /// Full reload of client state: reconnect, re-identify, re-fetch.
    pub async fn reload(&self) -> ConnectionState {
        tracing::info!("reloading client state");
        let connection = self.context.connection();
        connection.disconnect().await;
        let state = connection.connect().await;

        self.context.session().refresh_identity().await;
        if let Err(e) = self.reconciler.full_refresh().await {
            tracing::warn!(error = %e, "refresh after reload failed");
        }
        state
    }

    /// Serve reload requests until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut reload = self.context.session().watch_reload();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                changed = reload.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.reload().await;
                }
            }
        }
    }

    /// [`run_until`](Self::run_until) ctrl-c.
    pub async fn run_until_shutdown(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await;
    }
}
