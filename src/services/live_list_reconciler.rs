//! Live list reconciliation for one subject.
//!
//! Two sources feed the view: full snapshots fetched on demand and single
//! record updates announced over the push channel. Both are applied to the
//! same [`LiveView`], which is owned by a `watch` sender so every mutation is
//! also a snapshot for observers.
//!
//! Event handlers only enqueue commands; one worker task executes them in
//! arrival order. A push add racing an in-flight refresh is accepted: the
//! outcome depends on which fetch completes last.

use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    rows_that_fit, LevelMask, LiveView, PushEvent, PushTopic, RecordId, Subject, ViewportConfig,
};
use crate::domain::ports::{FeedbackClient, LogQuery, VisibilityRequest};
use crate::services::event_bus::{BusEvent, EventBus, FeedEvent, Subscription};

/// Snapshot type handed to observers.
pub type LiveViewSnapshot = LiveView;

/// Configuration for a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Only fetch records newer than this window.
    pub lookback: Option<Duration>,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        let viewport = ViewportConfig::default();
        Self {
            lookback: Some(Duration::from_secs(86_400)),
            page_size: rows_that_fit(viewport.height, viewport.row_height),
        }
    }
}

/// Whether a reconciliation step changed the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The view changed.
    Applied,
    /// Nothing to apply, or the result belonged to a stopped reconciler.
    Dropped,
}

/// Work derived from push events for this subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileCommand {
    /// Refetch the whole snapshot.
    Refresh,
    /// Fetch and insert one record.
    Add(RecordId),
    /// Remove records from the view.
    Remove(Vec<RecordId>),
}

impl ReconcileCommand {
    /// Map a push event to a command if it concerns `subject`.
    pub fn from_push(event: &PushEvent, subject: &Subject) -> Option<Self> {
        if !event.concerns(subject) {
            return None;
        }
        match event.kind() {
            PushTopic::Refresh => Some(Self::Refresh),
            PushTopic::Add => {
                let id = event.record_id();
                if id.is_none() {
                    tracing::warn!(topic = %event.topic, "add event without message_id");
                }
                id.map(Self::Add)
            }
            PushTopic::Delete => Some(Self::Remove(event.record_ids())),
            PushTopic::Other => None,
        }
    }
}

/// Keeps a subject's [`LiveView`] in step with the server.
///
/// Push events are turned into [`ReconcileCommand`]s and applied one at a time
/// by a worker task.
pub struct LiveListReconciler {
    subject: Subject,
    feedback: Arc<dyn FeedbackClient>,
    bus: Arc<EventBus>,
    lookback: Option<Duration>,
    view: watch::Sender<LiveView>,
    epoch: AtomicU64,
    subscription: SyncMutex<Option<Subscription>>,
    worker: SyncMutex<Option<JoinHandle<()>>>,
}

impl LiveListReconciler {
    /// Create a stopped reconciler with an empty view.
    pub fn new(
        subject: Subject,
        feedback: Arc<dyn FeedbackClient>,
        bus: Arc<EventBus>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            subject,
            feedback,
            bus,
            lookback: config.lookback,
            view: watch::channel(LiveView::new(subject, config.page_size)).0,
            epoch: AtomicU64::new(0),
            subscription: SyncMutex::new(None),
            worker: SyncMutex::new(None),
        }
    }

    /// Subject this reconciler follows.
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Subscribe to matching push events and enqueue the initial refresh.
    pub fn start(self: &Arc<Self>) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _ = tx.send(ReconcileCommand::Refresh);

        let subject = self.subject;
        *subscription = Some(self.bus.subscribe(move |event: &BusEvent| {
            let FeedEvent::Push(push) = &event.payload else {
                return;
            };
            if let Some(command) = ReconcileCommand::from_push(push, &subject) {
                tracing::debug!(%subject, ?command, sequence = %event.sequence, "reconcile command queued");
                let _ = tx.send(command);
            }
        }));

        let reconciler = Arc::clone(self);
        let worker = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                reconciler.execute(command).await;
            }
            tracing::debug!(subject = %reconciler.subject, "reconciler worker stopped");
        });
        *self.worker.lock() = Some(worker);
        tracing::info!(subject = %self.subject, "live list reconciler started");
    }

    /// Stop reacting to events and discard results of in-flight fetches.
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = self.subscription.lock().take() {
            self.bus.unsubscribe(subscription);
        }
        self.worker.lock().take();
        tracing::info!(subject = %self.subject, "live list reconciler stopped");
    }

    /// Whether the push worker is running.
    pub fn is_running(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Run one command, logging instead of returning failures.
    pub async fn execute(&self, command: ReconcileCommand) {
        let result = match command {
            ReconcileCommand::Refresh => self.full_refresh().await,
            ReconcileCommand::Add(id) => self.apply_add(id).await,
            ReconcileCommand::Remove(ids) => Ok(self.apply_remove(&ids)),
        };
        if let Err(e) = result {
            tracing::warn!(subject = %self.subject, error = %e, "reconciliation abandoned, view unchanged");
        }
    }

    /// Replace the view with a fresh snapshot and follow its newest record.
    pub async fn full_refresh(&self) -> DomainResult<ReconcileOutcome> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let query = LogQuery {
            subject: self.subject,
            lookback: self.lookback,
        };
        let records = self.feedback.fetch_log(&query).await?;
        if self.is_stale(epoch) {
            return Ok(ReconcileOutcome::Dropped);
        }

        let count = records.len();
        self.view.send_modify(|view| view.replace_all(records));
        tracing::debug!(subject = %self.subject, count, "full refresh applied");
        Ok(ReconcileOutcome::Applied)
    }

    /// Fetch one announced record and insert it in order.
    ///
    /// A record the server no longer has is silently dropped.
    pub async fn apply_add(&self, id: RecordId) -> DomainResult<ReconcileOutcome> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let Some(record) = self.feedback.fetch_one(id).await? else {
            tracing::debug!(record_id = id.0, "announced record is gone, dropping update");
            return Ok(ReconcileOutcome::Dropped);
        };
        if self.is_stale(epoch) {
            return Ok(ReconcileOutcome::Dropped);
        }

        self.view.send_modify(|view| {
            let position = view.insert(record);
            tracing::debug!(record_id = id.0, position, "record inserted");
        });
        Ok(ReconcileOutcome::Applied)
    }

    /// Drop `ids` from the view.
    pub fn apply_remove(&self, ids: &[RecordId]) -> ReconcileOutcome {
        let removed = self.view.send_if_modified(|view| view.remove(ids) > 0);
        if removed {
            tracing::debug!(count = ids.len(), "records removed");
            ReconcileOutcome::Applied
        } else {
            ReconcileOutcome::Dropped
        }
    }

    /// Show or hide records on the server, then reload the snapshot.
    pub async fn set_visibility(&self, visible: bool, level: LevelMask) -> DomainResult<u64> {
        let request = VisibilityRequest {
            subject: self.subject,
            visible,
            level,
            lookback: self.lookback,
        };
        let affected = self.feedback.set_visibility(&request).await?;
        tracing::info!(subject = %self.subject, visible, %level, affected, "visibility updated");
        self.full_refresh().await?;
        Ok(affected)
    }

    /// Follow a record picked by the user. No fetch involved.
    pub fn select(&self, id: RecordId) -> bool {
        self.view.send_if_modified(|view| view.select(id))
    }

    /// Recompute the page size for a new viewport.
    pub fn resize(&self, viewport_height: u32, row_height: u32) {
        self.view
            .send_modify(|view| view.resize(viewport_height, row_height));
    }

    /// Copy of the current view.
    pub fn view(&self) -> LiveViewSnapshot {
        self.view.borrow().clone()
    }

    /// Observe every published view.
    pub fn watch(&self) -> watch::Receiver<LiveViewSnapshot> {
        self.view.subscribe()
    }

    fn is_stale(&self, epoch: u64) -> bool {
        let stale = self.epoch.load(Ordering::SeqCst) != epoch;
        if stale {
            tracing::debug!(subject = %self.subject, "discarding result fetched before stop");
        }
        stale
    }
}
