//! Persistent push channel lifecycle.
//!
//! ```text
//! Disconnected --connect--> Connecting --open--> AwaitingAuth --token sent--> Connected
//!      ^                        |                     |                          |
//!      +------------------------+---------------------+--------------------------+
//!                         error / close / disconnect
//! ```
//!
//! Every transition into `Connected` publishes `Connectivity(true)` on the
//! event bus, every transition out of it (or out of an attempt) publishes
//! `Connectivity(false)`. Transitions happen under one mutex and are tagged
//! with a generation so a reader task of a replaced channel cannot touch the
//! state of its successor.

use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::domain::errors::DomainError;
use crate::domain::models::{ConnectionState, PushEvent};
use crate::domain::ports::{Channel, ChannelConnector};
use crate::services::credential_store::CredentialStore;
use crate::services::event_bus::EventBus;

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Full channel endpoint, e.g. `ws://host/api/1/ws`.
    pub endpoint: String,
    /// Fixed delay between reconnect checks.
    pub reconnect_interval: Duration,
}

impl ConnectionConfig {
    /// Config for `endpoint` with the default 60 s reconnect interval.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reconnect_interval: Duration::from_secs(60),
        }
    }

    /// Override the reconnect interval.
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }
}

#[derive(Debug)]
struct Inner {
    state: ConnectionState,
    generation: u64,
    /// Stops the reader task of the live channel.
    shutdown: Option<oneshot::Sender<()>>,
}

/// Owns the push channel and keeps it connected while a credential exists.
pub struct ConnectionManager {
    connector: Arc<dyn ChannelConnector>,
    credentials: Arc<CredentialStore>,
    bus: Arc<EventBus>,
    config: ConnectionConfig,
    inner: Mutex<Inner>,
    reconnect_suppressed: AtomicBool,
    timer: SyncMutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Create a disconnected manager; call [`start`](Self::start) for the reconnect timer.
    pub fn new(
        connector: Arc<dyn ChannelConnector>,
        credentials: Arc<CredentialStore>,
        bus: Arc<EventBus>,
        config: ConnectionConfig,
    ) -> Self {
        Self {
            connector,
            credentials,
            bus,
            config,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                generation: 0,
                shutdown: None,
            }),
            reconnect_suppressed: AtomicBool::new(false),
            timer: SyncMutex::new(None),
        }
    }

    /// Current state of the channel.
    pub async fn state(&self) -> ConnectionState {
        self.inner.lock().await.state
    }

    /// Whether the state is [`ConnectionState::Connected`].
    pub async fn is_connected(&self) -> bool {
        self.state().await.is_connected()
    }

    /// Whether an explicit disconnect is holding the reconnect timer back.
    pub fn is_reconnect_suppressed(&self) -> bool {
        self.reconnect_suppressed.load(Ordering::Acquire)
    }

    /// Open and authenticate the channel.
    ///
    /// A no-op unless currently disconnected. Lifts a reconnect suppression
    /// left by [`disconnect`](Self::disconnect). Failures are logged and
    /// leave the manager disconnected; the returned state says where the
    /// attempt ended.
    pub async fn connect(self: &Arc<Self>) -> ConnectionState {
        self.reconnect_suppressed.store(false, Ordering::Release);
        self.open_channel().await
    }

    /// Close the channel and keep it closed until the next explicit connect.
    pub async fn disconnect(&self) {
        self.reconnect_suppressed.store(true, Ordering::Release);

        let mut inner = self.inner.lock().await;
        if let Some(shutdown) = inner.shutdown.take() {
            let _ = shutdown.send(());
        }
        // Also invalidates an attempt that is still opening.
        inner.generation += 1;
        if inner.state != ConnectionState::Disconnected {
            inner.state = ConnectionState::Disconnected;
            tracing::info!(endpoint = %self.config.endpoint, "push channel disconnected");
            self.bus.publish_connectivity(false);
        }
    }

    /// One reconnect check. Returns whether a connect attempt was made.
    pub async fn tick(self: &Arc<Self>) -> bool {
        if self.is_reconnect_suppressed() {
            return false;
        }
        if self.state().await != ConnectionState::Disconnected {
            return false;
        }
        if !self.credentials.has_valid() {
            tracing::debug!("reconnect skipped, no valid credential");
            return false;
        }

        tracing::debug!(endpoint = %self.config.endpoint, "reconnect tick");
        self.open_channel().await;
        true
    }

    /// Spawn the reconnect timer. Calling it twice restarts the timer.
    pub fn start(self: &Arc<Self>) {
        let period = self.config.reconnect_interval;
        let manager: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.tick().await;
            }
        });

        if let Some(previous) = self.timer.lock().replace(handle) {
            previous.abort();
        }
        tracing::debug!(interval_secs = period.as_secs(), "reconnect timer started");
    }

    /// Cancel the reconnect timer and close the channel.
    pub async fn stop(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.abort();
        }
        self.disconnect().await;
    }

    async fn open_channel(self: &Arc<Self>) -> ConnectionState {
        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.state != ConnectionState::Disconnected {
                return inner.state;
            }
            inner.generation += 1;
            inner.state = ConnectionState::Connecting;
            inner.generation
        };

        tracing::debug!(endpoint = %self.config.endpoint, generation, "opening push channel");
        let mut channel = match self.connector.open(&self.config.endpoint).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(endpoint = %self.config.endpoint, error = %e, "failed to open push channel");
                return self.mark_disconnected(generation).await;
            }
        };

        if !self.advance(generation, ConnectionState::AwaitingAuth).await {
            let _ = channel.close().await;
            return self.state().await;
        }

        let Some(token) = self.credentials.get() else {
            tracing::info!("no credential for handshake, closing push channel");
            let _ = channel.close().await;
            return self.mark_disconnected(generation).await;
        };

        if let Err(e) = channel.send_text(&token).await {
            tracing::warn!(error = %e, "failed to send handshake");
            let _ = channel.close().await;
            return self.mark_disconnected(generation).await;
        }

        let shutdown_rx = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                drop(inner);
                let _ = channel.close().await;
                return self.state().await;
            }
            let (tx, rx) = oneshot::channel();
            inner.shutdown = Some(tx);
            inner.state = ConnectionState::Connected;
            tracing::info!(endpoint = %self.config.endpoint, generation, "push channel connected");
            self.bus.publish_connectivity(true);
            rx
        };

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.read_loop(channel, generation, shutdown_rx).await;
        });
        ConnectionState::Connected
    }

    async fn read_loop(
        self: Arc<Self>,
        mut channel: Box<dyn Channel>,
        generation: u64,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    let _ = channel.close().await;
                    break;
                }
                frame = channel.next_frame() => match frame {
                    Some(Ok(text)) => self.dispatch(generation, &text).await,
                    Some(Err(DomainError::Decode(reason))) => {
                        tracing::warn!(%reason, "dropping undecodable push frame");
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "push channel failed");
                        break;
                    }
                    None => {
                        tracing::info!("push channel closed by server");
                        break;
                    }
                },
            }
        }
        self.mark_disconnected(generation).await;
    }

    async fn dispatch(&self, generation: u64, frame: &str) {
        let event = match PushEvent::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, frame_len = frame.len(), "dropping malformed push frame");
                return;
            }
        };

        let inner = self.inner.lock().await;
        if inner.generation != generation || !inner.state.is_connected() {
            return;
        }
        tracing::debug!(topic = %event.topic, "push event received");
        self.bus.publish_push(event);
    }

    /// Move to `next` if the attempt is still current.
    async fn advance(&self, generation: u64, next: ConnectionState) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return false;
        }
        inner.state = next;
        true
    }

    async fn mark_disconnected(&self, generation: u64) -> ConnectionState {
        let mut inner = self.inner.lock().await;
        if inner.generation == generation && inner.state != ConnectionState::Disconnected {
            inner.state = ConnectionState::Disconnected;
            inner.shutdown = None;
            self.bus.publish_connectivity(false);
        }
        inner.state
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.abort();
        }
    }
}
