//! Session state derived from the identity endpoint.
//!
//! The controller never decides on its own whether the user is logged in; it
//! asks the server whenever connectivity changes and mirrors the answer into
//! two observables. Explicit login/logout requests end with a reload request
//! that the application layer turns into a full client reset.

use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::errors::DomainResult;
use crate::domain::models::LoginInfo;
use crate::domain::ports::LoginClient;
use crate::services::connection_manager::ConnectionManager;
use crate::services::credential_store::CredentialStore;
use crate::services::event_bus::{BusEvent, EventBus, FeedEvent, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCommand {
    FetchIdentity,
}

/// Tracks who is logged in and handles login/logout.
pub struct SessionController {
    login: Arc<dyn LoginClient>,
    credentials: Arc<CredentialStore>,
    connection: Arc<ConnectionManager>,
    bus: Arc<EventBus>,
    current_user: watch::Sender<Option<LoginInfo>>,
    logged_in: watch::Sender<bool>,
    reload: watch::Sender<u64>,
    /// Bumped by logout/stop so late identity answers are ignored.
    epoch: AtomicU64,
    subscription: SyncMutex<Option<Subscription>>,
    worker: SyncMutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    /// Create a controller; call [`start`](Self::start) to follow connectivity.
    pub fn new(
        login: Arc<dyn LoginClient>,
        credentials: Arc<CredentialStore>,
        connection: Arc<ConnectionManager>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            login,
            credentials,
            connection,
            bus,
            current_user: watch::channel(None).0,
            logged_in: watch::channel(false).0,
            reload: watch::channel(0).0,
            epoch: AtomicU64::new(0),
            subscription: SyncMutex::new(None),
            worker: SyncMutex::new(None),
        }
    }

    /// Subscribe to connectivity and fetch the identity right away.
    pub fn start(self: &Arc<Self>) {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _ = tx.send(SessionCommand::FetchIdentity);
        *subscription = Some(self.bus.subscribe(move |event: &BusEvent| {
            if let FeedEvent::Connectivity(connected) = event.payload {
                tracing::debug!(connected, "connectivity changed, refreshing identity");
                let _ = tx.send(SessionCommand::FetchIdentity);
            }
        }));

        let controller = Arc::clone(self);
        let worker = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    SessionCommand::FetchIdentity => controller.refresh_identity().await,
                }
            }
            tracing::debug!("session worker stopped");
        });
        *self.worker.lock() = Some(worker);
    }

    /// Stop following connectivity and ignore identity answers in flight.
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = self.subscription.lock().take() {
            self.bus.unsubscribe(subscription);
        }
        // The worker drains once the handler (and its sender) is gone.
        self.worker.lock().take();
    }

    /// Ask the server who the current credential belongs to.
    pub async fn refresh_identity(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let result = self.login.current_user().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!("discarding identity answer from a previous session");
            return;
        }

        match result {
            Ok(info) => {
                tracing::info!(
                    logged_in = info.is_logged_in,
                    username = info.username.as_deref().unwrap_or("-"),
                    "identity refreshed"
                );
                self.logged_in.send_replace(info.is_logged_in);
                self.current_user.send_replace(Some(info));
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity fetch failed, treating session as logged out");
                self.reset_identity();
            }
        }
    }

    /// Exchange username/password for a token and request a reload.
    ///
    /// The previous credential is dropped before the exchange so a failed
    /// attempt leaves the client logged out. Rejections carry the server's
    /// detail text unchanged.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<()> {
        self.credentials.clear();
        let token = self.login.access_token(username, password).await.map_err(|e| {
            tracing::warn!(username, error = %e, "login rejected");
            e
        })?;

        self.credentials.set(Some(token.access_token));
        tracing::info!(username, "login succeeded");
        self.request_reload();
        Ok(())
    }

    /// Drop the credential, close the channel and request a reload.
    ///
    /// The credential goes first so the identity fetch triggered by the
    /// channel closing is already anonymous. The epoch is bumped after both
    /// so any answer started before then is discarded.
    pub async fn logout(&self) {
        self.credentials.clear();
        self.connection.disconnect().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.reset_identity();
        tracing::info!("logged out");
        self.request_reload();
    }

    /// Ask the application to rebuild its state.
    pub fn request_reload(&self) {
        self.reload.send_modify(|generation| *generation += 1);
    }

    /// Last identity answer, if any.
    pub fn current_user(&self) -> Option<LoginInfo> {
        self.current_user.borrow().clone()
    }

    /// Whether the last identity answer said logged in.
    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    /// Observe identity answers.
    pub fn watch_current_user(&self) -> watch::Receiver<Option<LoginInfo>> {
        self.current_user.subscribe()
    }

    /// Observe the logged-in flag.
    pub fn watch_logged_in(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    /// Reload generation; every change is one reload request.
    pub fn watch_reload(&self) -> watch::Receiver<u64> {
        self.reload.subscribe()
    }

    fn reset_identity(&self) {
        self.current_user.send_replace(None);
        self.logged_in.send_replace(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::domain::models::{AccessToken, ConnectionState};
    use crate::domain::ports::{Channel, ChannelConnector};
    use crate::infrastructure::credentials::MemoryTokenStorage;
    use crate::services::connection_manager::ConnectionConfig;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StubLogin {
        user: SyncMutex<Option<LoginInfo>>,
        calls: AtomicU64,
    }

    impl StubLogin {
        fn answering(user: Option<LoginInfo>) -> Arc<Self> {
            Arc::new(Self {
                user: SyncMutex::new(user),
                calls: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl LoginClient for StubLogin {
        async fn current_user(&self) -> DomainResult<LoginInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.user
                .lock()
                .clone()
                .ok_or_else(|| DomainError::Unauthorized("invalid token".into()))
        }

        async fn access_token(&self, username: &str, password: &str) -> DomainResult<AccessToken> {
            if username == "jdoe" && password == "secret" {
                Ok(AccessToken {
                    access_token: "fresh-token".into(),
                    token_type: "bearer".into(),
                })
            } else {
                Err(DomainError::LoginRejected("Incorrect username or password".into()))
            }
        }
    }

    struct RefusingConnector;

    #[async_trait]
    impl ChannelConnector for RefusingConnector {
        async fn open(&self, _endpoint: &str) -> DomainResult<Box<dyn Channel>> {
            Err(DomainError::Transport("refused".into()))
        }
    }

    /// Accepts every channel; frames never arrive.
    struct IdleConnector;

    struct IdleChannel;

    #[async_trait]
    impl Channel for IdleChannel {
        async fn send_text(&mut self, _text: &str) -> DomainResult<()> {
            Ok(())
        }

        async fn next_frame(&mut self) -> Option<DomainResult<String>> {
            std::future::pending().await
        }

        async fn close(&mut self) -> DomainResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ChannelConnector for IdleConnector {
        async fn open(&self, _endpoint: &str) -> DomainResult<Box<dyn Channel>> {
            Ok(Box::new(IdleChannel))
        }
    }

    fn jdoe() -> LoginInfo {
        LoginInfo {
            is_logged_in: true,
            username: Some("jdoe".into()),
            first_name: None,
            last_name: None,
        }
    }

    fn controller(login: Arc<StubLogin>) -> (Arc<SessionController>, Arc<CredentialStore>, Arc<EventBus>) {
        let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryTokenStorage::new())));
        let bus = Arc::new(EventBus::new());
        let connection = Arc::new(ConnectionManager::new(
            Arc::new(RefusingConnector),
            credentials.clone(),
            bus.clone(),
            ConnectionConfig::new("ws://test/ws"),
        ));
        let session = Arc::new(SessionController::new(
            login,
            credentials.clone(),
            connection,
            bus.clone(),
        ));
        (session, credentials, bus)
    }

    #[tokio::test]
    async fn test_start_fetches_identity() {
        let (session, _, _) = controller(StubLogin::answering(Some(jdoe())));
        let mut logged_in = session.watch_logged_in();
        session.start();

        tokio::time::timeout(Duration::from_secs(1), logged_in.wait_for(|v| *v))
            .await
            .expect("identity should arrive")
            .unwrap();
        assert_eq!(
            session.current_user().and_then(|u| u.username),
            Some("jdoe".to_string())
        );
        session.stop();
    }

    #[tokio::test]
    async fn test_connectivity_loss_refetches_and_degrades() {
        let stub = StubLogin::answering(Some(jdoe()));
        let (session, _, bus) = controller(stub.clone());
        let mut logged_in = session.watch_logged_in();
        session.start();
        tokio::time::timeout(Duration::from_secs(1), logged_in.wait_for(|v| *v))
            .await
            .expect("initial identity")
            .unwrap();

        // The server stops accepting the token and drops the channel.
        *stub.user.lock() = None;
        bus.publish_connectivity(false);

        tokio::time::timeout(Duration::from_secs(1), logged_in.wait_for(|v| !*v))
            .await
            .expect("session should degrade")
            .unwrap();
        assert!(session.current_user().is_none());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
        session.stop();
    }

    #[tokio::test]
    async fn test_login_stores_token_and_requests_reload() {
        let (session, credentials, _) = controller(StubLogin::answering(Some(jdoe())));
        let reload = session.watch_reload();

        session.login("jdoe", "secret").await.unwrap();

        assert_eq!(credentials.get().as_deref(), Some("fresh-token"));
        assert_eq!(*reload.borrow(), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_detail_and_clears_credential() {
        let (session, credentials, _) = controller(StubLogin::answering(Some(jdoe())));
        credentials.set(Some("old".into()));

        let err = session.login("jdoe", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "Incorrect username or password");
        assert!(!credentials.has_valid());
        assert_eq!(*session.watch_reload().borrow(), 0);
    }

    #[tokio::test]
    async fn test_logout_drops_credential_before_channel_closes() {
        let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryTokenStorage::with_token(
            "tok",
        ))));
        let bus = Arc::new(EventBus::new());
        let connection = Arc::new(ConnectionManager::new(
            Arc::new(IdleConnector),
            credentials.clone(),
            bus.clone(),
            ConnectionConfig::new("ws://test/ws"),
        ));
        let stub = StubLogin::answering(Some(jdoe()));
        let session = Arc::new(SessionController::new(
            stub.clone(),
            credentials.clone(),
            connection.clone(),
            bus.clone(),
        ));

        let seen = Arc::new(SyncMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let store = Arc::clone(&credentials);
        let _subscription = bus.subscribe(move |event: &BusEvent| {
            if let FeedEvent::Connectivity(false) = event.payload {
                sink.lock().push(store.has_valid());
            }
        });

        let mut logged_in = session.watch_logged_in();
        session.start();
        assert_eq!(connection.connect().await, ConnectionState::Connected);
        tokio::time::timeout(Duration::from_secs(1), logged_in.wait_for(|v| *v))
            .await
            .expect("initial identity")
            .unwrap();

        // The server stops recognising the dropped token.
        *stub.user.lock() = None;
        session.logout().await;
        let calls = stub.calls.load(Ordering::SeqCst);

        assert_eq!(seen.lock().as_slice(), [false]);
        tokio::time::timeout(Duration::from_secs(1), async {
            while stub.calls.load(Ordering::SeqCst) == calls {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("channel loss should refetch the identity");
        tokio::task::yield_now().await;
        assert!(!session.is_logged_in());
        assert!(session.current_user().is_none());
        session.stop();
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (session, credentials, _) = controller(StubLogin::answering(Some(jdoe())));
        credentials.set(Some("tok".into()));
        session.refresh_identity().await;
        assert!(session.is_logged_in());

        session.logout().await;

        assert!(!session.is_logged_in());
        assert!(session.current_user().is_none());
        assert!(!credentials.has_valid());
        assert_eq!(*session.watch_reload().borrow(), 1);
    }
}
