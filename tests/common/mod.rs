//! Common test utilities for integration tests
//!
//! In-process fakes for every port plus a harness that wires them into a
//! [`ClientContext`] the same way production wiring does.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use studyfeed::domain::models::{
    AccessToken, AppConfig, Level, LogRecord, LogRow, LoginInfo, RecordId, Subject,
};
use studyfeed::domain::ports::{
    Channel, ChannelConnector, FeedbackClient, LogQuery, LoginClient, VisibilityRequest,
};
use studyfeed::infrastructure::credentials::MemoryTokenStorage;
use studyfeed::{ClientContext, ClientPorts, CredentialStore, DomainError, DomainResult};

pub const WAIT: Duration = Duration::from_secs(2);

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn at(seconds: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, seconds / 60, seconds % 60)
        .unwrap()
}

pub fn record(id: i64, study_id: i64, seconds: u32, level: Level) -> LogRecord {
    LogRecord {
        id: RecordId(id),
        study_id: Some(study_id),
        study: Some(format!("study-{study_id}")),
        event_on: at(seconds),
        registered_on: None,
        recorded_on: None,
        recorded_by: Some("reprostim".into()),
        category: None,
        level,
        device_id: Some(1),
        device: Some("scanner-1".into()),
        provider: None,
        description: Some(format!("event {id}")),
    }
}

pub fn ids(rows: &[LogRow]) -> Vec<i64> {
    rows.iter().map(|row| row.record.id.0).collect()
}

pub fn indices(rows: &[LogRow]) -> Vec<usize> {
    rows.iter().map(|row| row.index).collect()
}

/// Wait until `predicate` holds for the watched value.
pub async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, predicate: F)
where
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for watched value")
        .expect("watched value sender dropped");
}

/// Server-side feedback log, filtered by study on fetch.
#[derive(Default)]
pub struct FakeFeedback {
    records: Mutex<Vec<LogRecord>>,
    pub visibility_requests: Mutex<Vec<VisibilityRequest>>,
    pub fetch_log_calls: AtomicUsize,
}

impl FakeFeedback {
    pub fn with_records(records: Vec<LogRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Self::default()
        })
    }

    pub fn insert(&self, record: LogRecord) {
        self.records.lock().push(record);
    }

    pub fn remove(&self, id: i64) {
        self.records.lock().retain(|r| r.id.0 != id);
    }
}

#[async_trait]
impl FeedbackClient for FakeFeedback {
    async fn fetch_log(&self, query: &LogQuery) -> DomainResult<Vec<LogRecord>> {
        self.fetch_log_calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.lock();
        Ok(match query.subject {
            Subject::Study(id) => records
                .iter()
                .filter(|r| r.study_id == Some(id))
                .cloned()
                .collect(),
            Subject::Category(_) => records.clone(),
        })
    }

    async fn fetch_one(&self, id: RecordId) -> DomainResult<Option<LogRecord>> {
        Ok(self.records.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn set_visibility(&self, request: &VisibilityRequest) -> DomainResult<u64> {
        self.visibility_requests.lock().push(*request);
        if request.visible {
            return Ok(0);
        }
        let Subject::Study(study) = request.subject else {
            return Ok(0);
        };
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.study_id != Some(study));
        Ok((before - records.len()) as u64)
    }
}

/// Identity endpoint answering whatever the test put in `user`.
pub struct FakeLogin {
    user: Mutex<Option<LoginInfo>>,
    pub identity_calls: AtomicUsize,
}

impl FakeLogin {
    pub fn answering(user: Option<LoginInfo>) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(user),
            identity_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_user(&self, user: Option<LoginInfo>) {
        *self.user.lock() = user;
    }
}

pub fn jdoe() -> LoginInfo {
    LoginInfo {
        is_logged_in: true,
        username: Some("jdoe".into()),
        first_name: Some("Jane".into()),
        last_name: Some("Doe".into()),
    }
}

#[async_trait]
impl LoginClient for FakeLogin {
    async fn current_user(&self) -> DomainResult<LoginInfo> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.user
            .lock()
            .clone()
            .ok_or_else(|| DomainError::Unauthorized("get_current_user returned 401".into()))
    }

    async fn access_token(&self, username: &str, password: &str) -> DomainResult<AccessToken> {
        if username == "jdoe" && password == "secret" {
            Ok(AccessToken {
                access_token: "fresh-token".into(),
                token_type: "bearer".into(),
            })
        } else {
            Err(DomainError::LoginRejected(
                "Incorrect username or password".into(),
            ))
        }
    }
}

/// Test side of one opened channel.
pub struct ServerEnd {
    /// Frames to deliver to the client; dropping it closes the channel.
    pub push: mpsc::UnboundedSender<String>,
    /// Frames the client sent, handshake first.
    pub received: mpsc::UnboundedReceiver<String>,
}

impl ServerEnd {
    pub async fn handshake(&mut self) -> String {
        tokio::time::timeout(WAIT, self.received.recv())
            .await
            .expect("timed out waiting for handshake")
            .expect("client dropped the channel")
    }

    pub fn send(&self, frame: serde_json::Value) {
        self.push
            .send(frame.to_string())
            .expect("client stopped reading");
    }
}

pub struct FakeChannel {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Channel for FakeChannel {
    async fn send_text(&mut self, text: &str) -> DomainResult<()> {
        self.outbound
            .send(text.to_string())
            .map_err(|_| DomainError::Transport("server end dropped".into()))
    }

    async fn next_frame(&mut self) -> Option<DomainResult<String>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> DomainResult<()> {
        self.inbound.close();
        Ok(())
    }
}

/// Connector handing the server end of every opened channel to the test.
pub struct FakeConnector {
    servers: mpsc::UnboundedSender<ServerEnd>,
    pub opened: AtomicUsize,
}

impl FakeConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (servers, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                servers,
                opened: AtomicUsize::new(0),
            }),
            rx,
        )
    }
}

#[async_trait]
impl ChannelConnector for FakeConnector {
    async fn open(&self, _endpoint: &str) -> DomainResult<Box<dyn Channel>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let (push, inbound) = mpsc::unbounded_channel();
        let (outbound, received) = mpsc::unbounded_channel();
        let _ = self.servers.send(ServerEnd { push, received });
        Ok(Box::new(FakeChannel { inbound, outbound }))
    }
}

pub struct Harness {
    pub context: ClientContext,
    pub feedback: Arc<FakeFeedback>,
    pub login: Arc<FakeLogin>,
    pub connector: Arc<FakeConnector>,
    pub servers: mpsc::UnboundedReceiver<ServerEnd>,
}

impl Harness {
    /// In-memory token slot seeded with `token`.
    pub fn new(token: Option<&str>, feedback: Arc<FakeFeedback>, login: Arc<FakeLogin>) -> Self {
        let storage = match token {
            Some(token) => MemoryTokenStorage::with_token(token),
            None => MemoryTokenStorage::new(),
        };
        let credentials = Arc::new(CredentialStore::new(Arc::new(storage)));
        Self::with_credentials(credentials, feedback, login)
    }

    pub fn with_credentials(
        credentials: Arc<CredentialStore>,
        feedback: Arc<FakeFeedback>,
        login: Arc<FakeLogin>,
    ) -> Self {
        let (connector, servers) = FakeConnector::new();
        let context = ClientContext::with_ports(
            Arc::new(AppConfig::default()),
            credentials,
            ClientPorts {
                feedback: feedback.clone(),
                login: login.clone(),
                connector: connector.clone(),
            },
        );
        Self {
            context,
            feedback,
            login,
            connector,
            servers,
        }
    }

    pub async fn next_server(&mut self) -> ServerEnd {
        tokio::time::timeout(WAIT, self.servers.recv())
            .await
            .expect("timed out waiting for the client to open a channel")
            .expect("connector dropped")
    }
}

/// Poll `condition` until it holds or [`WAIT`] elapses.
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
