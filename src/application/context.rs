//! Session-level wiring shared by every command.

use std::sync::Arc;

use crate::adapters::{ApiClient, WebSocketConnector};
use crate::domain::errors::DomainResult;
use crate::domain::models::AppConfig;
use crate::domain::ports::{ChannelConnector, FeedbackClient, LoginClient, TokenStorage};
use crate::infrastructure::credentials::FileTokenStorage;
use crate::services::{
    ConnectionConfig, ConnectionManager, CredentialStore, EventBus, SessionController,
};

/// External collaborators the client talks to.
#[derive(Clone)]
pub struct ClientPorts {
    /// REST access to the feedback log.
    pub feedback: Arc<dyn FeedbackClient>,
    /// Identity and token endpoints.
    pub login: Arc<dyn LoginClient>,
    /// Push channel transport.
    pub connector: Arc<dyn ChannelConnector>,
}

/// Credential, transport and session components for one server.
///
/// Built once from an immutable [`AppConfig`]; subject-scoped views are
/// layered on top by [`Dashboard`](super::Dashboard).
#[derive(Clone)]
pub struct ClientContext {
    config: Arc<AppConfig>,
    credentials: Arc<CredentialStore>,
    bus: Arc<EventBus>,
    connection: Arc<ConnectionManager>,
    session: Arc<SessionController>,
    feedback: Arc<dyn FeedbackClient>,
}

impl ClientContext {
    /// Production wiring: file-backed token, REST client, WebSocket channel.
    pub fn from_config(config: Arc<AppConfig>) -> DomainResult<Self> {
        let storage: Arc<dyn TokenStorage> =
            Arc::new(FileTokenStorage::from_config(&config.credentials));
        let credentials = Arc::new(
            CredentialStore::new(storage).with_fallback(config.debug_access_token.clone()),
        );
        let api = Arc::new(ApiClient::new(&config, Arc::clone(&credentials))?);
        let ports = ClientPorts {
            feedback: api.clone(),
            login: api,
            connector: Arc::new(WebSocketConnector::new()),
        };
        Ok(Self::with_ports(config, credentials, ports))
    }

    /// Wire the services around caller-supplied ports.
    pub fn with_ports(
        config: Arc<AppConfig>,
        credentials: Arc<CredentialStore>,
        ports: ClientPorts,
    ) -> Self {
        let bus = Arc::new(EventBus::new());
        let connection = Arc::new(ConnectionManager::new(
            ports.connector,
            Arc::clone(&credentials),
            Arc::clone(&bus),
            ConnectionConfig::new(config.ws_endpoint())
                .with_reconnect_interval(config.reconnect_interval()),
        ));
        let session = Arc::new(SessionController::new(
            ports.login,
            Arc::clone(&credentials),
            Arc::clone(&connection),
            Arc::clone(&bus),
        ));

        Self {
            config,
            credentials,
            bus,
            connection,
            session,
            feedback: ports.feedback,
        }
    }

    /// Shared configuration.
    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    /// Token owner.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Event bus shared by all services.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Push channel manager.
    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    /// Session controller.
    pub fn session(&self) -> &Arc<SessionController> {
        &self.session
    }

    /// REST client for the feedback log.
    pub fn feedback(&self) -> &Arc<dyn FeedbackClient> {
        &self.feedback
    }
}
