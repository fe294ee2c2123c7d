//! Studyfeed - live feedback log client
//!
//! Studyfeed follows the message log of a study or category on a monitoring
//! server. A snapshot is fetched over REST, then kept current by push events
//! arriving on a persistent WebSocket channel authenticated with a bearer token.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Records, live view, session models and ports
//! - **Service Layer** (`services`): Event bus, credentials, connection, session, reconciliation
//! - **Application Layer** (`application`): Wiring and the per-subject dashboard
//! - **Adapters** (`adapters`): REST and WebSocket implementations of the ports
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging, token storage
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use studyfeed::{ClientContext, ConfigLoader, Dashboard, Subject};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ConfigLoader::load()?);
//!     let dashboard = Dashboard::new(ClientContext::from_config(config)?, Subject::Study(42));
//!     dashboard.start().await;
//!     dashboard.run_until_shutdown().await;
//!     dashboard.stop().await;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{ClientContext, ClientPorts, Dashboard};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AppConfig, ConnectionState, Level, LevelMask, LiveView, LogRecord, LoginInfo, PushEvent,
    RecordId, Subject,
};
pub use domain::ports::{Channel, ChannelConnector, FeedbackClient, LoginClient, TokenStorage};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ConnectionManager, CredentialStore, EventBus, FeedEvent, LiveListReconciler, SessionController,
};
