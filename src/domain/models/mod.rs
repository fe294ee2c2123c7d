//! Domain models: records, the live view, push events, session and configuration.

pub mod config;
pub mod live_view;
pub mod push;
pub mod record;
pub mod session;
pub mod subject;

pub use config::{AppConfig, CredentialsConfig, LoggingConfig, ViewportConfig};
pub use live_view::{rows_that_fit, LiveView, LogRow};
pub use push::{PushEvent, PushTopic, TOPIC_LOG_ADD, TOPIC_LOG_DELETE, TOPIC_LOG_REFRESH};
pub use record::{Level, LevelMask, LogRecord, RecordId};
pub use session::{AccessToken, ConnectionState, LoginInfo};
pub use subject::Subject;
