//! Push notifications delivered over the persistent channel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::RecordId;
use super::subject::{id_value, Subject};
use crate::domain::errors::{DomainError, DomainResult};

/// Topic asking consumers to re-fetch the whole log for a subject.
pub const TOPIC_LOG_REFRESH: &str = "feedback-log-refresh";
/// Topic announcing one new record.
pub const TOPIC_LOG_ADD: &str = "feedback-log-add";
/// Topic announcing records hidden or removed on the server.
pub const TOPIC_LOG_DELETE: &str = "feedback-log-delete";

/// Decoded server push envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Topic name, e.g. `feedback-log-add`.
    pub topic: String,
    /// Topic-specific payload; `{}` when absent.
    #[serde(default = "empty_body")]
    pub body: Value,
    /// Server send time, as formatted by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    /// Originating service, when the server sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

/// Topics this client reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushTopic {
    /// `feedback-log-refresh`.
    Refresh,
    /// `feedback-log-add`.
    Add,
    /// `feedback-log-delete`.
    Delete,
    /// Anything else; ignored.
    Other,
}

impl PushEvent {
    /// Event with no timestamp or sender.
    pub fn new(topic: impl Into<String>, body: Value) -> Self {
        Self {
            topic: topic.into(),
            body,
            ts: None,
            sender: None,
        }
    }

    /// Decode one inbound text frame.
    pub fn decode(frame: &str) -> DomainResult<Self> {
        let mut event: Self = serde_json::from_str(frame)?;
        if event.body.is_null() {
            event.body = empty_body();
        }
        if !event.body.is_object() {
            return Err(DomainError::Decode(format!(
                "push body for topic {} is not an object: {}",
                event.topic, event.body
            )));
        }
        if event.topic.is_empty() {
            return Err(DomainError::Decode("push frame has an empty topic".into()));
        }
        Ok(event)
    }

    /// Classify the topic string.
    pub fn kind(&self) -> PushTopic {
        match self.topic.as_str() {
            TOPIC_LOG_REFRESH => PushTopic::Refresh,
            TOPIC_LOG_ADD => PushTopic::Add,
            TOPIC_LOG_DELETE => PushTopic::Delete,
            _ => PushTopic::Other,
        }
    }

    /// Whether the body names `subject`.
    pub fn concerns(&self, subject: &Subject) -> bool {
        subject.matches_body(&self.body)
    }

    /// Record announced by an add event.
    pub fn record_id(&self) -> Option<RecordId> {
        self.body.get("message_id").and_then(id_value).map(RecordId)
    }

    /// Records listed by a delete event.
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.body
            .get("message_ids")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(id_value).map(RecordId).collect())
            .unwrap_or_default()
    }
}
