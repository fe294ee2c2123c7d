//! Feedback log REST port.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::DomainResult;
use crate::domain::models::{LevelMask, LogRecord, RecordId, Subject};

/// Snapshot query for one subject's message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    /// Study or category to fetch.
    pub subject: Subject,
    /// Only records newer than this window; `None` fetches everything.
    pub lookback: Option<Duration>,
}

/// Request to show or hide records of a subject on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityRequest {
    /// Study or category to toggle.
    pub subject: Subject,
    /// `false` hides, `true` shows.
    pub visible: bool,
    /// Levels affected.
    pub level: LevelMask,
    /// Restrict the toggle to recent records.
    pub lookback: Option<Duration>,
}

/// Port for the feedback endpoints of the monitoring server.
///
/// Implementations attach the current bearer credential themselves; callers
/// only deal with typed records.
#[async_trait]
pub trait FeedbackClient: Send + Sync {
    /// Fetch every visible record for the query, in any order.
    async fn fetch_log(&self, query: &LogQuery) -> DomainResult<Vec<LogRecord>>;

    /// Fetch one record by id.
    ///
    /// # Returns
    /// - `Some(record)` if the server still has it
    /// - `None` if it was deleted or superseded
    async fn fetch_one(&self, id: RecordId) -> DomainResult<Option<LogRecord>>;

    /// Toggle visibility and return the number of affected records.
    async fn set_visibility(&self, request: &VisibilityRequest) -> DomainResult<u64>;
}
