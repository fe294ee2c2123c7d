//! Feedback log records as served by the snapshot and detail endpoints.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity level of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Informational.
    #[serde(rename = "INFO")]
    Info,
    /// Needs attention.
    #[serde(rename = "WARNING", alias = "WARN")]
    Warning,
    /// Something failed.
    #[serde(rename = "ERROR")]
    Error,
    /// A level this client does not know about yet.
    #[serde(rename = "UNKNOWN", other)]
    Unknown,
}

impl Level {
    /// Wire spelling of the level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// Level selector for the visibility toggle; `*` selects every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelMask {
    /// Every level.
    #[default]
    Any,
    /// One level only.
    Only(Level),
}

impl fmt::Display for LevelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(level) => f.write_str(level.as_str()),
        }
    }
}

impl FromStr for LevelMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "*" {
            Ok(Self::Any)
        } else {
            s.trim().parse().map(Self::Only)
        }
    }
}

/// One entry of the feedback message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Server-assigned record id.
    pub id: RecordId,
    /// Owning study id.
    #[serde(default)]
    pub study_id: Option<i64>,
    /// Owning study name.
    #[serde(default)]
    pub study: Option<String>,
    /// When the event happened; primary sort key.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub event_on: NaiveDateTime,
    /// When the server stored the record.
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub registered_on: Option<NaiveDateTime>,
    /// When the device recorded the event.
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub recorded_on: Option<NaiveDateTime>,
    /// Who or what recorded the event.
    #[serde(default)]
    pub recorded_by: Option<String>,
    /// Category name.
    #[serde(default)]
    pub category: Option<String>,
    /// Severity.
    pub level: Level,
    /// Reporting device id.
    #[serde(default)]
    pub device_id: Option<i64>,
    /// Reporting device name.
    #[serde(default)]
    pub device: Option<String>,
    /// Data provider name.
    #[serde(default)]
    pub provider: Option<String>,
    /// Free-text message.
    #[serde(default)]
    pub description: Option<String>,
}

impl LogRecord {
    /// Total order used by the live view: event time, then id.
    pub fn ordering_key(&self) -> (NaiveDateTime, RecordId) {
        (self.event_on, self.id)
    }

    /// Compare by [`ordering_key`](Self::ordering_key).
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.ordering_key().cmp(&other.ordering_key())
    }
}

/// Timestamps arrive either naive (`2024-03-01T10:00:00.123`) or with an
/// offset; offset-carrying values are normalized to UTC.
mod timestamp {
    use super::{DateTime, Deserialize, Deserializer, NaiveDateTime};

    fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        if let Ok(ts) = raw.parse::<NaiveDateTime>() {
            return Ok(ts);
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
            return Ok(ts);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.is_empty() => parse(&raw).map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
