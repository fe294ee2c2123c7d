//! What a live view follows: one study or one category.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What a live view is scoped to.
///
/// The server filters the message log by either a study or a category, never
/// both; the enum makes that exclusivity unrepresentable to violate. The same
/// key is used for snapshot queries and for matching push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Subject {
    /// A single study by id.
    Study(i64),
    /// All studies in a category.
    Category(i64),
}

impl Subject {
    /// Query/body key naming this subject on the wire.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Study(_) => "study_id",
            Self::Category(_) => "category_id",
        }
    }

    /// Numeric id of the study or category.
    pub const fn id(&self) -> i64 {
        match self {
            Self::Study(id) | Self::Category(id) => *id,
        }
    }

    /// Whether a push event body addresses this subject.
    pub fn matches_body(&self, body: &Value) -> bool {
        body.get(self.key())
            .and_then(id_value)
            .is_some_and(|id| id == self.id())
    }

    /// Query parameter selecting this subject.
    pub fn query_pair(&self) -> (&'static str, String) {
        (self.key(), self.id().to_string())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Study(id) => write!(f, "study:{id}"),
            Self::Category(id) => write!(f, "category:{id}"),
        }
    }
}

/// Ids arrive as JSON numbers; some producers send them as numeric strings.
pub(crate) fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_own_key_only() {
        let study = Subject::Study(7);
        assert!(study.matches_body(&json!({"study_id": 7, "category_id": 1})));
        assert!(!study.matches_body(&json!({"study_id": 8})));
        assert!(!study.matches_body(&json!({"category_id": 7})));

        let category = Subject::Category(1);
        assert!(category.matches_body(&json!({"category_id": "1"})));
        assert!(!category.matches_body(&json!({"study_id": 1})));
    }

    #[test]
    fn test_null_subject_key_never_matches() {
        assert!(!Subject::Study(0).matches_body(&json!({"study_id": null})));
    }

    #[test]
    fn test_query_pair() {
        assert_eq!(
            Subject::Category(3).query_pair(),
            ("category_id", "3".to_string())
        );
        assert_eq!(Subject::Study(9).to_string(), "study:9");
    }
}
