use serde::{Deserialize, Serialize};

use crate::rows::Row;

/// One message from the database change feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealtimePayload {
    #[serde(rename = "eventType", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_timestamp: Option<String>,
    #[serde(rename = "new", default, skip_serializing_if = "Option::is_none")]
    pub new_row: Option<Row>,
    #[serde(rename = "old", default, skip_serializing_if = "Option::is_none")]
    pub old_row: Option<Row>,
}

impl RealtimePayload {
    /// A blank event type counts as missing.
    pub fn event(&self) -> Option<ChangeEvent> {
        self.event_type
            .as_deref()
            .filter(|event| !event.trim().is_empty())
            .map(ChangeEvent::parse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
    Other(String),
}

impl ChangeEvent {
    /// Case-insensitive.
    pub fn parse(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Other(name) => name,
        }
    }
}
