use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a stored message.
///
/// `Tool` rows always carry a `tool_name`; `Human`/`Ai` rows never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Ai,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::Tool => "tool",
        }
    }
}

/// A single persisted chat message.
///
/// Ordering within a thread is `created_at` (insertion) order; history
/// reconstruction relies on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_data: Option<Value>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn human(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::Human, content, None, None)
    }

    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::Ai, content, None, None)
    }

    pub fn tool(
        thread_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        tool_data: Value,
    ) -> Self {
        Self::new(
            thread_id,
            MessageRole::Tool,
            content,
            Some(tool_name.into()),
            Some(tool_data),
        )
    }

    fn new(
        thread_id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
        tool_name: Option<String>,
        tool_data: Option<Value>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            role,
            content: content.into(),
            tool_name,
            tool_data,
            created_at: Utc::now(),
        }
    }
}
