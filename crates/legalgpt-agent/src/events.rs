use serde_json::{json, Value};

/// One event of the client-facing turn stream.
///
/// `MessageEnd` and `Error` are terminal: exactly one of them closes every
/// turn, and nothing follows it.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    MessageStart { role: String },
    ContentDelta { text: String },
    ToolUseStart { tool_name: String },
    ToolUseEnd { tool_name: String, outcome: ToolOutcome },
    MessageEnd { content: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Result(Value),
    Error(String),
}

impl OutboundEvent {
    pub fn assistant_start() -> Self {
        Self::MessageStart {
            role: "assistant".to_string(),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageStart { .. } => "message_start",
            Self::ContentDelta { .. } => "content_delta",
            Self::ToolUseStart { .. } => "tool_use_start",
            Self::ToolUseEnd { .. } => "tool_use_end",
            Self::MessageEnd { .. } => "message_end",
            Self::Error { .. } => "error",
        }
    }

    /// Payload for the SSE `data:` line, always a complete JSON document.
    pub fn data(&self) -> Value {
        match self {
            Self::MessageStart { role } => json!({ "role": role }),
            Self::ContentDelta { text } => json!({ "text": text }),
            Self::ToolUseStart { tool_name } => json!({ "tool_name": tool_name }),
            Self::ToolUseEnd { tool_name, outcome } => match outcome {
                ToolOutcome::Result(result) => json!({ "tool_name": tool_name, "result": result }),
                ToolOutcome::Error(error) => json!({ "tool_name": tool_name, "error": error }),
            },
            Self::MessageEnd { content } => json!({ "content": content }),
            Self::Error { message } => json!({ "message": message }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MessageEnd { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_use_end_carries_result_or_error_never_both() {
        let ok = OutboundEvent::ToolUseEnd {
            tool_name: "search_legal_documents".to_string(),
            outcome: ToolOutcome::Result(json!({"results_count": 2})),
        };
        let data = ok.data();
        assert!(data.get("result").is_some());
        assert!(data.get("error").is_none());

        let failed = OutboundEvent::ToolUseEnd {
            tool_name: "search_legal_documents".to_string(),
            outcome: ToolOutcome::Error("document search unavailable".to_string()),
        };
        let data = failed.data();
        assert!(data.get("result").is_none());
        assert!(data.get("error").is_some());
    }

    #[test]
    fn terminal_events_are_exactly_end_and_error() {
        assert!(OutboundEvent::MessageEnd { content: "done".into() }.is_terminal());
        assert!(OutboundEvent::Error { message: "failed".into() }.is_terminal());
        assert!(!OutboundEvent::assistant_start().is_terminal());
        assert!(!OutboundEvent::ContentDelta { text: "x".into() }.is_terminal());
    }
}
