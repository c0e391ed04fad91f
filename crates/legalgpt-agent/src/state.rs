use serde::Serialize;
use serde_json::{json, Value};

/// One tool call executed during a turn, as recorded in the checkpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Value,
    pub ok: bool,
}

/// Mutable accumulator for a single turn.
///
/// `content` grows append-only across rounds; it becomes the assistant
/// message on completion and is discarded on failure or disconnect.
#[derive(Debug, Default)]
pub struct TurnState {
    pub content: String,
    pub rounds: usize,
    pub tool_invocations: Vec<ToolInvocation>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub fn record_tool(&mut self, tool_name: &str, raw_args: &str, ok: bool) {
        // Keep unparseable arguments verbatim rather than losing them.
        let arguments = serde_json::from_str(raw_args)
            .unwrap_or_else(|_| Value::String(raw_args.to_string()));
        self.tool_invocations.push(ToolInvocation {
            tool_name: tool_name.to_string(),
            arguments,
            ok,
        });
    }

    /// Checkpoint snapshot written once per completed turn.
    pub fn snapshot(&self) -> Value {
        json!({
            "rounds": self.rounds,
            "tool_invocations": self.tool_invocations,
            "content_chars": self.content.chars().count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_rounds_and_tools() {
        let mut state = TurnState::new();
        state.rounds = 2;
        state.push_text("Section 420 IPC covers cheating.");
        state.record_tool("search_legal_documents", r#"{"query":"420"}"#, true);
        state.record_tool("get_document_by_reference", "{broken", false);

        let snap = state.snapshot();
        assert_eq!(snap["rounds"], json!(2));
        assert_eq!(snap["tool_invocations"].as_array().unwrap().len(), 2);
        assert_eq!(snap["tool_invocations"][0]["ok"], json!(true));
        assert_eq!(snap["tool_invocations"][0]["arguments"]["query"], json!("420"));
        // Unparseable arguments survive as a raw string.
        assert_eq!(snap["tool_invocations"][1]["arguments"], json!("{broken"));
        assert_eq!(snap["content_chars"], json!(32));
    }
}
