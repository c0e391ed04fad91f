use legalgpt_llm::Message;
use legalgpt_persist::{MessageRole, StoredMessage};

/// Rebuild model input from persisted rows, one message per row.
///
/// The caller prepends the system prompt; this function only mirrors the
/// thread's history, so its output length is always twice the number of
/// completed turns plus the number of tool rows.
pub fn build_model_history(stored: &[StoredMessage]) -> Vec<Message> {
    stored
        .iter()
        .map(|row| match row.role {
            MessageRole::Human => Message::human(&row.content),
            MessageRole::Ai => Message::ai(&row.content),
            MessageRole::Tool => Message::tool_result(tool_call_id(row), &row.content),
        })
        .collect()
}

fn tool_call_id(row: &StoredMessage) -> String {
    row.tool_data
        .as_ref()
        .and_then(|data| data.get("tool_call_id"))
        .and_then(|id| id.as_str())
        .map(str::to_string)
        // Rows written before call ids were recorded still need a stable one.
        .unwrap_or_else(|| format!("call_{}", row.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_length_is_two_per_turn_plus_tool_rows() {
        // Two completed turns, one of which used a tool.
        let rows = vec![
            StoredMessage::human("t1", "What is Section 420 IPC?"),
            StoredMessage::tool(
                "t1",
                "search_legal_documents",
                r#"{"results_count":1}"#,
                json!({"tool_call_id": "call_1"}),
            ),
            StoredMessage::assistant("t1", "Section 420 deals with cheating."),
            StoredMessage::human("t1", "What is the punishment?"),
            StoredMessage::assistant("t1", "Up to seven years imprisonment and fine."),
        ];

        let history = build_model_history(&rows);
        assert_eq!(history.len(), 2 * 2 + 1);
    }

    #[test]
    fn roles_map_to_model_wire_roles() {
        let rows = vec![
            StoredMessage::human("t1", "hi"),
            StoredMessage::assistant("t1", "hello"),
            StoredMessage::tool("t1", "search_legal_documents", "{}", json!({"tool_call_id": "c9"})),
        ];

        let history = build_model_history(&rows);
        assert_eq!(history[0].role(), "user");
        assert_eq!(history[1].role(), "assistant");
        assert_eq!(history[2].role(), "tool");
        match &history[2] {
            Message::Tool { tool_call_id, .. } => assert_eq!(tool_call_id, "c9"),
            other => panic!("expected tool message, got {:?}", other),
        }
    }

    #[test]
    fn tool_row_without_call_id_gets_a_synthesized_one() {
        let row = StoredMessage::tool("t1", "search_legal_documents", "{}", json!({}));
        let history = build_model_history(std::slice::from_ref(&row));
        match &history[0] {
            Message::Tool { tool_call_id, .. } => {
                assert_eq!(tool_call_id, &format!("call_{}", row.id));
            }
            other => panic!("expected tool message, got {:?}", other),
        }
    }
}
