use std::collections::VecDeque;
use std::pin::Pin;

use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};

/// Event emitted by a streaming chat completion.
///
/// This is a closed set: every generation turn is a sequence of zero or more
/// `TextFragment`/`ToolCallDelta` events followed by exactly one `EndOfTurn`.
/// Tool-call arguments arrive as string fragments keyed by `index` and must
/// be accumulated by the caller before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelEvent {
    TextFragment {
        text: String,
    },

    ToolCallDelta {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    EndOfTurn {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

// ============================================================================
// Wire types for OpenAI-compatible chat completion chunks
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatStreamChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallChunk>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallChunk {
    pub index: u32,
    pub id: Option<String>,
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

impl ChatStreamChunk {
    fn to_model_events(&self) -> Vec<ModelEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(ModelEvent::TextFragment {
                        text: content.clone(),
                    });
                }
            }

            if let Some(tool_calls) = &choice.delta.tool_calls {
                for tc in tool_calls {
                    events.push(ModelEvent::ToolCallDelta {
                        index: tc.index,
                        id: tc.id.clone(),
                        name: tc.function.as_ref().and_then(|f| f.name.clone()),
                        arguments: tc.function.as_ref().and_then(|f| f.arguments.clone()),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(ModelEvent::EndOfTurn {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

/// Parse an OpenAI-compatible `text/event-stream` response body into
/// [`ModelEvent`]s.
///
/// The byte stream is buffered and split on newline boundaries, so a `data:`
/// line split across network reads is reassembled before parsing.
pub fn parse_model_sse_stream(
    response: Response,
) -> Pin<Box<dyn Stream<Item = Result<ModelEvent>> + Send>> {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);
        let mut done = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        let Ok(line_str) = std::str::from_utf8(&line_bytes) else {
                            continue;
                        };
                        let line = line_str.trim();

                        if line.is_empty() {
                            continue;
                        }

                        if let Some(data) = line.strip_prefix("data: ") {
                            if data == "[DONE]" {
                                if !done {
                                    done = true;
                                    yield Ok(ModelEvent::EndOfTurn { finish_reason: None });
                                }
                                break;
                            }

                            match serde_json::from_str::<ChatStreamChunk>(data) {
                                Ok(chunk) => {
                                    for event in chunk.to_model_events() {
                                        if matches!(event, ModelEvent::EndOfTurn { .. }) {
                                            done = true;
                                        }
                                        yield Ok(event);
                                    }
                                }
                                Err(e) => {
                                    yield Err(anyhow::anyhow!("failed to parse stream chunk: {}", e));
                                }
                            }
                        }
                    }

                    if done {
                        break;
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("stream error: {}", e));
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_with_content_becomes_text_fragment() {
        let chunk: ChatStreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"content":"Hello","tool_calls":null},"finish_reason":null}]}"#,
        )
        .unwrap();

        let events = chunk.to_model_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ModelEvent::TextFragment { text } => assert_eq!(text, "Hello"),
            other => panic!("expected TextFragment, got {:?}", other),
        }
    }

    #[test]
    fn chunk_with_tool_call_delta_is_forwarded() {
        let chunk: ChatStreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"content":null,"tool_calls":[{"index":0,"id":"call_1","function":{"name":"search_legal_documents","arguments":"{\"qu"}}]},"finish_reason":null}]}"#,
        )
        .unwrap();

        let events = chunk.to_model_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ModelEvent::ToolCallDelta { index, id, name, arguments } => {
                assert_eq!(*index, 0);
                assert_eq!(id.as_deref(), Some("call_1"));
                assert_eq!(name.as_deref(), Some("search_legal_documents"));
                assert_eq!(arguments.as_deref(), Some("{\"qu"));
            }
            other => panic!("expected ToolCallDelta, got {:?}", other),
        }
    }

    #[test]
    fn finish_reason_yields_end_of_turn() {
        let chunk: ChatStreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"content":null,"tool_calls":null},"finish_reason":"tool_calls"}]}"#,
        )
        .unwrap();

        let events = chunk.to_model_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ModelEvent::EndOfTurn { finish_reason } => {
                assert_eq!(finish_reason.as_deref(), Some("tool_calls"));
            }
            other => panic!("expected EndOfTurn, got {:?}", other),
        }
    }

    #[test]
    fn content_and_finish_in_same_chunk_preserve_order() {
        let chunk: ChatStreamChunk = serde_json::from_str(
            r#"{"choices":[{"delta":{"content":"bye","tool_calls":null},"finish_reason":"stop"}]}"#,
        )
        .unwrap();

        let events = chunk.to_model_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ModelEvent::TextFragment { .. }));
        assert!(matches!(events[1], ModelEvent::EndOfTurn { .. }));
    }

    #[test]
    fn model_event_serde_round_trip() {
        let event = ModelEvent::ToolCallDelta {
            index: 1,
            id: None,
            name: None,
            arguments: Some("ery\"}".to_string()),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"tool_call_delta\""));

        let back: ModelEvent = serde_json::from_str(&json).unwrap();
        match back {
            ModelEvent::ToolCallDelta { index, arguments, .. } => {
                assert_eq!(index, 1);
                assert_eq!(arguments.as_deref(), Some("ery\"}"));
            }
            other => panic!("expected ToolCallDelta, got {:?}", other),
        }
    }
}
