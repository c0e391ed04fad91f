use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use legalgpt_llm::{
    ChatModelClient, ChatOptions, ChatRequest, Message, ModelEvent, ToolCall, ToolChoice,
};
use legalgpt_persist::{MessageStore, StoredMessage, DEFAULT_THREAD_TITLE};
use legalgpt_tools::{tool_definitions, ToolDispatcher};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::OrchestratorConfig;
use crate::events::{OutboundEvent, ToolOutcome};
use crate::history::build_model_history;
use crate::locks::ThreadLocks;
use crate::state::TurnState;

const MAX_TITLE_CHARS: usize = 80;

const GENERIC_ERROR_MESSAGE: &str =
    "The assistant could not complete this response. Please try again.";

const ROUND_LIMIT_NOTICE: &str = "\n\nI reached the limit of research steps for this turn, \
     so the answer above may be incomplete. Ask a follow-up question to continue.";

/// Drives one user message through model rounds and tool calls to a
/// terminal event.
///
/// Every turn emits `message_start` followed by deltas and tool events, and
/// closes with exactly one `message_end` or `error`. Turns on the same
/// thread are serialized; see [`ThreadLocks`].
#[derive(Clone)]
pub struct TurnOrchestrator {
    model: Arc<dyn ChatModelClient>,
    dispatcher: Arc<ToolDispatcher>,
    store: Arc<dyn MessageStore>,
    config: OrchestratorConfig,
    locks: Arc<ThreadLocks>,
}

enum RoundsOutcome {
    Completed,
    Disconnected,
}

#[derive(Default)]
struct ToolCallBuffer {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl TurnOrchestrator {
    pub fn new(
        model: Arc<dyn ChatModelClient>,
        dispatcher: Arc<ToolDispatcher>,
        store: Arc<dyn MessageStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            model,
            dispatcher,
            store,
            config,
            locks: Arc::new(ThreadLocks::new()),
        }
    }

    /// Run a turn in the background, returning its event stream.
    ///
    /// The receiver sees the full event sequence for the turn; dropping it
    /// cancels streaming without cancelling in-flight tool persistence.
    pub fn spawn_turn(
        &self,
        thread_id: &str,
        user_id: &str,
        text: &str,
    ) -> mpsc::Receiver<OutboundEvent> {
        let (tx, rx) = mpsc::channel(self.config.event_buffer);
        let orchestrator = self.clone();
        let thread_id = thread_id.to_string();
        let user_id = user_id.to_string();
        let text = text.to_string();

        tokio::spawn(async move {
            let guard = orchestrator.locks.acquire(&thread_id).lock_owned().await;
            let result = orchestrator.run_turn(&thread_id, &user_id, &text, &tx).await;
            drop(guard);

            if let Err(e) = result {
                // Full detail stays in the logs; the client gets a generic
                // message.
                error!(thread_id = %thread_id, error = %e, "turn failed");
                let _ = tx
                    .send(OutboundEvent::Error {
                        message: GENERIC_ERROR_MESSAGE.to_string(),
                    })
                    .await;
            }
        });

        rx
    }

    async fn run_turn(
        &self,
        thread_id: &str,
        user_id: &str,
        text: &str,
        tx: &mpsc::Sender<OutboundEvent>,
    ) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            let _ = tx
                .send(OutboundEvent::Error {
                    message: "Message text must not be empty.".to_string(),
                })
                .await;
            return Ok(());
        }

        info!(thread_id, user_id, "starting turn");

        self.store
            .append_message(StoredMessage::human(thread_id, trimmed))
            .await
            .context("failed to persist user message")?;

        let stored = self
            .store
            .list_messages(thread_id)
            .await
            .context("failed to load thread history")?;
        let mut history = Vec::with_capacity(stored.len() + 1);
        history.push(Message::system(&self.config.system_prompt));
        history.extend(build_model_history(&stored));

        if tx.send(OutboundEvent::assistant_start()).await.is_err() {
            debug!(thread_id, "client disconnected before the turn started");
            return Ok(());
        }

        let mut state = TurnState::new();
        let outcome = match tokio::time::timeout(
            self.config.turn_timeout,
            self.drive_rounds(thread_id, &mut history, &mut state, tx),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => anyhow::bail!(
                "turn exceeded its {}s timeout",
                self.config.turn_timeout.as_secs()
            ),
        };

        match outcome {
            RoundsOutcome::Disconnected => {
                debug!(thread_id, "client disconnected mid-turn, partial response discarded");
                Ok(())
            }
            RoundsOutcome::Completed => self.finalize_turn(thread_id, trimmed, &state, tx).await,
        }
    }

    /// One round per model call: stream text out, collect tool-call deltas,
    /// then either finish or execute the calls and go again.
    async fn drive_rounds(
        &self,
        thread_id: &str,
        history: &mut Vec<Message>,
        state: &mut TurnState,
        tx: &mpsc::Sender<OutboundEvent>,
    ) -> Result<RoundsOutcome> {
        loop {
            if state.rounds >= self.config.max_rounds {
                warn!(thread_id, rounds = state.rounds, "round limit reached, truncating turn");
                state.push_text(ROUND_LIMIT_NOTICE);
                if tx
                    .send(OutboundEvent::ContentDelta {
                        text: ROUND_LIMIT_NOTICE.to_string(),
                    })
                    .await
                    .is_err()
                {
                    return Ok(RoundsOutcome::Disconnected);
                }
                return Ok(RoundsOutcome::Completed);
            }
            state.rounds += 1;

            let request = ChatRequest::new(&self.config.model, history.clone())
                .with_options(self.chat_options());
            let mut stream = self
                .model
                .stream_chat(request)
                .await
                .context("model stream could not be opened")?;

            let mut round_text = String::new();
            let mut pending: BTreeMap<u32, ToolCallBuffer> = BTreeMap::new();

            while let Some(event) = stream.next().await {
                match event.context("model stream broke mid-round")? {
                    ModelEvent::TextFragment { text } => {
                        round_text.push_str(&text);
                        state.push_text(&text);
                        if tx.send(OutboundEvent::ContentDelta { text }).await.is_err() {
                            return Ok(RoundsOutcome::Disconnected);
                        }
                    }
                    ModelEvent::ToolCallDelta {
                        index,
                        id,
                        name,
                        arguments,
                    } => {
                        let buffer = pending.entry(index).or_default();
                        if let Some(id) = id {
                            buffer.id = Some(id);
                        }
                        if let Some(name) = name {
                            buffer.name = Some(name);
                        }
                        if let Some(fragment) = arguments {
                            buffer.arguments.push_str(&fragment);
                        }
                    }
                    ModelEvent::EndOfTurn { .. } => break,
                }
            }

            if pending.is_empty() {
                return Ok(RoundsOutcome::Completed);
            }

            let calls: Vec<ToolCall> = pending
                .into_values()
                .enumerate()
                .map(|(i, buffer)| {
                    ToolCall::new(
                        buffer.id.unwrap_or_else(|| format!("call_{}", i)),
                        buffer.name.unwrap_or_default(),
                        buffer.arguments,
                    )
                })
                .collect();

            history.push(Message::ai_with_tools(
                if round_text.is_empty() {
                    None
                } else {
                    Some(round_text.clone())
                },
                calls.clone(),
            ));

            for call in &calls {
                let disconnected = self
                    .execute_tool_call(thread_id, call, state, history, tx)
                    .await?;
                if disconnected {
                    return Ok(RoundsOutcome::Disconnected);
                }
            }
        }
    }

    /// Returns `true` when the client has gone away.
    async fn execute_tool_call(
        &self,
        thread_id: &str,
        call: &ToolCall,
        state: &mut TurnState,
        history: &mut Vec<Message>,
        tx: &mpsc::Sender<OutboundEvent>,
    ) -> Result<bool> {
        let tool_name = call.function.name.clone();

        if tx
            .send(OutboundEvent::ToolUseStart {
                tool_name: tool_name.clone(),
            })
            .await
            .is_err()
        {
            // Not dispatched yet, nothing in flight to finish.
            return Ok(true);
        }

        match self
            .dispatcher
            .invoke(&tool_name, &call.function.arguments)
            .await
        {
            Ok(result) => {
                let content = result.to_string();
                let tool_data = json!({
                    "tool_call_id": call.id,
                    "arguments": parse_arguments(&call.function.arguments),
                    "result": result,
                });
                // The call already ran; its row is written whether or not
                // the client is still listening.
                self.store
                    .append_message(StoredMessage::tool(thread_id, &tool_name, &content, tool_data))
                    .await
                    .context("failed to persist tool result")?;
                state.record_tool(&tool_name, &call.function.arguments, true);
                history.push(Message::tool_result(&call.id, &content));

                if tx
                    .send(OutboundEvent::ToolUseEnd {
                        tool_name,
                        outcome: ToolOutcome::Result(result),
                    })
                    .await
                    .is_err()
                {
                    return Ok(true);
                }
            }
            Err(e) => {
                warn!(thread_id, tool = %tool_name, error = %e, "tool call failed");
                state.record_tool(&tool_name, &call.function.arguments, false);
                let error_text = e.to_string();
                // The model sees the failure as a tool result and can react.
                history.push(Message::tool_result(
                    &call.id,
                    format!("Tool '{}' failed: {}", tool_name, error_text),
                ));

                if tx
                    .send(OutboundEvent::ToolUseEnd {
                        tool_name,
                        outcome: ToolOutcome::Error(error_text),
                    })
                    .await
                    .is_err()
                {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    async fn finalize_turn(
        &self,
        thread_id: &str,
        human_text: &str,
        state: &TurnState,
        tx: &mpsc::Sender<OutboundEvent>,
    ) -> Result<()> {
        self.store
            .append_message(StoredMessage::assistant(thread_id, &state.content))
            .await
            .context("failed to persist assistant message")?;
        self.store
            .append_checkpoint(thread_id, state.snapshot())
            .await
            .context("failed to persist checkpoint")?;

        let title = self.pending_title(thread_id, human_text).await?;
        self.store
            .touch_thread(thread_id, title.as_deref())
            .await
            .context("failed to update thread")?;

        info!(
            thread_id,
            rounds = state.rounds,
            tools = state.tool_invocations.len(),
            "turn completed"
        );

        // message_end only after every write landed.
        let _ = tx
            .send(OutboundEvent::MessageEnd {
                content: state.content.clone(),
            })
            .await;
        Ok(())
    }

    /// First completed turn names the thread after the user's message.
    async fn pending_title(&self, thread_id: &str, human_text: &str) -> Result<Option<String>> {
        let thread = self.store.get_thread(thread_id).await?;
        Ok(match thread {
            Some(t) if t.title == DEFAULT_THREAD_TITLE => Some(derive_title(human_text)),
            _ => None,
        })
    }

    fn chat_options(&self) -> ChatOptions {
        let mut options = ChatOptions::new()
            .tools(tool_definitions())
            .tool_choice(ToolChoice::auto());
        if let Some(temperature) = self.config.temperature {
            options = options.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        options
    }
}

fn parse_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn derive_title(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or(text).trim();
    first_line.chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_first_line_capped_at_eighty_chars() {
        assert_eq!(derive_title("What is Section 420 IPC?"), "What is Section 420 IPC?");
        assert_eq!(derive_title("First line\nsecond line"), "First line");

        let long = "x".repeat(200);
        assert_eq!(derive_title(&long).chars().count(), 80);
    }

    #[test]
    fn raw_arguments_fall_back_to_string() {
        assert_eq!(parse_arguments(r#"{"query":"420"}"#)["query"], "420");
        assert_eq!(parse_arguments("{oops"), Value::String("{oops".to_string()));
    }
}
