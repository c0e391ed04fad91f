use std::pin::Pin;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::streaming::{parse_model_sse_stream, ModelEvent};
use crate::types::{Message, Tool, ToolChoice};

pub type ModelEventStream = Pin<Box<dyn Stream<Item = Result<ModelEvent>> + Send>>;

/// Streaming chat access to a hosted model.
///
/// One call opens one generation stream; streams are not resumable, a new
/// round means a new call.
#[async_trait]
pub trait ChatModelClient: Send + Sync {
    async fn stream_chat(&self, request: ChatRequest) -> Result<ModelEventStream>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<ToolChoice>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

/// HTTP client for any endpoint speaking the OpenAI chat-completions wire
/// format, which includes Ollama's `/v1` compatibility surface.
///
/// The API key and base URL are fixed at construction; nothing about the
/// client mutates after startup.
pub struct OpenAiCompatClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAiCompatClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .context("invalid API key format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_chat_payload(&self, request: &ChatRequest) -> Result<Value> {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(convert_message)
            .collect::<Result<Vec<_>>>()?;

        let mut payload = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": true,
        });

        let obj = payload.as_object_mut().unwrap();

        if let Some(temp) = request.options.temperature {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.options.max_tokens {
            obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(tools) = &request.options.tools {
            obj.insert("tools".to_string(), serde_json::to_value(tools)?);
        }
        if let Some(tool_choice) = &request.options.tool_choice {
            obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
        }

        Ok(payload)
    }
}

fn convert_message(message: &Message) -> Result<Value> {
    match message {
        Message::System { content } => Ok(serde_json::json!({
            "role": "system",
            "content": content,
        })),
        Message::Human { content } => Ok(serde_json::json!({
            "role": "user",
            "content": content,
        })),
        Message::AI { content, tool_calls } => {
            let mut obj = serde_json::json!({ "role": "assistant" });
            let map = obj.as_object_mut().unwrap();

            if let Some(content) = content {
                map.insert("content".to_string(), serde_json::json!(content));
            }
            if let Some(tool_calls) = tool_calls {
                map.insert("tool_calls".to_string(), serde_json::to_value(tool_calls)?);
            }

            Ok(obj)
        }
        Message::Tool {
            tool_call_id,
            content,
        } => Ok(serde_json::json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content,
        })),
    }
}

#[async_trait]
impl ChatModelClient for OpenAiCompatClient {
    async fn stream_chat(&self, request: ChatRequest) -> Result<ModelEventStream> {
        let payload = self.build_chat_payload(&request)?;

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("failed to send chat request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("model API error ({}): {}", status, error_text);
        }

        Ok(parse_model_sse_stream(response))
    }
}
