pub mod client;
pub mod streaming;
pub mod types;

pub use client::{
    ChatModelClient, ChatOptions, ChatRequest, ModelEventStream, OpenAiCompatClient,
};
pub use streaming::ModelEvent;
pub use types::{FunctionCall, FunctionDefinition, Message, Tool, ToolCall, ToolChoice};
