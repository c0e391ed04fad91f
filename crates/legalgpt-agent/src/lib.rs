//! Turn orchestration for the chat backend.
//!
//! [`TurnOrchestrator`] turns one user message into an ordered stream of
//! [`OutboundEvent`]s while persisting the turn's messages and checkpoint.
//! [`sse`] carries those events over the wire.

pub mod config;
pub mod events;
pub mod history;
pub mod locks;
pub mod orchestrator;
pub mod sse;
pub mod state;

pub use config::{OrchestratorConfig, DEFAULT_SYSTEM_PROMPT};
pub use events::{OutboundEvent, ToolOutcome};
pub use history::build_model_history;
pub use locks::ThreadLocks;
pub use orchestrator::TurnOrchestrator;
pub use sse::{encode_frame, SseFrame, SseFrameDecoder};
pub use state::{ToolInvocation, TurnState};
