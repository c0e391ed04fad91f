use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Checkpoint, StoredMessage, Thread};

/// Durable record of threads, messages and checkpoints.
///
/// The Turn Orchestrator is the only writer of message/checkpoint rows for a
/// turn; implementations only need per-call atomicity, cross-turn ordering
/// is enforced by the orchestrator's per-thread section.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_thread(&self, user_id: &str, title: &str) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Threads for a user, most recently updated first.
    async fn list_threads(&self, user_id: &str, limit: i64) -> Result<Vec<Thread>>;

    /// Delete a thread together with its messages and checkpoints.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Bump `updated_at`; optionally replace the title.
    async fn touch_thread(&self, thread_id: &str, title: Option<&str>) -> Result<()>;

    /// True when the thread exists and belongs to the user.
    async fn verify_ownership(&self, thread_id: &str, user_id: &str) -> Result<bool>;

    async fn append_message(&self, message: StoredMessage) -> Result<()>;

    /// All messages for a thread in creation order.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<StoredMessage>>;

    async fn append_checkpoint(&self, thread_id: &str, snapshot: Value) -> Result<()>;

    async fn latest_checkpoint(&self, thread_id: &str) -> Result<Option<Checkpoint>>;
}
