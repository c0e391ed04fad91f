use async_trait::async_trait;
use mongodb::Client;
use serde_json::Value;

use crate::error::{PersistError, Result};
use crate::models::{Checkpoint, StoredMessage, Thread};
use crate::repositories::{CheckpointRepository, MessageRepository, ThreadRepository};
use crate::store::MessageStore;

/// MongoDB-backed [`MessageStore`].
pub struct MongoStore {
    thread_repo: ThreadRepository,
    message_repo: MessageRepository,
    checkpoint_repo: CheckpointRepository,
}

impl MongoStore {
    pub async fn connect(mongodb_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            thread_repo: ThreadRepository::new(&client, db_name),
            message_repo: MessageRepository::new(&client, db_name),
            checkpoint_repo: CheckpointRepository::new(&client, db_name),
        })
    }
}

#[async_trait]
impl MessageStore for MongoStore {
    async fn create_thread(&self, user_id: &str, title: &str) -> Result<Thread> {
        self.thread_repo.create_thread(user_id, title).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        self.thread_repo.get_thread(thread_id).await
    }

    async fn list_threads(&self, user_id: &str, limit: i64) -> Result<Vec<Thread>> {
        self.thread_repo.list_threads(user_id, limit).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        // Cascade: messages and checkpoints go with the thread.
        self.message_repo.delete_for_thread(thread_id).await?;
        self.checkpoint_repo.delete_for_thread(thread_id).await?;
        self.thread_repo.delete_thread(thread_id).await
    }

    async fn touch_thread(&self, thread_id: &str, title: Option<&str>) -> Result<()> {
        self.thread_repo.touch_thread(thread_id, title).await
    }

    async fn verify_ownership(&self, thread_id: &str, user_id: &str) -> Result<bool> {
        let thread = self.thread_repo.get_thread(thread_id).await?;
        Ok(thread.map(|t| t.user_id == user_id).unwrap_or(false))
    }

    async fn append_message(&self, message: StoredMessage) -> Result<()> {
        self.message_repo.append_message(&message).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<StoredMessage>> {
        self.message_repo.list_messages(thread_id).await
    }

    async fn append_checkpoint(&self, thread_id: &str, snapshot: Value) -> Result<()> {
        let checkpoint = Checkpoint::new(thread_id, snapshot);
        self.checkpoint_repo.append_checkpoint(&checkpoint).await
    }

    async fn latest_checkpoint(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        self.checkpoint_repo.latest_checkpoint(thread_id).await
    }
}
