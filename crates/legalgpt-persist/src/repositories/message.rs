use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::StoredMessage;

#[derive(Clone)]
pub struct MessageRepository {
    collection: Collection<StoredMessage>,
}

impl MessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    pub async fn append_message(&self, message: &StoredMessage) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    /// All messages for a thread in creation order.
    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<StoredMessage>> {
        let filter = doc! { "thread_id": thread_id };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn count_messages(&self, thread_id: &str) -> Result<u64> {
        let filter = doc! { "thread_id": thread_id };
        Ok(self.collection.count_documents(filter).await?)
    }

    pub async fn delete_for_thread(&self, thread_id: &str) -> Result<()> {
        let filter = doc! { "thread_id": thread_id };
        self.collection.delete_many(filter).await?;
        Ok(())
    }
}
