use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::Checkpoint;

#[derive(Clone)]
pub struct CheckpointRepository {
    collection: Collection<Checkpoint>,
}

impl CheckpointRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("checkpoints");
        Self { collection }
    }

    /// Checkpoints are append-only; rows are never updated in place.
    pub async fn append_checkpoint(&self, checkpoint: &Checkpoint) -> Result<()> {
        self.collection.insert_one(checkpoint).await?;
        Ok(())
    }

    /// Latest checkpoint by creation time, authoritative for resumption.
    pub async fn latest_checkpoint(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let filter = doc! { "thread_id": thread_id };
        let checkpoint = self
            .collection
            .find_one(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(checkpoint)
    }

    pub async fn delete_for_thread(&self, thread_id: &str) -> Result<()> {
        let filter = doc! { "thread_id": thread_id };
        self.collection.delete_many(filter).await?;
        Ok(())
    }
}
