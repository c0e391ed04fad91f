use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::Thread;

#[derive(Clone)]
pub struct ThreadRepository {
    collection: Collection<Thread>,
}

impl ThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn create_thread(&self, user_id: &str, title: &str) -> Result<Thread> {
        let thread = Thread::new(user_id, title);
        self.collection.insert_one(&thread).await?;
        Ok(thread)
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let filter = doc! { "_id": thread_id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// List a user's threads, most recently updated first.
    pub async fn list_threads(&self, user_id: &str, limit: i64) -> Result<Vec<Thread>> {
        let filter = doc! { "user_id": user_id };
        let threads = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let filter = doc! { "_id": thread_id };
        self.collection.delete_one(filter).await?;
        Ok(())
    }

    /// Update `updated_at`, and the title when a new one is provided.
    pub async fn touch_thread(&self, thread_id: &str, title: Option<&str>) -> Result<()> {
        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(title) = title {
            set.insert("title", title);
        }

        let filter = doc! { "_id": thread_id };
        self.collection.update_one(filter, doc! { "$set": set }).await?;
        Ok(())
    }
}
