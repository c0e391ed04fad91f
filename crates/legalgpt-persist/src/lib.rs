pub mod client;
pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

pub use client::MongoStore;
pub use error::{PersistError, Result};
pub use models::{Checkpoint, MessageRole, StoredMessage, Thread, DEFAULT_THREAD_TITLE};
pub use store::MessageStore;
