mod checkpoint;
mod message;
mod thread;

pub use checkpoint::Checkpoint;
pub use message::{MessageRole, StoredMessage};
pub use thread::{Thread, DEFAULT_THREAD_TITLE};
