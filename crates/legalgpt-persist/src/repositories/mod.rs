mod checkpoint;
mod message;
mod thread;

pub use checkpoint::CheckpointRepository;
pub use message::MessageRepository;
pub use thread::ThreadRepository;
