use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Per-thread turn serialization.
///
/// A turn holds its thread's lock from history load to the last persistence
/// write; turns for different threads proceed independently. Entries with no
/// outstanding holder are swept on each acquisition so the map stays bounded
/// by the number of active threads.
#[derive(Debug, Default)]
pub struct ThreadLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, thread_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(
            map.entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}
