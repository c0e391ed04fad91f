use std::sync::Arc;

use legalgpt_agent::TurnOrchestrator;
use legalgpt_persist::MessageStore;

use crate::config::Config;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn MessageStore>,
    pub orchestrator: TurnOrchestrator,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn MessageStore>, orchestrator: TurnOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            store,
            orchestrator,
        }
    }
}
