//! HTTP API for the working group portal assistant

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::identity::CurrentActor;
use crate::llm::ModelRegistry;
use crate::runtime::{CompletionClient, PanelManager};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub panels: Arc<PanelManager>,
    pub actor: Arc<dyn CurrentActor>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn CompletionClient>,
        actor: Arc<dyn CurrentActor>,
        llm_registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            panels: Arc::new(PanelManager::new(gateway)),
            actor,
            llm_registry,
        }
    }
}
