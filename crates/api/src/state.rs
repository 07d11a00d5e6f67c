use std::sync::Arc;

use tokio::sync::RwLock;

use charstudio_core::store::CharacterStore;
use charstudio_genai::ImageGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (everything is behind `Arc`). The store is the single
/// source of truth for the session's characters; mutations go through the
/// write lock, which serialises the store's single logical writer.
#[derive(Clone)]
pub struct AppState {
    /// In-memory character collection for this session.
    pub store: Arc<RwLock<CharacterStore>>,
    /// Generation API client (stubbed in tests).
    pub generator: Arc<dyn ImageGenerator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(generator: Arc<dyn ImageGenerator>, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(CharacterStore::new())),
            generator,
            config: Arc::new(config),
        }
    }
}
