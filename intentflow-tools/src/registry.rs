use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::core::{ApiHandler, ApiKey};

/// Table of integrations keyed by (software, api)
///
/// Adding an integration is a registration; the dispatcher never grows a
/// new branch.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<HashMap<ApiKey, Arc<dyn ApiHandler>>>>,
}

impl HandlerRegistry {
    /// Create a new empty handler registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler for the same key
    pub async fn register(&self, handler: Arc<dyn ApiHandler>) {
        let key = handler.key();
        let mut handlers = self.handlers.write().await;
        if handlers.insert(key.clone(), handler).is_some() {
            warn!(api = %key, "replaced existing API handler");
        } else {
            debug!(api = %key, "registered API handler");
        }
    }

    /// Look up the handler for a (software, api) pair
    pub async fn get(&self, software: &str, api: &str) -> Option<Arc<dyn ApiHandler>> {
        let handlers = self.handlers.read().await;
        handlers.get(&ApiKey::new(software, api)).cloned()
    }

    /// Remove a handler
    pub async fn remove(&self, software: &str, api: &str) -> Option<Arc<dyn ApiHandler>> {
        let mut handlers = self.handlers.write().await;
        handlers.remove(&ApiKey::new(software, api))
    }

    pub async fn contains(&self, software: &str, api: &str) -> bool {
        let handlers = self.handlers.read().await;
        handlers.contains_key(&ApiKey::new(software, api))
    }

    /// List all registered keys, sorted
    pub async fn list(&self) -> Vec<ApiKey> {
        let handlers = self.handlers.read().await;
        let mut keys: Vec<_> = handlers.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").finish_non_exhaustive()
    }
}
