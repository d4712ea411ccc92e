use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{DiscoveryConfig, StaticEndpoint};

/// Error types that can occur while reading endpoint state from storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Read side of the store holding manually registered endpoints and
/// per-service discovery configurations.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Look up the discovery configuration for a service. `Ok(None)` means
    /// the service has no dynamic discovery and resolves statically.
    async fn get_discovery_config(
        &self,
        service_id: &str,
    ) -> StorageResult<Option<DiscoveryConfig>>;

    /// List the manually registered endpoints of a service, in storage order.
    async fn list_static_endpoints(
        &self,
        service_id: &str,
    ) -> StorageResult<Vec<StaticEndpoint>>;
}

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    configs: RwLock<HashMap<String, DiscoveryConfig>>,
    endpoints: RwLock<HashMap<String, Vec<StaticEndpoint>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the discovery configuration of a service.
    pub async fn put_discovery_config(&self, cfg: DiscoveryConfig) {
        log::debug!("storing discovery config for service {}", cfg.service_id);
        let mut configs = self.configs.write().await;
        configs.insert(cfg.service_id.clone(), cfg);
    }

    /// Drop the discovery configuration of a service, switching it back to
    /// static resolution.
    pub async fn remove_discovery_config(&self, service_id: &str) {
        self.configs.write().await.remove(service_id);
    }

    /// Append a manually registered endpoint to a service.
    pub async fn add_static_endpoint(&self, ep: StaticEndpoint) {
        let mut endpoints = self.endpoints.write().await;
        endpoints.entry(ep.service_id.clone()).or_default().push(ep);
    }

    /// Replace the full static endpoint list of a service.
    pub async fn set_static_endpoints(&self, service_id: &str, eps: Vec<StaticEndpoint>) {
        self.endpoints.write().await.insert(service_id.to_string(), eps);
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_discovery_config(
        &self,
        service_id: &str,
    ) -> StorageResult<Option<DiscoveryConfig>> {
        Ok(self.configs.read().await.get(service_id).cloned())
    }

    async fn list_static_endpoints(
        &self,
        service_id: &str,
    ) -> StorageResult<Vec<StaticEndpoint>> {
        Ok(self
            .endpoints
            .read()
            .await
            .get(service_id)
            .cloned()
            .unwrap_or_default())
    }
}
