use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use common::model::{DiscoveryConfig, EndpointRecord, EndpointUpdate};

use super::{RegistryClient, RegistryConnector, RegistryError, RegistryResult};

const CHANGE_BUFFER_SIZE: usize = 64;

/// In-process registry for tests and embedded deployments.
///
/// Member sets are mutated through the registry handle; every mutation is
/// broadcast to connected watch loops. The handle is cheap to clone and all
/// clones share the same state.
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    inner: Arc<RegistryState>,
}

#[derive(Debug)]
struct RegistryState {
    members: RwLock<HashMap<String, Vec<EndpointRecord>>>,
    changes: broadcast::Sender<String>,
    connects: AtomicUsize,
    closes: AtomicUsize,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER_SIZE);
        Self {
            inner: Arc::new(RegistryState {
                members: RwLock::new(HashMap::new()),
                changes,
                connects: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
            }),
        }
    }

    /// Replace the member set of a service and notify connected watchers.
    pub async fn set_endpoints(&self, service_id: &str, eps: Vec<EndpointRecord>) {
        self.inner
            .members
            .write()
            .await
            .insert(service_id.to_string(), eps);
        // Send fails only when nobody watches yet, which is fine.
        let _ = self.inner.changes.send(service_id.to_string());
    }

    /// Drop all members of a service and notify connected watchers.
    pub async fn clear_endpoints(&self, service_id: &str) {
        self.inner.members.write().await.remove(service_id);
        let _ = self.inner.changes.send(service_id.to_string());
    }

    /// Number of sessions opened against this registry.
    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Number of sessions released against this registry.
    pub fn close_count(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }
}

impl RegistryConnector for InMemoryRegistry {
    fn client(&self, cfg: &DiscoveryConfig) -> Box<dyn RegistryClient> {
        Box::new(MemoryRegistryClient {
            registry: self.inner.clone(),
            service_id: cfg.service_id.clone(),
            changes: None,
        })
    }
}

/// One registry session, bound to a single service.
pub struct MemoryRegistryClient {
    registry: Arc<RegistryState>,
    service_id: String,
    /// Subscribed at connect time; `None` while unconnected
    changes: Option<broadcast::Receiver<String>>,
}

#[async_trait]
impl RegistryClient for MemoryRegistryClient {
    async fn connect(&mut self) -> RegistryResult<()> {
        self.changes = Some(self.registry.changes.subscribe());
        self.registry.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch(&mut self) -> RegistryResult<Vec<EndpointRecord>> {
        if self.changes.is_none() {
            return Err(RegistryError::Connection(
                "registry session not connected".to_string(),
            ));
        }
        let members = self.registry.members.read().await;
        Ok(members.get(&self.service_id).cloned().unwrap_or_default())
    }

    async fn watch_loop(
        &mut self,
        notify: broadcast::Sender<EndpointUpdate>,
        mut stop: broadcast::Receiver<()>,
    ) -> RegistryResult<()> {
        let changes = self.changes.as_mut().ok_or_else(|| {
            RegistryError::Connection("registry session not connected".to_string())
        })?;

        loop {
            tokio::select! {
                // Any completion of the stop receiver means shutdown, whether
                // a signal arrived or the sender went away.
                _ = stop.recv() => return Ok(()),
                change = changes.recv() => match change {
                    Ok(service_id) if service_id == self.service_id => {
                        // Nobody listening is fine; the consumer may not have
                        // subscribed yet.
                        let _ = notify.send(EndpointUpdate { service_id });
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::debug!(
                            "watch for service {} lagged, coalescing {} changes",
                            self.service_id,
                            skipped
                        );
                        let _ = notify.send(EndpointUpdate {
                            service_id: self.service_id.clone(),
                        });
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(RegistryError::Watch(
                            "registry change stream closed".to_string(),
                        ));
                    }
                },
            }
        }
    }

    async fn close(&mut self) {
        self.changes = None;
        self.registry.closes.fetch_add(1, Ordering::SeqCst);
    }
}
