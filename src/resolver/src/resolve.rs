//! Static and dynamic endpoint resolution
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::timeout;

use common::config::RegistryConfig;
use common::model::{DiscoveryConfig, EndpointRecord, EndpointUpdate};
use common::storage::{Storage, StorageError};

use crate::registry::{RegistryClient, RegistryConnector, RegistryError};

/// Error types that can occur while resolving the endpoints of a service.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to read endpoints from storage: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to resolve endpoints from registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Produces the current endpoint set of one service.
///
/// Built per resolution or watch request by [`ResolverFactory::resolver`]:
/// static for services without a stored discovery configuration, dynamic
/// otherwise. Resolvers cache nothing across calls; the only state they
/// carry are the shared update channel and stop signal.
pub enum Resolver {
    Static(StaticResolver),
    Dynamic(DynamicResolver),
}

impl Resolver {
    /// Return the current endpoint snapshot.
    pub async fn list(&self) -> Result<Vec<EndpointRecord>, ResolveError> {
        match self {
            Resolver::Static(r) => r.list().await,
            Resolver::Dynamic(r) => r.list().await,
        }
    }

    /// Follow membership changes until the shared stop signal fires. Static
    /// lists have no change source, so this returns immediately.
    pub async fn watch(&self) {
        match self {
            Resolver::Static(_) => {}
            Resolver::Dynamic(r) => r.watch().await,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Resolver::Dynamic(_))
    }
}

/// Resolves from the manually curated endpoint list in storage.
pub struct StaticResolver {
    service_id: String,
    storage: Arc<dyn Storage>,
}

impl StaticResolver {
    async fn list(&self) -> Result<Vec<EndpointRecord>, ResolveError> {
        let eps = self.storage.list_static_endpoints(&self.service_id).await?;
        Ok(eps.into_iter().map(EndpointRecord::from).collect())
    }
}

/// Resolves from a live registry subscription. Every call opens its own
/// registry session and releases it before returning.
pub struct DynamicResolver {
    cfg: DiscoveryConfig,
    connector: Arc<dyn RegistryConnector>,
    limits: RegistryConfig,
    notify: broadcast::Sender<EndpointUpdate>,
    shutdown: broadcast::Sender<()>,
}

impl DynamicResolver {
    async fn connect(&self, client: &mut Box<dyn RegistryClient>) -> Result<(), RegistryError> {
        match timeout(self.limits.connect_timeout, client.connect()).await {
            Ok(res) => res,
            Err(_) => Err(RegistryError::Connection(format!(
                "connect timed out after {:?}",
                self.limits.connect_timeout
            ))),
        }
    }

    async fn list(&self) -> Result<Vec<EndpointRecord>, ResolveError> {
        let mut client = self.connector.client(&self.cfg);
        self.connect(&mut client).await?;

        let fetched = match timeout(self.limits.fetch_timeout, client.fetch()).await {
            Ok(res) => res,
            Err(_) => Err(RegistryError::Fetch(format!(
                "fetch timed out after {:?}",
                self.limits.fetch_timeout
            ))),
        };

        // The session is released before the fetch outcome is propagated.
        client.close().await;
        Ok(fetched?)
    }

    async fn watch(&self) {
        let mut client = self.connector.client(&self.cfg);
        if let Err(e) = self.connect(&mut client).await {
            log::warn!(
                "service {}: error connecting service registry: {e}",
                self.cfg.service_id
            );
            return;
        }

        if let Err(e) = client
            .watch_loop(self.notify.clone(), self.shutdown.subscribe())
            .await
        {
            log::warn!(
                "service {}: endpoint watch ended: {e}",
                self.cfg.service_id
            );
        }
        client.close().await;
    }
}

/// Builds the right resolver for a service by inspecting its stored
/// discovery configuration. All resolvers built by one factory publish into
/// the same update channel and obey the same stop signal.
pub struct ResolverFactory {
    storage: Arc<dyn Storage>,
    connector: Arc<dyn RegistryConnector>,
    limits: RegistryConfig,
    notify: broadcast::Sender<EndpointUpdate>,
    shutdown: broadcast::Sender<()>,
}

impl ResolverFactory {
    pub fn new(
        storage: Arc<dyn Storage>,
        connector: Arc<dyn RegistryConnector>,
        limits: RegistryConfig,
        notify: broadcast::Sender<EndpointUpdate>,
        shutdown: broadcast::Sender<()>,
    ) -> Self {
        Self {
            storage,
            connector,
            limits,
            notify,
            shutdown,
        }
    }

    /// Build a resolver for `service_id`.
    ///
    /// A failed configuration lookup degrades to static resolution instead
    /// of propagating; the warning logged there is the only place the
    /// failure is distinguishable from a genuinely absent configuration.
    pub async fn resolver(&self, service_id: &str) -> Resolver {
        match self.storage.get_discovery_config(service_id).await {
            Ok(Some(cfg)) => Resolver::Dynamic(DynamicResolver {
                cfg,
                connector: self.connector.clone(),
                limits: self.limits.clone(),
                notify: self.notify.clone(),
                shutdown: self.shutdown.clone(),
            }),
            Ok(None) => self.static_resolver(service_id),
            Err(e) => {
                log::warn!("service {service_id}: error getting discovery configuration: {e}");
                self.static_resolver(service_id)
            }
        }
    }

    fn static_resolver(&self, service_id: &str) -> Resolver {
        Resolver::Static(StaticResolver {
            service_id: service_id.to_string(),
            storage: self.storage.clone(),
        })
    }
}
