//! Registry client interfaces
use async_trait::async_trait;
use tokio::sync::broadcast;

use common::model::{DiscoveryConfig, EndpointRecord, EndpointUpdate};

pub mod memory;
pub use memory::InMemoryRegistry;

/// Error types that can occur while talking to a service registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to connect to registry: {0}")]
    Connection(String),

    #[error("failed to fetch members: {0}")]
    Fetch(String),

    #[error("watch terminated: {0}")]
    Watch(String),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// One session with the registry holding live membership for a single
/// service.
///
/// Clients start out unconnected; `connect` must succeed before `fetch` or
/// `watch_loop` is used, and the caller releases the session with `close` on
/// every exit path after a successful connect.
#[async_trait]
pub trait RegistryClient: Send {
    /// Establish the registry session.
    async fn connect(&mut self) -> RegistryResult<()>;

    /// Fetch the current member set of the service.
    async fn fetch(&mut self) -> RegistryResult<Vec<EndpointRecord>>;

    /// Block until the stop signal fires or the session dies, pushing one
    /// update onto `notify` per detected membership change. Must observe the
    /// stop signal within one loop iteration.
    async fn watch_loop(
        &mut self,
        notify: broadcast::Sender<EndpointUpdate>,
        stop: broadcast::Receiver<()>,
    ) -> RegistryResult<()>;

    /// Release the registry session.
    async fn close(&mut self);
}

/// Hands out fresh, unconnected registry clients. Every resolver call owns
/// its own session, so connectors carry no per-connection state and need no
/// locking.
pub trait RegistryConnector: Send + Sync + 'static {
    fn client(&self, cfg: &DiscoveryConfig) -> Box<dyn RegistryClient>;
}
