use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health of an endpoint as reported by whatever source produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointStatus {
    /// No health information is tracked for this endpoint
    #[default]
    Unknown,
    Up,
    Down,
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EndpointStatus::Unknown => "unknown",
            EndpointStatus::Up => "up",
            EndpointStatus::Down => "down",
        };
        write!(f, "{}", s)
    }
}

/// A single network-reachable instance of a service. Snapshot value produced
/// by storage or by the registry; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// Unique identifier of this endpoint record
    pub uuid: Uuid,
    /// Service this endpoint belongs to
    pub service_id: String,
    pub ip: String,
    /// `0` means "no port recorded" and is a legitimate value
    pub port: u16,
    pub status: EndpointStatus,
    pub is_online: bool,
}

/// Normalized view of a service: the ordered set of IPs serving one port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointGroup {
    pub port: u16,
    pub ips: Vec<String>,
}

/// Stored form of a manually registered endpoint. Static entries carry no
/// health status, only the curated online flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticEndpoint {
    pub uuid: Uuid,
    pub service_id: String,
    pub ip: String,
    pub port: u16,
    pub is_online: bool,
}

impl From<StaticEndpoint> for EndpointRecord {
    fn from(ep: StaticEndpoint) -> Self {
        Self {
            uuid: ep.uuid,
            service_id: ep.service_id,
            ip: ep.ip,
            port: ep.port,
            status: EndpointStatus::Unknown,
            is_online: ep.is_online,
        }
    }
}

/// Registry connection parameters for one service. A stored configuration is
/// what switches the service from static to dynamic resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub service_id: String,
    /// Registry server addresses
    pub servers: Vec<String>,
    /// Key or prefix under which the service members are published
    pub key: String,
}

/// Change notification for a watched service. Carries no payload beyond the
/// service identity; consumers pull the new snapshot themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointUpdate {
    pub service_id: String,
}
