use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// Limits applied to registry connections made on behalf of a resolver call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Time allowed for establishing a registry session
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Time allowed for fetching the current member set
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Sizing for the shared update channel. The channel retains the newest
/// `capacity` notifications; receivers that fall behind skip ahead to the
/// oldest retained one instead of stalling the producers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub capacity: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { capacity: 16 }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Registry connection limits
    pub registry: RegistryConfig,
    /// Update channel sizing
    pub notify: NotifyConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("endpoints.toml"))
            .merge(Env::prefixed("ENDPOINTS__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
