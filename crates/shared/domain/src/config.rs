use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

use crate::constants::DEFAULT_TEMPLATE;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub access: AccessConfig,
    pub maps: MapsConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

/// Flat document directory (map configurations, `layers.json`, `templates/`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Group-based restriction settings.
///
/// `restrict_by_groups` is the single switch for every identity check and wash step.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub restrict_by_groups: bool,
    /// Request header carrying the already-authenticated user name.
    pub identity_header: String,
    pub directory: DirectoryConfig,
}

/// Static membership table used by the bundled directory adapter.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// User name -> groups the user belongs to.
    pub members: BTreeMap<String, Vec<String>>,
}

/// Map-document handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Template duplicated by `create_new_map`.
    pub template: String,
    /// Prefix put in front of upstream service URLs handed to the client.
    pub proxy: Option<String>,
}

/// Logger settings; levels and directives use `tracing` `EnvFilter` syntax.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directives: Option<String>,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 3002 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("App_Data") }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            restrict_by_groups: false,
            identity_header: "X-Control-Header".to_owned(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE.to_owned(), proxy: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directives: None, console: true, directory: None, json: false }
    }
}
