use std::path::PathBuf;
use std::time::Duration;

use streambridge_core::ClientSettings;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_CLIENT_NAME: &str = "StreamBridge";
pub const DEFAULT_DEVICE_ID: &str = "stremio-addon-device-id";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=warn";

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metadata: ConfigMetadata,
    pub server: ServerConfig,
    pub emby: EmbyConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// Where the values came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbyConfig {
    pub client_name: String,
    pub device_id: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogConfig {
    pub default_limit: u32,
    pub fallback_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Config {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            client_name: self.emby.client_name.clone(),
            device_name: self.emby.client_name.clone(),
            device_id: self.emby.device_id.clone(),
            timeout: self.emby.request_timeout,
            ..ClientSettings::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata: ConfigMetadata::default(),
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            emby: EmbyConfig {
                client_name: DEFAULT_CLIENT_NAME.to_string(),
                device_id: DEFAULT_DEVICE_ID.to_string(),
                request_timeout: DEFAULT_REQUEST_TIMEOUT,
            },
            catalog: CatalogConfig {
                default_limit: streambridge_core::DEFAULT_CATALOG_LIMIT,
                fallback_limit: streambridge_core::catalog::DEFAULT_FALLBACK_LIMIT,
            },
            logging: LoggingConfig {
                filter: DEFAULT_LOG_FILTER.to_string(),
            },
        }
    }
}
