use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub emby: FileEmbyConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
    #[serde(default)]
    pub logging: FileLoggingConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileEmbyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// humantime duration, e.g. `"30s"` or `"1m 30s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_limit: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLoggingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Values read from the process environment. Numeric and duration values
/// stay raw here; the loader validates them.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub client_name: Option<String>,
    pub device_id: Option<String>,
    pub request_timeout: Option<String>,
    pub catalog_limit: Option<String>,
    pub fallback_limit: Option<String>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            config_path: var("STREAMBRIDGE_CONFIG").map(PathBuf::from),
            server_host: var("STREAMBRIDGE_HOST"),
            server_port: var("STREAMBRIDGE_PORT").or_else(|| var("PORT")),
            client_name: var("STREAMBRIDGE_CLIENT_NAME"),
            device_id: var("STREAMBRIDGE_DEVICE_ID"),
            request_timeout: var("STREAMBRIDGE_REQUEST_TIMEOUT"),
            catalog_limit: var("STREAMBRIDGE_CATALOG_LIMIT"),
            fallback_limit: var("STREAMBRIDGE_FALLBACK_LIMIT"),
            log_filter: var("STREAMBRIDGE_LOG"),
        }
    }
}
