use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::models::{
    CatalogConfig, Config, ConfigMetadata, DEFAULT_CLIENT_NAME, DEFAULT_DEVICE_ID, DEFAULT_HOST,
    DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT, EmbyConfig, LoggingConfig,
    ServerConfig,
};
use crate::sources::{EnvConfig, FileConfig};
use crate::warnings::ConfigWarnings;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["streambridge.toml", "config/streambridge.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Use these values instead of reading the process environment.
    pub env: Option<EnvConfig>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    /// Resolve the configuration: explicit path > `STREAMBRIDGE_CONFIG` >
    /// default locations for the file, then environment over file over
    /// built-in defaults for every value.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path)
                .map(|_| true)
                .or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        let env_config = match &self.options.env {
            Some(env) => env.clone(),
            None => EnvConfig::gather(),
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;
        let (config, warnings) =
            Self::compose_config(file_config, env_config, config_path, env_file_loaded)?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        } else {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists());
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        debug!(path = %path.display(), source = ?provenance, "reading configuration file");
        let contents = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No streambridge.toml detected; using environment variables and defaults",
                "Create streambridge.toml or pass --config to pin the settings",
            );
        }

        let FileConfig {
            server: file_server,
            emby: file_emby,
            catalog: file_catalog,
            logging: file_logging,
        } = file_config.unwrap_or_default();

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: match env.server_port {
                Some(raw) => parse_value("STREAMBRIDGE_PORT", &raw)?,
                None => file_server.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let request_timeout = match env.request_timeout.or(file_emby.request_timeout) {
            Some(raw) => parse_duration("emby.request_timeout", &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        if request_timeout.is_zero() {
            return Err(ConfigLoadError::InvalidValue {
                key: "emby.request_timeout",
                value: "0s".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }

        let emby = EmbyConfig {
            client_name: env
                .client_name
                .or(file_emby.client_name)
                .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            device_id: env
                .device_id
                .or(file_emby.device_id)
                .unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string()),
            request_timeout,
        };

        let defaults = Config::default().catalog;
        let catalog = CatalogConfig {
            default_limit: match env.catalog_limit {
                Some(raw) => parse_value("STREAMBRIDGE_CATALOG_LIMIT", &raw)?,
                None => file_catalog.default_limit.unwrap_or(defaults.default_limit),
            },
            fallback_limit: match env.fallback_limit {
                Some(raw) => parse_value("STREAMBRIDGE_FALLBACK_LIMIT", &raw)?,
                None => file_catalog.fallback_limit.unwrap_or(defaults.fallback_limit),
            },
        };
        if catalog.default_limit == 0 {
            warnings.push_with_hint(
                "catalog.default_limit is 0; catalogs will come back empty",
                "Set catalog.default_limit to a positive page size",
            );
        }

        let logging = LoggingConfig {
            filter: env
                .log_filter
                .or(file_logging.filter)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };

        let config = Config {
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
            server,
            emby,
            catalog,
            logging,
        };

        Ok((config, warnings))
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigLoadError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| ConfigLoadError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

fn parse_duration(key: &'static str, raw: &str) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw.trim()).map_err(|err| ConfigLoadError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(self, ConfigPathProvenance::Explicit | ConfigPathProvenance::Env)
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
