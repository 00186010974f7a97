//! Configuration for StreamBridge.
//!
//! Two unrelated kinds of settings live here: the server's own configuration
//! (TOML file, `.env`, environment) resolved once at startup, and the
//! per-install [`AddonConfig`] that every addon request carries in its path.

pub mod addon;
pub mod loader;
pub mod models;
pub mod sources;
pub mod warnings;

pub use addon::{AddonConfig, AddonConfigError};
pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    CatalogConfig, Config, ConfigMetadata, EmbyConfig, LoggingConfig, ServerConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use warnings::{ConfigWarning, ConfigWarnings};
