use std::{fmt, sync::Arc};

use streambridge_config::{AddonConfig, Config};
use streambridge_core::{
    ImageUrls, ItemSource, LibraryService, MetaMapper, MetaService, SourceConnector, StreamLinks,
    StreamService,
};

use crate::infra::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connector: Arc<dyn SourceConnector>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config, connector: Arc<dyn SourceConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
        }
    }

    /// Decode an install token and connect to the media server it names.
    pub fn open_session(&self, token: &str) -> AppResult<AddonSession> {
        let addon = AddonConfig::decode(token)?;
        let source = self.connector.connect(&addon.to_credentials())?;
        let mapper = MetaMapper::new(ImageUrls::new(&addon.server_url)?);
        let links = StreamLinks::new(
            &addon.server_url,
            addon.access_token.clone(),
            self.config.emby.device_id.clone(),
        )?;
        Ok(AddonSession {
            addon,
            source,
            mapper,
            links,
            config: Arc::clone(&self.config),
        })
    }
}

/// One request's view of a configured install.
pub struct AddonSession {
    pub addon: AddonConfig,
    source: Arc<dyn ItemSource>,
    mapper: MetaMapper,
    links: StreamLinks,
    config: Arc<Config>,
}

impl fmt::Debug for AddonSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonSession")
            .field("addon", &self.addon)
            .finish_non_exhaustive()
    }
}

impl AddonSession {
    pub fn library(&self) -> LibraryService<'_> {
        LibraryService::new(self.source.as_ref(), &self.mapper)
            .for_user(self.addon.user_id.clone())
            .with_default_limit(self.config.catalog.default_limit)
    }

    pub fn meta(&self) -> MetaService<'_> {
        MetaService::new(self.source.as_ref(), &self.mapper)
            .with_fallback_limit(self.config.catalog.fallback_limit)
    }

    pub fn streams(&self) -> StreamService<'_> {
        StreamService::new(self.source.as_ref(), &self.links)
            .with_fallback_limit(self.config.catalog.fallback_limit)
    }
}
