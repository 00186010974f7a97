use streambridge_model::{
    CatalogKind, MetaDetail, ProviderRef, RawItem, SeriesVideo, build_external_id,
    parse_external_id,
};
use tracing::{debug, warn};

use crate::catalog::{DEFAULT_FALLBACK_LIMIT, FallbackEpisodeSynthesizer};
use crate::error::Result;
use crate::mapper::MetaMapper;
use crate::provider::ProviderResolver;
use crate::source::ItemSource;

/// Resolves `emby~` ids and IMDb/TMDB ids into full meta records.
pub struct MetaService<'a> {
    source: &'a dyn ItemSource,
    mapper: &'a MetaMapper,
    fallback_limit: u32,
}

impl std::fmt::Debug for MetaService<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaService")
            .field("fallback_limit", &self.fallback_limit)
            .finish_non_exhaustive()
    }
}

impl<'a> MetaService<'a> {
    pub fn new(source: &'a dyn ItemSource, mapper: &'a MetaMapper) -> Self {
        Self {
            source,
            mapper,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }

    pub fn with_fallback_limit(mut self, limit: u32) -> Self {
        self.fallback_limit = limit;
        self
    }

    pub async fn series_meta(&self, id: &str) -> Result<Option<MetaDetail>> {
        self.meta(CatalogKind::Series, id).await
    }

    pub async fn movie_meta(&self, id: &str) -> Result<Option<MetaDetail>> {
        self.meta(CatalogKind::Movie, id).await
    }

    /// `Ok(None)` for unsupported ids and items the server does not know.
    ///
    /// A provider id resolves to the library's movie or series carrying it,
    /// and the returned meta keeps the requested id. Episode suffixes on
    /// provider ids are ignored.
    pub async fn meta(&self, kind: CatalogKind, id: &str) -> Result<Option<MetaDetail>> {
        let (item, requested) = if let Some(external) = parse_external_id(id) {
            (self.source.fetch_item(&external.server_id).await?, None)
        } else if let Some(reference) = ProviderRef::parse(id) {
            let resolver =
                ProviderResolver::new(self.source).with_fallback_limit(self.fallback_limit);
            let item = match kind {
                CatalogKind::Movie => resolver.find_movie(&reference.id).await?,
                CatalogKind::Series => resolver.find_series(&reference.id).await?,
            };
            (item, Some(id))
        } else {
            debug!(id, "unsupported meta id");
            return Ok(None);
        };
        let Some(item) = item else {
            debug!(id, "item not found");
            return Ok(None);
        };

        let videos = match kind {
            CatalogKind::Series => self.series_videos(&item).await?,
            CatalogKind::Movie => Vec::new(),
        };
        let mut detail = self.mapper.to_detail(&item, kind, videos);
        if let (Some(detail), Some(requested)) = (detail.as_mut(), requested) {
            detail.preview.id = requested.to_string();
        }
        Ok(detail)
    }

    /// Native episodes when every one of them is numbered, otherwise a
    /// synthesized list built from the series' descendants.
    async fn series_videos(&self, series: &RawItem) -> Result<Vec<SeriesVideo>> {
        match self.source.fetch_series_episodes(&series.id).await {
            Ok(page) => {
                let episodes = page.into_items();
                if !episodes.is_empty() && episodes.iter().all(|e| e.index_number.is_some()) {
                    let mut videos: Vec<_> = episodes
                        .iter()
                        .filter_map(|episode| self.mapper.to_video(episode))
                        .collect();
                    videos.sort_by_key(SeriesVideo::sort_key);
                    return Ok(videos);
                }
                debug!(
                    series = %series.id,
                    episodes = episodes.len(),
                    "native episodes unusable, synthesizing"
                );
            }
            Err(err) => {
                warn!(
                    series = %series.id,
                    error = %err,
                    "native episode listing failed, synthesizing"
                );
            }
        }

        let images = self.mapper.images();
        FallbackEpisodeSynthesizer::new(self.source)
            .with_limit(self.fallback_limit)
            .synthesize(series, build_external_id, |child: &RawItem| images.thumbnail(child))
            .await
    }
}
