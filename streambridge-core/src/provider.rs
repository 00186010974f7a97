//! Finding server items by IMDb/TMDB id.

use streambridge_model::{
    EpisodeNumber, ItemType, ProviderId, RawItem, build_external_id, parse_external_id,
};
use tracing::{debug, warn};

use crate::catalog::{DEFAULT_FALLBACK_LIMIT, FallbackEpisodeSynthesizer};
use crate::error::Result;
use crate::source::{ItemSource, ItemsQuery, SortOrder};

const LOOKUP_LIMIT: u32 = 10;
const RECENT_SCAN_LIMIT: u32 = 100;
const LOOKUP_FIELDS: &[&str] = &[
    "ProviderIds",
    "Name",
    "Overview",
    "ProductionYear",
    "PremiereDate",
    "ImageTags",
    "BackdropImageTags",
    "Genres",
];

/// Resolves provider ids against one user's library.
///
/// Each `AnyProviderIdEquals` spelling is tried in turn. When none of them
/// matches, the most recently added items of the type are scanned. Every
/// candidate is checked against its `ProviderIds` before it is accepted.
#[derive(Clone, Copy)]
pub struct ProviderResolver<'a> {
    source: &'a dyn ItemSource,
    fallback_limit: u32,
}

impl std::fmt::Debug for ProviderResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderResolver")
            .field("fallback_limit", &self.fallback_limit)
            .finish_non_exhaustive()
    }
}

impl<'a> ProviderResolver<'a> {
    pub fn new(source: &'a dyn ItemSource) -> Self {
        Self {
            source,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }

    pub fn with_fallback_limit(mut self, limit: u32) -> Self {
        self.fallback_limit = limit;
        self
    }

    pub async fn find_movie(&self, id: &ProviderId) -> Result<Option<RawItem>> {
        self.find(id, ItemType::Movie).await
    }

    pub async fn find_series(&self, id: &ProviderId) -> Result<Option<RawItem>> {
        self.find(id, ItemType::Series).await
    }

    /// Server id of one episode of `series`.
    ///
    /// Native episode records are searched first, with an unnumbered season
    /// read as season 1. Series without a match fall back to the synthesized
    /// episode list, so the numbers agree with what the series meta shows.
    pub async fn find_episode(
        &self,
        series: &RawItem,
        number: EpisodeNumber,
    ) -> Result<Option<String>> {
        match self.source.fetch_series_episodes(&series.id).await {
            Ok(page) => {
                let native = page.into_items().into_iter().find(|episode| {
                    episode.parent_index_number.unwrap_or(1) == number.season
                        && episode.index_number == Some(number.episode)
                });
                if let Some(episode) = native {
                    return Ok(Some(episode.id));
                }
            }
            Err(err) => {
                warn!(series = %series.id, error = %err, "episode listing failed");
            }
        }

        let videos = FallbackEpisodeSynthesizer::new(self.source)
            .with_limit(self.fallback_limit)
            .synthesize(series, build_external_id, |_: &RawItem| None)
            .await?;
        Ok(videos
            .into_iter()
            .find(|video| video.sort_key() == (number.season, number.episode))
            .and_then(|video| parse_external_id(&video.id))
            .map(|id| id.server_id))
    }

    async fn find(&self, id: &ProviderId, item_type: ItemType) -> Result<Option<RawItem>> {
        let base = ItemsQuery::default()
            .include_types(std::slice::from_ref(&item_type))
            .fields(LOOKUP_FIELDS)
            .recursive(true);

        for key in id.lookup_keys() {
            let mut query = base.clone().limit(LOOKUP_LIMIT).provider_id(key);
            if item_type == ItemType::Movie {
                query = query.filters(&["IsNotFolder"]);
            }
            match self.source.fetch_items(&query).await {
                Ok(page) => {
                    let found = page
                        .into_items()
                        .into_iter()
                        .find(|item| id.matches(&item.provider_ids));
                    if found.is_some() {
                        return Ok(found);
                    }
                }
                Err(err) => {
                    warn!(provider_id = %id, error = %err, "provider id lookup failed");
                }
            }
        }

        debug!(provider_id = %id, %item_type, "scanning recently added items");
        let recent = base
            .sort(&["DateCreated"], SortOrder::Descending)
            .limit(RECENT_SCAN_LIMIT);
        Ok(self
            .source
            .fetch_items(&recent)
            .await?
            .into_items()
            .into_iter()
            .find(|item| id.matches(&item.provider_ids)))
    }
}
