use streambridge_model::{IdKind, ItemType, RawItem, SeriesVideo};
use tracing::debug;

use crate::error::Result;
use crate::source::{ItemSource, ItemsQuery, SortOrder};

pub const DEFAULT_FALLBACK_LIMIT: u32 = 3000;

const FALLBACK_FIELDS: &[&str] = &[
    "Name",
    "IndexNumber",
    "ParentIndexNumber",
    "Id",
    "Overview",
    "PremiereDate",
    "ImageTags",
    "SortName",
];
const DEFAULT_SEASON: i32 = 1;

/// Builds an episode list for a series from whatever playable items sit
/// below it, for libraries where the server has no usable episode records.
#[derive(Clone, Copy)]
pub struct FallbackEpisodeSynthesizer<'a> {
    source: &'a dyn ItemSource,
    limit: u32,
}

impl std::fmt::Debug for FallbackEpisodeSynthesizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackEpisodeSynthesizer")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<'a> FallbackEpisodeSynthesizer<'a> {
    pub fn new(source: &'a dyn ItemSource) -> Self {
        Self {
            source,
            limit: DEFAULT_FALLBACK_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn descendants_query(&self, series_id: &str) -> ItemsQuery {
        ItemsQuery::children_of(series_id)
            .include_types(&ItemType::SERIES_CHILDREN)
            .fields(FALLBACK_FIELDS)
            .sort(
                &["ParentIndexNumber", "IndexNumber", "SortName"],
                SortOrder::Ascending,
            )
            .recursive(true)
            .limit(self.limit)
            .images(1, &["Primary"])
    }

    /// One bulk fetch, then a single forward pass.
    ///
    /// Every accepted child advances the ordinal counter, including children
    /// later dropped because `build_id` could not name them. Missing season
    /// numbers default to 1, missing episode numbers to the ordinal. The
    /// result is stably sorted by `(season, episode)`.
    pub async fn synthesize<B, T>(
        &self,
        series: &RawItem,
        build_id: B,
        thumbnail: T,
    ) -> Result<Vec<SeriesVideo>>
    where
        B: Fn(IdKind, &str) -> Option<String>,
        T: Fn(&RawItem) -> Option<String>,
    {
        let children = self
            .source
            .fetch_items(&self.descendants_query(&series.id))
            .await?
            .into_items();
        if children.is_empty() {
            debug!(series = %series.id, "no descendants to synthesize from");
            return Ok(Vec::new());
        }

        let mut ordinal = 0;
        let mut dropped = 0usize;
        let mut videos = Vec::with_capacity(children.len());

        for child in children
            .iter()
            .filter(|child| child.item_type.is_series_child())
        {
            // Numbered before the id check: a dropped child still uses up its
            // ordinal so later fallback numbers do not shift.
            ordinal += 1;
            let Some(id) = build_id(IdKind::Episode, &child.id) else {
                dropped += 1;
                continue;
            };

            let season = child.parent_index_number.unwrap_or(DEFAULT_SEASON);
            let episode = child.index_number.unwrap_or(ordinal);
            videos.push(SeriesVideo {
                id,
                title: child
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Episode {episode}")),
                season,
                episode,
                overview: child.overview.clone(),
                released: child.premiere_date.clone(),
                thumbnail: thumbnail(child),
            });
        }

        videos.sort_by_key(SeriesVideo::sort_key);
        debug!(
            series = %series.id,
            videos = videos.len(),
            dropped,
            "synthesized fallback episodes"
        );
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::source::InMemorySource;
    use streambridge_model::build_external_id;

    fn child(id: &str, season: Option<i32>, episode: Option<i32>) -> RawItem {
        RawItem::new(id, ItemType::Episode).with_numbers(season, episode)
    }

    fn no_thumbnail(_: &RawItem) -> Option<String> {
        None
    }

    fn library(children: Vec<RawItem>) -> InMemorySource {
        let mut source = InMemorySource::new();
        source.add_item(None, RawItem::new("show", ItemType::Series));
        for item in children {
            source.add_item(Some("show"), item);
        }
        source
    }

    fn show() -> RawItem {
        RawItem::new("show", ItemType::Series)
    }

    #[tokio::test]
    async fn ordinals_fill_missing_numbers_and_output_is_sorted() {
        let source = library(vec![
            child("a", None, Some(2)),
            child("b", None, None),
            child("c", None, Some(1)),
        ]);

        let videos = FallbackEpisodeSynthesizer::new(&source)
            .synthesize(&show(), build_external_id, no_thumbnail)
            .await
            .unwrap();

        let keys: Vec<_> = videos.iter().map(SeriesVideo::sort_key).collect();
        assert_eq!(keys, vec![(1, 1), (1, 2), (1, 2)]);
        let ids: Vec<_> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["emby~episode~c", "emby~episode~a", "emby~episode~b"]);
        let fallback = &videos[2];
        assert_eq!(fallback.episode, 2);
        assert_eq!(fallback.title, "Episode 2");
    }

    #[tokio::test]
    async fn absent_optional_fields_stay_absent() {
        let mut with_details = child("a", Some(2), Some(1)).with_name("Pilot");
        with_details.overview = Some("It begins".into());
        with_details.premiere_date = Some("2020-01-01T00:00:00Z".into());
        let source = library(vec![with_details, child("b", Some(2), Some(2))]);

        let videos = FallbackEpisodeSynthesizer::new(&source)
            .synthesize(&show(), build_external_id, |item: &RawItem| {
                item.primary_image_tag().map(|tag| format!("thumb:{tag}"))
            })
            .await
            .unwrap();

        assert_eq!(videos[0].title, "Pilot");
        assert_eq!(videos[0].season, 2);
        assert_eq!(videos[0].overview.as_deref(), Some("It begins"));
        assert_eq!(videos[0].released.as_deref(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(videos[1].overview, None);
        assert_eq!(videos[1].released, None);
        assert_eq!(videos[1].thumbnail, None);
    }

    #[tokio::test]
    async fn unmappable_children_are_dropped_without_renumbering() {
        let source = library(vec![
            child("a", None, None),
            child("bad~id", None, None),
            child("c", None, None),
        ]);

        let videos = FallbackEpisodeSynthesizer::new(&source)
            .synthesize(&show(), build_external_id, no_thumbnail)
            .await
            .unwrap();

        let episodes: Vec<_> = videos.iter().map(|v| (v.id.as_str(), v.episode)).collect();
        assert_eq!(
            episodes,
            vec![("emby~episode~a", 1), ("emby~episode~c", 3)]
        );
    }

    #[tokio::test]
    async fn season_defaults_to_one_and_other_types_are_ignored() {
        let source = library(vec![
            RawItem::new("v", ItemType::Video),
            RawItem::new("season", ItemType::Season),
            child("e", Some(0), Some(5)),
        ]);

        let videos = FallbackEpisodeSynthesizer::new(&source)
            .synthesize(&show(), build_external_id, no_thumbnail)
            .await
            .unwrap();

        let keys: Vec<_> = videos.iter().map(SeriesVideo::sort_key).collect();
        assert_eq!(keys, vec![(0, 5), (1, 1)]);
    }

    #[tokio::test]
    async fn empty_series_yields_empty_list() {
        let source = library(Vec::new());
        let videos = FallbackEpisodeSynthesizer::new(&source)
            .synthesize(&show(), build_external_id, no_thumbnail)
            .await
            .unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn issues_one_recursive_bulk_query() {
        let source = library(vec![child("a", None, None)]);
        FallbackEpisodeSynthesizer::new(&source)
            .with_limit(25)
            .synthesize(&show(), build_external_id, no_thumbnail)
            .await
            .unwrap();

        let queries = source.queries();
        assert_eq!(queries.len(), 1);
        let pairs = queries[0].to_pairs();
        assert!(pairs.contains(&("Recursive", "true".to_string())));
        assert!(pairs.contains(&("IncludeItemTypes", "Episode,Video,Movie".to_string())));
        assert!(pairs.contains(&("SortBy", "ParentIndexNumber,IndexNumber,SortName".to_string())));
        assert!(pairs.contains(&("Limit", "25".to_string())));
        assert!(pairs.contains(&("EnableImageTypes", "Primary".to_string())));
    }

    #[tokio::test]
    async fn fetch_failures_propagate() {
        let mut source = library(Vec::new());
        source.fail_children_of("show");
        let err = FallbackEpisodeSynthesizer::new(&source)
            .synthesize(&show(), build_external_id, no_thumbnail)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Status { .. }));
    }
}
