use streambridge_model::{
    CatalogKind, IdKind, MetaDetail, MetaPreview, RawItem, SeriesVideo, build_external_id,
};
use tracing::debug;

use crate::images::ImageUrls;

/// Turns raw server items into front-end meta records.
#[derive(Debug, Clone)]
pub struct MetaMapper {
    images: ImageUrls,
}

impl MetaMapper {
    pub fn new(images: ImageUrls) -> Self {
        Self { images }
    }

    pub fn images(&self) -> &ImageUrls {
        &self.images
    }

    /// `None` when the item has no encodable id.
    pub fn to_preview(&self, item: &RawItem, kind: CatalogKind) -> Option<MetaPreview> {
        let Some(id) = build_external_id(IdKind::for_item_type(&item.item_type), &item.id) else {
            debug!(item = %item.id, item_type = %item.item_type, "skipping item without usable id");
            return None;
        };

        Some(MetaPreview {
            id,
            kind,
            name: item
                .name
                .clone()
                .or_else(|| item.sort_name.clone())
                .unwrap_or_default(),
            poster: self.images.primary(item),
            background: self.images.backdrop(item),
            description: item.overview.clone(),
            release_info: item.release_year().map(|year| year.to_string()),
        })
    }

    pub fn to_detail(
        &self,
        item: &RawItem,
        kind: CatalogKind,
        videos: Vec<SeriesVideo>,
    ) -> Option<MetaDetail> {
        let preview = self.to_preview(item, kind)?;
        Some(MetaDetail {
            preview,
            genres: item.genres.clone(),
            videos,
        })
    }

    /// Map a native episode record. Unnumbered seasons read as season 1.
    pub fn to_video(&self, episode: &RawItem) -> Option<SeriesVideo> {
        let id = build_external_id(IdKind::Episode, &episode.id)?;
        let number = episode.index_number?;
        Some(SeriesVideo {
            id,
            title: episode
                .name
                .clone()
                .unwrap_or_else(|| format!("Episode {number}")),
            season: episode.parent_index_number.unwrap_or(1),
            episode: number,
            overview: episode.overview.clone(),
            released: episode.premiere_date.clone(),
            thumbnail: self.images.thumbnail(episode),
        })
    }
}
