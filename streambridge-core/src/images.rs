use streambridge_model::RawItem;
use url::Url;

use crate::error::{BridgeError, Result};

const IMAGE_QUALITY: &str = "90";

/// Builds public image URLs on the media server.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: Url,
}

impl ImageUrls {
    pub fn new(server_url: &str) -> Result<Self> {
        let base = Url::parse(server_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::Unsupported(format!(
                "server url cannot carry a path: {base}"
            )));
        }
        Ok(Self { base })
    }

    pub fn primary(&self, item: &RawItem) -> Option<String> {
        let tag = item.primary_image_tag()?;
        self.image(&item.id, &["Primary"], tag)
    }

    pub fn backdrop(&self, item: &RawItem) -> Option<String> {
        let tag = item.backdrop_image_tags.first()?;
        self.image(&item.id, &["Backdrop", "0"], tag)
    }

    /// Episode still: the item's own primary image, else the parent's thumb.
    pub fn thumbnail(&self, item: &RawItem) -> Option<String> {
        self.primary(item).or_else(|| {
            let parent = item.parent_thumb_item_id.as_deref()?;
            let tag = item.parent_thumb_image_tag.as_deref()?;
            self.image(parent, &["Thumb"], tag)
        })
    }

    fn image(&self, item_id: &str, kind: &[&str], tag: &str) -> Option<String> {
        if item_id.is_empty() {
            return None;
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["Items", item_id, "Images"])
            .extend(kind);
        url.query_pairs_mut()
            .append_pair("tag", tag)
            .append_pair("quality", IMAGE_QUALITY);
        Some(url.into())
    }
}
