use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Media-server item type (`Type` on the wire).
///
/// Only the types the catalog engine reasons about get their own variant;
/// everything else collapses into [`ItemType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ItemType {
    Folder,
    CollectionFolder,
    UserView,
    BoxSet,
    Series,
    Season,
    Episode,
    Movie,
    Video,
    Other(String),
    #[default]
    Unknown,
}

impl ItemType {
    /// Leaf types accepted as children when synthesizing a series episode list.
    pub const SERIES_CHILDREN: [ItemType; 3] =
        [ItemType::Episode, ItemType::Video, ItemType::Movie];

    pub fn from_name(name: &str) -> Self {
        match name {
            "Folder" => ItemType::Folder,
            "CollectionFolder" => ItemType::CollectionFolder,
            "UserView" => ItemType::UserView,
            "BoxSet" => ItemType::BoxSet,
            "Series" => ItemType::Series,
            "Season" => ItemType::Season,
            "Episode" => ItemType::Episode,
            "Movie" => ItemType::Movie,
            "Video" => ItemType::Video,
            "" => ItemType::Unknown,
            other => ItemType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Folder => "Folder",
            ItemType::CollectionFolder => "CollectionFolder",
            ItemType::UserView => "UserView",
            ItemType::BoxSet => "BoxSet",
            ItemType::Series => "Series",
            ItemType::Season => "Season",
            ItemType::Episode => "Episode",
            ItemType::Movie => "Movie",
            ItemType::Video => "Video",
            ItemType::Other(name) => name,
            ItemType::Unknown => "",
        }
    }

    /// Plain grouping folder. Collection folders and views are library
    /// roots, not nodes the traversal walks into.
    pub fn is_folder(&self) -> bool {
        matches!(self, ItemType::Folder)
    }

    pub fn is_series_child(&self) -> bool {
        Self::SERIES_CHILDREN.contains(self)
    }

    /// Render a type list the way the server expects `IncludeItemTypes`.
    pub fn join(types: &[ItemType]) -> String {
        types
            .iter()
            .map(ItemType::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ItemType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = crate::lenient::optional_text(deserializer)?;
        Ok(name.as_deref().map(ItemType::from_name).unwrap_or_default())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ItemType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A server-provided item, as returned by `/Users/{id}/Items`.
///
/// Treated as immutable input. Every optional attribute may be missing on
/// the wire; the lenient deserializers turn wrong-typed values into `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct RawItem {
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::identifier")
    )]
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "Type", default))]
    pub item_type: ItemType,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub name: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub sort_name: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub parent_index_number: Option<i32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub index_number: Option<i32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub overview: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub premiere_date: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub production_year: Option<i32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub collection_type: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::string_map")
    )]
    pub image_tags: BTreeMap<String, String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::string_list")
    )]
    pub backdrop_image_tags: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub parent_thumb_item_id: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_text")
    )]
    pub parent_thumb_image_tag: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::string_list")
    )]
    pub genres: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::identifier_map")
    )]
    pub provider_ids: BTreeMap<String, String>,
}

impl RawItem {
    pub fn new(id: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            item_type,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_numbers(mut self, season: Option<i32>, episode: Option<i32>) -> Self {
        self.parent_index_number = season;
        self.index_number = episode;
        self
    }

    pub fn with_image_tag(
        mut self,
        image_type: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        self.image_tags.insert(image_type.into(), tag.into());
        self
    }

    pub fn with_provider_id(mut self, provider: impl Into<String>, id: impl Into<String>) -> Self {
        self.provider_ids.insert(provider.into(), id.into());
        self
    }

    /// Provider id lookup that ignores the key's case (`Imdb`, `imdb`, `IMDB`).
    pub fn provider_id(&self, provider: &str) -> Option<&str> {
        self.provider_ids
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(provider))
            .map(|(_, value)| value.as_str())
    }

    pub fn primary_image_tag(&self) -> Option<&str> {
        self.image_tags.get("Primary").map(String::as_str)
    }

    /// Release year, from `ProductionYear` or the year prefix of `PremiereDate`.
    pub fn release_year(&self) -> Option<i32> {
        self.production_year.or_else(|| {
            self.premiere_date
                .as_deref()
                .and_then(|date| date.get(..4))
                .and_then(|year| year.parse().ok())
        })
    }
}

/// One page of an items query.
///
/// `Items` can be absent, `null`, or contain `null` members; use
/// [`ItemsPage::into_items`] to get the normalized list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct ItemsPage {
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Option<Vec<Option<RawItem>>>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::lenient::optional_number")
    )]
    pub total_record_count: Option<i32>,
}

impl ItemsPage {
    pub fn from_items(items: Vec<RawItem>) -> Self {
        Self {
            total_record_count: i32::try_from(items.len()).ok(),
            items: Some(items.into_iter().map(Some).collect()),
        }
    }

    pub fn into_items(self) -> Vec<RawItem> {
        self.items.unwrap_or_default().into_iter().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items
            .as_ref()
            .is_none_or(|items| items.iter().all(Option::is_none))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn missing_or_null_items_normalize_to_empty() {
        let page: ItemsPage = serde_json::from_str(r#"{"Items": null}"#).unwrap();
        assert!(page.is_empty());
        assert!(page.into_items().is_empty());

        let page: ItemsPage = serde_json::from_str("{}").unwrap();
        assert!(page.into_items().is_empty());
    }

    #[test]
    fn null_members_are_skipped() {
        let page: ItemsPage = serde_json::from_str(
            r#"{"Items": [null, {"Id": "a1", "Type": "Series", "Name": "Dark"}]}"#,
        )
        .unwrap();
        let items = page.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a1");
        assert_eq!(items[0].item_type, ItemType::Series);
        assert_eq!(items[0].name.as_deref(), Some("Dark"));
    }

    #[test]
    fn wrong_typed_numbers_read_as_absent() {
        let item: RawItem = serde_json::from_str(
            r#"{"Id": 42, "Type": "Episode", "IndexNumber": "3",
                "ParentIndexNumber": 2.0, "Overview": "", "ProductionYear": null}"#,
        )
        .unwrap();
        assert_eq!(item.id, "42");
        assert_eq!(item.index_number, None);
        assert_eq!(item.parent_index_number, Some(2));
        assert_eq!(item.overview, None);
        assert_eq!(item.production_year, None);
    }

    #[test]
    fn unknown_and_missing_types() {
        let item: RawItem =
            serde_json::from_str(r#"{"Id": "x", "Type": "Trailer"}"#).unwrap();
        assert_eq!(item.item_type, ItemType::Other("Trailer".into()));

        let item: RawItem = serde_json::from_str(r#"{"Id": "x"}"#).unwrap();
        assert_eq!(item.item_type, ItemType::Unknown);
    }

    #[test]
    fn null_or_malformed_image_tags_do_not_fail_the_page() {
        let page: ItemsPage = serde_json::from_str(
            r#"{"Items": [
                {"Id": "a1", "Type": "Series", "ImageTags": null},
                {"Id": "a2", "Type": "Series"},
                {"Id": "a3", "Type": "Series", "ImageTags": {"Primary": 5, "Thumb": "t3"}},
                {"Id": "a4", "Type": "Series", "ImageTags": ["Primary"]}
            ]}"#,
        )
        .unwrap();
        let items = page.into_items();
        assert_eq!(items.len(), 4);
        assert!(items[0].image_tags.is_empty());
        assert!(items[1].image_tags.is_empty());
        assert_eq!(items[2].primary_image_tag(), None);
        assert_eq!(items[2].image_tags.get("Thumb").map(String::as_str), Some("t3"));
        assert!(items[3].image_tags.is_empty());
    }

    #[test]
    fn provider_ids_accept_numbers_and_any_key_case() {
        let item: RawItem = serde_json::from_str(
            r#"{"Id": "m1", "Type": "Movie",
                "ProviderIds": {"IMDB": "tt0083658", "Tmdb": 78, "Tvdb": null}}"#,
        )
        .unwrap();
        assert_eq!(item.provider_id("imdb"), Some("tt0083658"));
        assert_eq!(item.provider_id("tmdb"), Some("78"));
        assert_eq!(item.provider_id("tvdb"), None);

        let item: RawItem =
            serde_json::from_str(r#"{"Id": "m2", "ProviderIds": null}"#).unwrap();
        assert!(item.provider_ids.is_empty());
    }

    #[test]
    fn release_year_prefers_production_year() {
        let mut item = RawItem::new("m", ItemType::Movie);
        item.premiere_date = Some("2019-05-01T00:00:00.0000000Z".into());
        assert_eq!(item.release_year(), Some(2019));
        item.production_year = Some(2018);
        assert_eq!(item.release_year(), Some(2018));
    }

    #[test]
    fn joins_include_types() {
        assert_eq!(
            ItemType::join(&ItemType::SERIES_CHILDREN),
            "Episode,Video,Movie"
        );
    }
}
