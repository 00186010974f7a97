//! Media-server access.
//!
//! The catalog engine never talks HTTP directly; it goes through
//! [`ItemSource`], which the Emby client implements for production and
//! [`InMemorySource`] implements for tests.

pub mod emby;
pub mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use streambridge_model::{ItemType, ItemsPage, PlaybackInfo, RawItem};

use crate::error::Result;

pub use emby::{ClientSettings, EmbyClient, EmbyConnector};
pub use memory::{InMemoryConnector, InMemorySource};

/// Read-only view of one user's library on a media server.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Run an items query. A missing or `null` `Items` list is not an error.
    async fn fetch_items(&self, query: &ItemsQuery) -> Result<ItemsPage>;

    /// Fetch a single item. `Ok(None)` when the server does not know it.
    async fn fetch_item(&self, item_id: &str) -> Result<Option<RawItem>>;

    /// Top-level library views of the user.
    async fn fetch_views(&self) -> Result<ItemsPage>;

    /// Native episode listing of a series.
    async fn fetch_series_episodes(&self, series_id: &str) -> Result<ItemsPage>;

    /// Playable versions of an item. An unknown item has no sources.
    async fn fetch_playback_info(&self, item_id: &str) -> Result<PlaybackInfo>;
}

/// Credentials for one media-server user, as carried by an addon install.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceCredentials {
    pub server_url: String,
    pub user_id: String,
    pub access_token: String,
}

impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("server_url", &self.server_url)
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Builds an [`ItemSource`] for a set of credentials.
pub trait SourceConnector: Send + Sync {
    fn connect(&self, credentials: &SourceCredentials) -> Result<Arc<dyn ItemSource>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

/// Parameters of an `/Items` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsQuery {
    pub parent_id: Option<String>,
    pub include_item_types: Vec<ItemType>,
    pub fields: Vec<String>,
    pub sort_by: Vec<String>,
    pub sort_order: Option<SortOrder>,
    pub recursive: Option<bool>,
    pub user_id: Option<String>,
    pub limit: Option<u32>,
    pub start_index: Option<u32>,
    pub search_term: Option<String>,
    pub image_type_limit: Option<u32>,
    pub enable_image_types: Vec<String>,
    pub any_provider_id_equals: Option<String>,
    pub filters: Vec<String>,
}

impl ItemsQuery {
    pub fn children_of(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::default()
        }
    }

    pub fn include_types(mut self, types: &[ItemType]) -> Self {
        self.include_item_types = types.to_vec();
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn sort(mut self, sort_by: &[&str], order: SortOrder) -> Self {
        self.sort_by = sort_by.iter().map(|s| s.to_string()).collect();
        self.sort_order = Some(order);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_index(mut self, start_index: u32) -> Self {
        self.start_index = Some(start_index);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn images(mut self, per_type: u32, image_types: &[&str]) -> Self {
        self.image_type_limit = Some(per_type);
        self.enable_image_types = image_types.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Restrict to items carrying a provider id, as `<provider>.<id>`.
    pub fn provider_id(mut self, key: impl Into<String>) -> Self {
        self.any_provider_id_equals = Some(key.into());
        self
    }

    pub fn filters(mut self, filters: &[&str]) -> Self {
        self.filters = filters.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive.unwrap_or(false)
    }

    /// Query-string pairs in a fixed order. Empty lists are left out.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(parent_id) = &self.parent_id {
            pairs.push(("ParentId", parent_id.clone()));
        }
        if !self.include_item_types.is_empty() {
            pairs.push(("IncludeItemTypes", ItemType::join(&self.include_item_types)));
        }
        if !self.fields.is_empty() {
            pairs.push(("Fields", self.fields.join(",")));
        }
        if !self.sort_by.is_empty() {
            pairs.push(("SortBy", self.sort_by.join(",")));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("SortOrder", order.as_str().to_string()));
        }
        if let Some(recursive) = self.recursive {
            pairs.push(("Recursive", recursive.to_string()));
        }
        if let Some(user_id) = &self.user_id {
            pairs.push(("UserId", user_id.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("Limit", limit.to_string()));
        }
        if let Some(start_index) = self.start_index {
            pairs.push(("StartIndex", start_index.to_string()));
        }
        if let Some(term) = &self.search_term {
            pairs.push(("SearchTerm", term.clone()));
        }
        if let Some(per_type) = self.image_type_limit {
            pairs.push(("ImageTypeLimit", per_type.to_string()));
        }
        if !self.enable_image_types.is_empty() {
            pairs.push(("EnableImageTypes", self.enable_image_types.join(",")));
        }
        if let Some(key) = &self.any_provider_id_equals {
            pairs.push(("AnyProviderIdEquals", key.clone()));
        }
        if !self.filters.is_empty() {
            pairs.push(("Filters", self.filters.join(",")));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_pairs_in_stable_order() {
        let query = ItemsQuery::children_of("lib1")
            .include_types(&[ItemType::Series, ItemType::Folder])
            .recursive(false)
            .sort(&["SortName"], SortOrder::Ascending)
            .limit(100)
            .images(2, &["Primary", "Backdrop"]);

        assert_eq!(
            query.to_pairs(),
            vec![
                ("ParentId", "lib1".to_string()),
                ("IncludeItemTypes", "Series,Folder".to_string()),
                ("SortBy", "SortName".to_string()),
                ("SortOrder", "Ascending".to_string()),
                ("Recursive", "false".to_string()),
                ("Limit", "100".to_string()),
                ("ImageTypeLimit", "2".to_string()),
                ("EnableImageTypes", "Primary,Backdrop".to_string()),
            ]
        );
    }

    #[test]
    fn provider_lookup_pairs_follow_paging() {
        let query = ItemsQuery::default()
            .include_types(&[ItemType::Movie])
            .recursive(true)
            .limit(10)
            .provider_id("imdb.tt0083658")
            .filters(&["IsNotFolder"]);

        assert_eq!(
            query.to_pairs(),
            vec![
                ("IncludeItemTypes", "Movie".to_string()),
                ("Recursive", "true".to_string()),
                ("Limit", "10".to_string()),
                ("AnyProviderIdEquals", "imdb.tt0083658".to_string()),
                ("Filters", "IsNotFolder".to_string()),
            ]
        );
    }

    #[test]
    fn empty_query_renders_nothing() {
        assert!(ItemsQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn credentials_debug_hides_token() {
        let credentials = SourceCredentials {
            server_url: "http://emby.local".into(),
            user_id: "u1".into(),
            access_token: "secret".into(),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("secret"));
    }
}
