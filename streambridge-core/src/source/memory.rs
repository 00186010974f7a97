use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use streambridge_model::{ItemType, ItemsPage, MediaSource, PlaybackInfo, RawItem};

use super::{ItemSource, ItemsQuery, SourceConnector, SourceCredentials};
use crate::error::{BridgeError, Result};

/// In-memory library for tests and local wiring.
///
/// Items hang off parents by id; a parent may list itself or an ancestor to
/// model cyclic folder links. Every query is recorded. Only `SortName`
/// ordering is emulated, other sort keys keep insertion order. Queries
/// without a parent list every item ordered by id.
#[derive(Debug, Default)]
pub struct InMemorySource {
    items: HashMap<String, RawItem>,
    children: HashMap<String, Vec<String>>,
    views: Vec<String>,
    episodes: HashMap<String, Vec<RawItem>>,
    playback: HashMap<String, Vec<MediaSource>>,
    failing_parents: HashSet<String>,
    failing_episodes: HashSet<String>,
    queries: Mutex<Vec<ItemsQuery>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item, optionally as a child of `parent`.
    pub fn add_item(&mut self, parent: Option<&str>, item: RawItem) {
        if let Some(parent) = parent {
            self.link(parent, &item.id);
        }
        self.items.insert(item.id.clone(), item);
    }

    /// Make `child` a direct child of `parent` without registering it again.
    pub fn link(&mut self, parent: &str, child: &str) {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
    }

    pub fn add_view(&mut self, view: RawItem) {
        self.views.push(view.id.clone());
        self.items.insert(view.id.clone(), view);
    }

    pub fn set_episodes(&mut self, series_id: &str, episodes: Vec<RawItem>) {
        self.episodes.insert(series_id.to_string(), episodes);
    }

    pub fn set_media_sources(&mut self, item_id: &str, sources: Vec<MediaSource>) {
        self.playback.insert(item_id.to_string(), sources);
    }

    /// Items queries under `parent` fail with a 500.
    pub fn fail_children_of(&mut self, parent: &str) {
        self.failing_parents.insert(parent.to_string());
    }

    pub fn fail_episodes_of(&mut self, series_id: &str) {
        self.failing_episodes.insert(series_id.to_string());
    }

    pub fn queries(&self) -> Vec<ItemsQuery> {
        self.recorded().clone()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<ItemsQuery>> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn direct_children(&self, parent: &str) -> Vec<&RawItem> {
        self.children
            .get(parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.items.get(id))
            .collect()
    }

    fn descendants(&self, root: &str) -> Vec<&RawItem> {
        let mut seen = HashSet::from([root.to_string()]);
        let mut queue = VecDeque::from([root.to_string()]);
        let mut out = Vec::new();
        while let Some(parent) = queue.pop_front() {
            for child in self.direct_children(&parent) {
                if seen.insert(child.id.clone()) {
                    queue.push_back(child.id.clone());
                    out.push(child);
                }
            }
        }
        out
    }
}

/// `AnyProviderIdEquals` semantics: `<provider>.<id>`, provider without case.
fn has_provider_id(item: &RawItem, key: &str) -> bool {
    key.split_once('.')
        .is_some_and(|(provider, id)| item.provider_id(provider) == Some(id))
}

fn is_container(item: &RawItem) -> bool {
    matches!(
        item.item_type,
        ItemType::Folder
            | ItemType::CollectionFolder
            | ItemType::UserView
            | ItemType::BoxSet
            | ItemType::Series
            | ItemType::Season
    )
}

fn failure(url: String) -> BridgeError {
    BridgeError::Status { status: 500, url }
}

#[async_trait]
impl ItemSource for InMemorySource {
    async fn fetch_items(&self, query: &ItemsQuery) -> Result<ItemsPage> {
        self.recorded().push(query.clone());

        let candidates: Vec<&RawItem> = match &query.parent_id {
            Some(parent) if self.failing_parents.contains(parent) => {
                return Err(failure(format!("memory://items?ParentId={parent}")));
            }
            Some(parent) if query.is_recursive() => self.descendants(parent),
            Some(parent) => self.direct_children(parent),
            None => {
                let mut all: Vec<&RawItem> = self.items.values().collect();
                all.sort_by(|a, b| a.id.cmp(&b.id));
                all
            }
        };

        let needle = query.search_term.as_deref().map(str::to_lowercase);
        let leaves_only = query.filters.iter().any(|f| f == "IsNotFolder");
        let mut matched: Vec<RawItem> = candidates
            .into_iter()
            .filter(|item| {
                query.include_item_types.is_empty()
                    || query.include_item_types.contains(&item.item_type)
            })
            .filter(|item| match &query.any_provider_id_equals {
                Some(key) => has_provider_id(item, key),
                None => true,
            })
            .filter(|item| !leaves_only || !is_container(item))
            .filter(|item| match &needle {
                Some(needle) => item
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(needle)),
                None => true,
            })
            .cloned()
            .collect();

        if query.sort_by.first().map(String::as_str) == Some("SortName") {
            matched.sort_by(|a, b| {
                let a = a.sort_name.as_ref().or(a.name.as_ref());
                let b = b.sort_name.as_ref().or(b.name.as_ref());
                a.cmp(&b)
            });
        }

        let start = query.start_index.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);
        let page = matched.into_iter().skip(start).take(limit).collect();
        Ok(ItemsPage::from_items(page))
    }

    async fn fetch_item(&self, item_id: &str) -> Result<Option<RawItem>> {
        Ok(self.items.get(item_id).cloned())
    }

    async fn fetch_views(&self) -> Result<ItemsPage> {
        let views = self
            .views
            .iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect();
        Ok(ItemsPage::from_items(views))
    }

    async fn fetch_series_episodes(&self, series_id: &str) -> Result<ItemsPage> {
        if self.failing_episodes.contains(series_id) {
            return Err(failure(format!("memory://shows/{series_id}/episodes")));
        }
        Ok(ItemsPage::from_items(
            self.episodes.get(series_id).cloned().unwrap_or_default(),
        ))
    }

    async fn fetch_playback_info(&self, item_id: &str) -> Result<PlaybackInfo> {
        Ok(PlaybackInfo::from_sources(
            self.playback.get(item_id).cloned().unwrap_or_default(),
        ))
    }
}

/// Hands out the same in-memory library for any credentials and remembers
/// which credentials asked.
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    source: Arc<InMemorySource>,
    connections: Mutex<Vec<SourceCredentials>>,
}

impl InMemoryConnector {
    pub fn new(source: InMemorySource) -> Self {
        Self {
            source: Arc::new(source),
            connections: Mutex::default(),
        }
    }

    pub fn source(&self) -> &InMemorySource {
        &self.source
    }

    pub fn connections(&self) -> Vec<SourceCredentials> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SourceConnector for InMemoryConnector {
    fn connect(&self, credentials: &SourceCredentials) -> Result<Arc<dyn ItemSource>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(credentials.clone());
        let source: Arc<dyn ItemSource> = self.source.clone();
        Ok(source)
    }
}
