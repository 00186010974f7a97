use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use streambridge_model::{CatalogKind, RawItem};
use tracing::debug;

use crate::error::Result;
use crate::source::{ItemSource, ItemsQuery};

/// Lists the direct children of a folder.
#[async_trait]
pub trait FolderChildren: Send + Sync {
    async fn fetch_children(&self, folder_id: &str) -> Result<Vec<RawItem>>;
}

/// [`FolderChildren`] over an [`ItemSource`]; every folder is listed with
/// the same query, only `ParentId` changes.
#[derive(Debug)]
pub struct SourceChildren<'a, S: ?Sized> {
    source: &'a S,
    template: ItemsQuery,
}

impl<'a, S: ItemSource + ?Sized> SourceChildren<'a, S> {
    pub fn new(source: &'a S, template: ItemsQuery) -> Self {
        Self { source, template }
    }
}

#[async_trait]
impl<'a, S: ItemSource + ?Sized> FolderChildren for SourceChildren<'a, S> {
    async fn fetch_children(&self, folder_id: &str) -> Result<Vec<RawItem>> {
        let mut query = self.template.clone();
        query.parent_id = Some(folder_id.to_string());
        Ok(self.source.fetch_items(&query).await?.into_items())
    }
}

/// Flatten a library listing into the playable items of `kind`.
///
/// Series catalogs walk plain folders breadth-first; every other kind only
/// filters the roots by type. A folder that yields no playable child is
/// kept as an entry of its own. Fetch errors abort the whole expansion.
pub async fn expand(
    roots: Vec<RawItem>,
    kind: CatalogKind,
    children: &dyn FolderChildren,
) -> Result<Vec<RawItem>> {
    let walk_folders = kind == CatalogKind::Series;
    let mut queue = VecDeque::from(roots);
    let mut visited: HashSet<String> = HashSet::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut expanded = Vec::new();

    while let Some(current) = queue.pop_front() {
        if walk_folders && current.item_type.is_folder() {
            if !visited.insert(current.id.clone()) {
                continue;
            }

            let listing = children.fetch_children(&current.id).await?;
            debug!(folder = %current.id, children = listing.len(), "expanding folder");

            let mut pushed_child = false;
            for child in listing {
                if child.item_type.is_folder() {
                    if !visited.contains(&child.id) {
                        queue.push_back(child);
                    }
                } else if kind.accepts(&child.item_type) {
                    queue.push_back(child);
                    pushed_child = true;
                }
            }

            if !pushed_child {
                push_unique(&mut expanded, &mut seen, current);
            }
        } else if kind.accepts(&current.item_type) {
            push_unique(&mut expanded, &mut seen, current);
        }
    }

    debug!(
        kind = %kind,
        items = expanded.len(),
        folders = visited.len(),
        "library tree expanded"
    );
    Ok(expanded)
}

fn push_unique(expanded: &mut Vec<RawItem>, seen: &mut HashSet<String>, item: RawItem) {
    if seen.insert(item.id.clone()) {
        expanded.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use streambridge_model::ItemType;

    #[derive(Default)]
    struct StubChildren {
        listings: HashMap<String, Vec<RawItem>>,
        failing: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubChildren {
        fn with(mut self, folder: &str, children: Vec<RawItem>) -> Self {
            self.listings.insert(folder.to_string(), children);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FolderChildren for StubChildren {
        async fn fetch_children(&self, folder_id: &str) -> Result<Vec<RawItem>> {
            self.calls.lock().unwrap().push(folder_id.to_string());
            if self.failing.as_deref() == Some(folder_id) {
                return Err(BridgeError::Status {
                    status: 502,
                    url: format!("stub://{folder_id}"),
                });
            }
            Ok(self.listings.get(folder_id).cloned().unwrap_or_default())
        }
    }

    fn folder(id: &str) -> RawItem {
        RawItem::new(id, ItemType::Folder)
    }

    fn series(id: &str) -> RawItem {
        RawItem::new(id, ItemType::Series)
    }

    fn ids(items: &[RawItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[tokio::test]
    async fn cyclic_folders_are_visited_once() {
        let stub = StubChildren::default()
            .with("a", vec![folder("a"), folder("b"), series("s1")])
            .with("b", vec![folder("a"), series("s2")]);

        let out = expand(vec![folder("a")], CatalogKind::Series, &stub)
            .await
            .unwrap();

        assert_eq!(ids(&out), vec!["s1", "s2"]);
        assert_eq!(stub.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn folders_without_playable_children_are_kept() {
        let stub = StubChildren::default()
            .with("extras", vec![RawItem::new("m1", ItemType::Movie)])
            .with("empty", Vec::new());

        let out = expand(
            vec![folder("extras"), folder("empty"), folder("empty")],
            CatalogKind::Series,
            &stub,
        )
        .await
        .unwrap();

        assert_eq!(ids(&out), vec!["extras", "empty"]);
    }

    #[tokio::test]
    async fn folder_with_only_subfolders_keeps_itself_and_descends() {
        let stub = StubChildren::default()
            .with("anime", vec![folder("seasonal")])
            .with("seasonal", vec![series("s1")]);

        let out = expand(vec![folder("anime")], CatalogKind::Series, &stub)
            .await
            .unwrap();

        assert_eq!(ids(&out), vec!["anime", "s1"]);
    }

    #[tokio::test]
    async fn breadth_first_with_type_filtering() {
        let stub = StubChildren::default()
            .with(
                "f1",
                vec![
                    series("s2"),
                    RawItem::new("e1", ItemType::Episode),
                    folder("f2"),
                ],
            )
            .with("f2", vec![series("s3"), series("s2")]);

        let roots = vec![
            folder("f1"),
            series("s1"),
            RawItem::new("m1", ItemType::Movie),
            RawItem::new("x", ItemType::Other("Playlist".into())),
        ];
        let out = expand(roots, CatalogKind::Series, &stub).await.unwrap();

        assert_eq!(ids(&out), vec!["s1", "s2", "s3"]);
        assert!(out.iter().all(|item| item.item_type == ItemType::Series));
    }

    #[tokio::test]
    async fn movie_catalogs_never_fetch_children() {
        let stub = StubChildren::default().with("f1", vec![RawItem::new("m2", ItemType::Movie)]);

        let out = expand(
            vec![folder("f1"), RawItem::new("m1", ItemType::Movie)],
            CatalogKind::Movie,
            &stub,
        )
        .await
        .unwrap();

        assert_eq!(ids(&out), vec!["m1"]);
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let stub = StubChildren {
            failing: Some("f1".into()),
            ..StubChildren::default()
        };

        let err = expand(vec![series("s1"), folder("f1")], CatalogKind::Series, &stub)
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn source_children_reuses_template() {
        let mut source = crate::source::InMemorySource::new();
        source.add_item(Some("f1"), series("s1"));
        source.add_item(Some("f1"), RawItem::new("m1", ItemType::Movie));
        let template = ItemsQuery::default()
            .include_types(&[ItemType::Series, ItemType::Folder])
            .limit(50);

        let children = SourceChildren::new(&source, template);
        let listed = children.fetch_children("f1").await.unwrap();

        assert_eq!(ids(&listed), vec!["s1"]);
        let queries = source.queries();
        assert_eq!(queries[0].parent_id.as_deref(), Some("f1"));
        assert_eq!(queries[0].limit, Some(50));
    }
}
