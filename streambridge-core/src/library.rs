//! Catalog composition: which catalogs a user has, and what is in them.

use streambridge_model::{
    CatalogKind, CatalogMode, ItemType, LibraryCatalogId, LibraryDefinition, MetaPreview,
};
use tracing::debug;

use crate::catalog::{SourceChildren, codec, expand};
use crate::error::Result;
use crate::mapper::MetaMapper;
use crate::source::{ItemSource, ItemsQuery, SortOrder};

pub const DEFAULT_CATALOG_LIMIT: u32 = 100;

const LIBRARY_FIELDS: &[&str] = &[
    "ProviderIds",
    "Name",
    "Overview",
    "ProductionYear",
    "ImageTags",
    "BackdropImageTags",
    "PremiereDate",
];
const LIBRARY_IMAGES: &[&str] = &["Primary", "Backdrop"];
const LAST_ADDED_SUFFIX: &str = "(Last Added)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
    Name,
    LastAdded,
}

impl CatalogSort {
    /// Unknown sort names are ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(CatalogSort::Name),
            "lastAdded" => Some(CatalogSort::LastAdded),
            _ => None,
        }
    }
}

/// Paging and filtering extras of a catalog request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<CatalogSort>,
}

impl CatalogOptions {
    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

pub struct LibraryService<'a> {
    source: &'a dyn ItemSource,
    mapper: &'a MetaMapper,
    user_id: Option<String>,
    default_limit: u32,
}

impl std::fmt::Debug for LibraryService<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryService")
            .field("user_id", &self.user_id)
            .field("default_limit", &self.default_limit)
            .finish_non_exhaustive()
    }
}

impl<'a> LibraryService<'a> {
    pub fn new(source: &'a dyn ItemSource, mapper: &'a MetaMapper) -> Self {
        Self {
            source,
            mapper,
            user_id: None,
            default_limit: DEFAULT_CATALOG_LIMIT,
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Two catalogs per movie or TV view: everything, and recently added.
    pub async fn library_definitions(&self) -> Result<Vec<LibraryDefinition>> {
        let views = self.source.fetch_views().await?.into_items();
        let mut definitions = Vec::with_capacity(views.len() * 2);

        for view in views {
            let Some(kind) = view
                .collection_type
                .as_deref()
                .and_then(CatalogKind::from_collection_type)
            else {
                continue;
            };
            if view.id.is_empty() {
                continue;
            }
            let name = view.name.clone().unwrap_or_else(|| view.id.clone());
            let recent = LibraryCatalogId::new(view.id.clone(), CatalogMode::LastAdded);

            definitions.push(LibraryDefinition {
                id: view.id,
                name: name.clone(),
                kind,
            });
            definitions.push(LibraryDefinition {
                id: recent.to_string(),
                name: format!("{name} {LAST_ADDED_SUFFIX}"),
                kind,
            });
        }

        debug!(catalogs = definitions.len(), "library definitions resolved");
        Ok(definitions)
    }

    /// Items of one library catalog, flattened and mapped.
    pub async fn library_metas(
        &self,
        composite_id: Option<&str>,
        kind: CatalogKind,
        options: &CatalogOptions,
    ) -> Result<Vec<MetaPreview>> {
        let catalog_id = codec::decode(composite_id);
        let library_id = catalog_id.library_id();
        if library_id.is_empty() {
            debug!("catalog request without library id");
            return Ok(Vec::new());
        }

        let search = options.search_term();
        let sort = options
            .sort
            .or(catalog_id.mode.is_last_added().then_some(CatalogSort::LastAdded));
        let walk_folders =
            kind == CatalogKind::Series && search.is_none() && sort != Some(CatalogSort::LastAdded);

        let mut query = self
            .listing_query()
            .limit(options.limit.unwrap_or(self.default_limit));
        query.parent_id = Some(library_id.to_string());
        if let Some(skip) = options.skip {
            query = query.start_index(skip);
        }
        if let Some(term) = search {
            query = query.search(term);
        }
        query = match sort {
            Some(CatalogSort::LastAdded) => query.sort(&["DateCreated"], SortOrder::Descending),
            Some(CatalogSort::Name) => query.sort(&["SortName"], SortOrder::Ascending),
            None if search.is_none() => query.sort(&["SortName"], SortOrder::Ascending),
            None => query,
        };
        query = if walk_folders {
            query
                .include_types(&[ItemType::Series, ItemType::Folder])
                .recursive(false)
        } else {
            query.include_types(kind.leaf_types()).recursive(true)
        };

        let roots = self.source.fetch_items(&query).await?.into_items();
        debug!(
            library = %library_id,
            mode = %catalog_id.mode,
            roots = roots.len(),
            walk_folders,
            "library listing fetched"
        );

        let mut child_types = kind.leaf_types().to_vec();
        child_types.push(ItemType::Folder);
        let children = SourceChildren::new(
            self.source,
            self.listing_query()
                .include_types(&child_types)
                .limit(self.default_limit),
        );
        let expanded = expand(roots, kind, &children).await?;

        Ok(expanded
            .iter()
            .filter_map(|item| self.mapper.to_preview(item, kind))
            .collect())
    }

    fn listing_query(&self) -> ItemsQuery {
        let query = ItemsQuery::default()
            .fields(LIBRARY_FIELDS)
            .images(2, LIBRARY_IMAGES);
        match &self.user_id {
            Some(user_id) => query.user(user_id.clone()),
            None => query,
        }
    }
}
