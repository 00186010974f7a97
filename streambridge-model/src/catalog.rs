use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;
use crate::item::ItemType;

const MOVIE_LEAVES: &[ItemType] = &[ItemType::Movie];
const SERIES_LEAVES: &[ItemType] = &[ItemType::Series];

/// Catalog kinds exposed to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CatalogKind {
    Movie,
    Series,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 2] = [CatalogKind::Movie, CatalogKind::Series];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Movie => "movie",
            CatalogKind::Series => "series",
        }
    }

    /// Item types that count as playable leaves for this kind.
    pub fn leaf_types(&self) -> &'static [ItemType] {
        match self {
            CatalogKind::Movie => MOVIE_LEAVES,
            CatalogKind::Series => SERIES_LEAVES,
        }
    }

    pub fn accepts(&self, item_type: &ItemType) -> bool {
        self.leaf_types().contains(item_type)
    }

    /// Maps a library view's `CollectionType` to the catalog it feeds.
    pub fn from_collection_type(collection_type: &str) -> Option<Self> {
        match collection_type {
            "movies" => Some(CatalogKind::Movie),
            "tvshows" => Some(CatalogKind::Series),
            _ => None,
        }
    }
}

impl Display for CatalogKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(CatalogKind::Movie),
            "series" => Ok(CatalogKind::Series),
            other => Err(ModelError::UnknownCatalogKind(other.to_string())),
        }
    }
}

/// Display mode carried by a composite library id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CatalogMode {
    #[default]
    All,
    LastAdded,
    /// Unrecognized tokens are kept verbatim and treated like `All`
    /// wherever a mode-specific behavior would apply.
    Other(String),
}

impl CatalogMode {
    pub const LAST_ADDED_TOKEN: &'static str = "lastAdded";
    /// Retired token. Favorites filtering no longer exists.
    pub const FAVORITES_TOKEN: &'static str = "favorites";

    pub fn from_token(token: &str) -> Self {
        match token {
            "" | "all" | Self::FAVORITES_TOKEN => CatalogMode::All,
            Self::LAST_ADDED_TOKEN => CatalogMode::LastAdded,
            other => CatalogMode::Other(other.to_string()),
        }
    }

    /// Wire token; `None` for the default mode, which has no suffix.
    pub fn token(&self) -> Option<&str> {
        match self {
            CatalogMode::All => None,
            CatalogMode::LastAdded => Some(Self::LAST_ADDED_TOKEN),
            CatalogMode::Other(token) => Some(token),
        }
    }

    pub fn is_last_added(&self) -> bool {
        matches!(self, CatalogMode::LastAdded)
    }
}

impl Display for CatalogMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().unwrap_or("all"))
    }
}

/// Decoded composite library id (`<libraryId>::<mode>`).
///
/// `library_id` is `None` only when the raw id itself was absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryCatalogId {
    pub library_id: Option<String>,
    pub mode: CatalogMode,
}

impl LibraryCatalogId {
    pub const DELIMITER: &'static str = "::";

    pub fn new(library_id: impl Into<String>, mode: CatalogMode) -> Self {
        Self {
            library_id: Some(library_id.into()),
            mode,
        }
    }

    pub fn library_id(&self) -> &str {
        self.library_id.as_deref().unwrap_or_default()
    }
}

impl Display for LibraryCatalogId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.mode.token() {
            Some(token) => write!(f, "{}{}{}", self.library_id(), Self::DELIMITER, token),
            None => f.write_str(self.library_id()),
        }
    }
}

/// A library view that backs one or more catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDefinition {
    pub id: String,
    pub name: String,
    pub kind: CatalogKind,
}
