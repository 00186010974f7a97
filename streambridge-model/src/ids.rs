//! External identifiers handed to the front end.
//!
//! Every item the bridge exposes is addressed as `emby~<kind>~<serverId>`.
//! The prefix doubles as the manifest `idPrefixes` entry so the front end
//! routes meta requests for these ids back to us.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;
use crate::item::ItemType;

pub const ID_PREFIX: &str = "emby~";
const SEPARATOR: char = '~';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Movie,
    Series,
    Episode,
    Folder,
    Video,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Movie => "movie",
            IdKind::Series => "series",
            IdKind::Episode => "episode",
            IdKind::Folder => "folder",
            IdKind::Video => "video",
        }
    }

    pub fn for_item_type(item_type: &ItemType) -> Self {
        match item_type {
            ItemType::Series => IdKind::Series,
            ItemType::Movie => IdKind::Movie,
            ItemType::Episode => IdKind::Episode,
            ItemType::Folder
            | ItemType::CollectionFolder
            | ItemType::UserView
            | ItemType::BoxSet
            | ItemType::Season => IdKind::Folder,
            ItemType::Video | ItemType::Other(_) | ItemType::Unknown => IdKind::Video,
        }
    }
}

impl Display for IdKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(IdKind::Movie),
            "series" => Ok(IdKind::Series),
            "episode" => Ok(IdKind::Episode),
            "folder" => Ok(IdKind::Folder),
            "video" => Ok(IdKind::Video),
            other => Err(ModelError::UnknownIdKind(other.to_string())),
        }
    }
}

/// Parsed form of an `emby~<kind>~<serverId>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalId {
    pub kind: IdKind,
    pub server_id: String,
}

impl ExternalId {
    pub fn new(kind: IdKind, server_id: impl Into<String>) -> Option<Self> {
        let server_id = server_id.into();
        if server_id.trim().is_empty() || server_id.contains(SEPARATOR) {
            return None;
        }
        Some(Self { kind, server_id })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(ID_PREFIX)?;
        let (kind, server_id) = rest.split_once(SEPARATOR)?;
        Self::new(kind.parse().ok()?, server_id)
    }
}

impl Display for ExternalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{ID_PREFIX}{}{SEPARATOR}{}", self.kind, self.server_id)
    }
}

/// Build the external id for a server item, or `None` when the server id
/// cannot be encoded unambiguously.
pub fn build_external_id(kind: IdKind, raw_id: &str) -> Option<String> {
    ExternalId::new(kind, raw_id).map(|id| id.to_string())
}

pub fn parse_external_id(id: &str) -> Option<ExternalId> {
    ExternalId::parse(id)
}
