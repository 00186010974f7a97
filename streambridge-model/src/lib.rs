//! Core data model definitions shared across StreamBridge crates.
//!
//! Two vocabularies live here side by side: the raw item payloads served by
//! the media server (PascalCase JSON) and the flattened catalog/meta records
//! handed to the streaming front end (camelCase JSON). serde support is
//! opt-in through the `serde` feature.

pub mod catalog;
pub mod error;
pub mod ids;
pub mod item;
#[cfg(feature = "serde")]
pub mod lenient;
pub mod manifest;
pub mod meta;
pub mod playback;
pub mod provider;
pub mod stream;

pub use catalog::{CatalogKind, CatalogMode, LibraryCatalogId, LibraryDefinition};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ExternalId, ID_PREFIX, IdKind, build_external_id, parse_external_id};
pub use item::{ItemType, ItemsPage, RawItem};
pub use manifest::{
    BehaviorHints, CatalogDefinition, CatalogExtra, ConfigField, Manifest,
    ManifestResource,
};
pub use meta::{MetaDetail, MetaPreview, SeriesVideo};
pub use playback::{MediaSource, MediaStream, PlaybackInfo};
pub use provider::{EpisodeNumber, PROVIDER_ID_PREFIXES, ProviderId, ProviderRef};
pub use stream::{Stream, StreamHints, Subtitle};
