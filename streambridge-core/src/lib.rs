//! StreamBridge core: turns an Emby library into front-end catalogs.
//!
//! The interesting parts live in [`catalog`]: the breadth-first folder
//! expander, the fallback episode synthesizer and the composite catalog-id
//! codec. Around them sit the media-server client ([`source`]), image URL
//! construction, meta mapping, provider-id lookup, and the library, meta and
//! stream services the HTTP layer calls into.

pub mod catalog;
pub mod error;
pub mod images;
pub mod library;
pub mod manifest;
pub mod mapper;
pub mod meta;
pub mod provider;
pub mod source;
pub mod streams;

pub use error::{BridgeError, Result};
pub use images::ImageUrls;
pub use library::{CatalogOptions, CatalogSort, DEFAULT_CATALOG_LIMIT, LibraryService};
pub use mapper::MetaMapper;
pub use meta::MetaService;
pub use provider::ProviderResolver;
pub use source::{
    ClientSettings, EmbyConnector, ItemSource, ItemsQuery, SourceConnector, SourceCredentials,
};
pub use streams::{StreamLinks, StreamService};
