//! Addon protocol endpoints

pub mod handle_catalog;
pub mod handle_manifest;
pub mod handle_meta;
pub mod handle_stream;

pub use handle_catalog::{catalog_handler, catalog_with_extra_handler};
pub use handle_manifest::{base_manifest_handler, configured_manifest_handler};
pub use handle_meta::meta_handler;
pub use handle_stream::stream_handler;

/// Addon clients append `.json` to the last path segment.
pub(crate) fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}
