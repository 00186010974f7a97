use axum::{Router, routing::get};

use crate::handlers::{addon, health_handler};
use crate::infra::app_state::AppState;

/// Addon protocol routes. `{cfg}` is the base64url install token.
pub fn create_addon_router() -> Router<AppState> {
    Router::new()
        .route("/manifest.json", get(addon::base_manifest_handler))
        .route("/{cfg}/manifest.json", get(addon::configured_manifest_handler))
        .route("/{cfg}/catalog/{kind}/{id}", get(addon::catalog_handler))
        .route(
            "/{cfg}/catalog/{kind}/{id}/{extra}",
            get(addon::catalog_with_extra_handler),
        )
        .route("/{cfg}/meta/{kind}/{id}", get(addon::meta_handler))
        .route("/{cfg}/stream/{kind}/{id}", get(addon::stream_handler))
        .route("/health", get(health_handler))
}
