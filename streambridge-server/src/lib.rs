//! # StreamBridge Server
//!
//! Serves an Emby user's libraries over the Stremio addon protocol:
//! a manifest per install, one catalog per library (plus a recently-added
//! variant), meta records with episode lists for series, and direct-play
//! streams for library items and IMDb/TMDB ids.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Full application router. CORS is open to any origin since addon clients
/// run on arbitrary web origins.
pub fn create_app(state: AppState) -> Router {
    routes::create_addon_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
