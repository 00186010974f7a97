use axum::{
    Json,
    extract::{Path, State},
};
use streambridge_core::manifest::{base_manifest, configured_manifest};
use streambridge_model::Manifest;
use tracing::{info, warn};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Manifest of the unconfigured addon
pub async fn base_manifest_handler() -> Json<Manifest> {
    Json(base_manifest())
}

/// Manifest of one install, listing that user's libraries as catalogs
pub async fn configured_manifest_handler(
    State(state): State<AppState>,
    Path(cfg): Path<String>,
) -> AppResult<Json<Manifest>> {
    let session = state.open_session(&cfg)?;

    let libraries = match session.library().library_definitions().await {
        Ok(libraries) => libraries,
        Err(err) => {
            warn!(
                error = %err,
                server = %session.addon.server_url,
                "failed to load library definitions"
            );
            Vec::new()
        }
    };
    info!(catalogs = libraries.len(), "serving configured manifest");

    Ok(Json(configured_manifest(
        &cfg,
        &session.addon.server_url,
        &libraries,
    )))
}
