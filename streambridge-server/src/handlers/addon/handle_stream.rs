use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use streambridge_model::{CatalogKind, Stream};
use tracing::{debug, warn};

use crate::handlers::addon::strip_json;
use crate::infra::app_state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct StreamResponse {
    pub streams: Vec<Stream>,
}

/// `/{cfg}/stream/{type}/{id}.json`; every failure is `{"streams": []}`
pub async fn stream_handler(
    State(state): State<AppState>,
    Path((cfg, kind, id)): Path<(String, String, String)>,
) -> Json<StreamResponse> {
    let id = strip_json(&id);
    if kind.parse::<CatalogKind>().is_err() {
        debug!(kind = %kind, id, "stream request for unsupported type");
        return Json(StreamResponse::default());
    }
    let session = match state.open_session(&cfg) {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "stream request with unusable configuration");
            return Json(StreamResponse::default());
        }
    };

    match session.streams().streams(id).await {
        Ok(streams) => Json(StreamResponse { streams }),
        Err(err) => {
            warn!(error = %err, id, kind = %kind, "failed to resolve streams");
            Json(StreamResponse::default())
        }
    }
}
