use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use streambridge_model::{CatalogKind, MetaDetail};
use tracing::{debug, warn};

use crate::handlers::addon::strip_json;
use crate::infra::app_state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct MetaResponse {
    pub meta: Option<MetaDetail>,
}

/// `/{cfg}/meta/{type}/{id}.json`; anything unresolvable is `{"meta": null}`
pub async fn meta_handler(
    State(state): State<AppState>,
    Path((cfg, kind, id)): Path<(String, String, String)>,
) -> Json<MetaResponse> {
    let id = strip_json(&id);
    let Ok(kind) = kind.parse::<CatalogKind>() else {
        debug!(kind = %kind, id, "meta request for unsupported type");
        return Json(MetaResponse::default());
    };
    let session = match state.open_session(&cfg) {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "meta request with unusable configuration");
            return Json(MetaResponse::default());
        }
    };

    match session.meta().meta(kind, id).await {
        Ok(meta) => Json(MetaResponse { meta }),
        Err(err) => {
            warn!(error = %err, id, %kind, "failed to load meta");
            Json(MetaResponse::default())
        }
    }
}
