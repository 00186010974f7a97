use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::Uri,
};
use serde::Serialize;
use streambridge_core::{CatalogOptions, CatalogSort};
use streambridge_model::{CatalogKind, MetaPreview};
use tracing::{debug, warn};

use crate::handlers::addon::strip_json;
use crate::infra::app_state::AppState;

#[derive(Debug, Default, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

/// `/{cfg}/catalog/{type}/{id}.json`
pub async fn catalog_handler(
    State(state): State<AppState>,
    Path((cfg, kind, id)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<CatalogResponse> {
    let options = catalog_options(&query, None);
    Json(catalog(&state, &cfg, &kind, strip_json(&id), &options).await)
}

/// `/{cfg}/catalog/{type}/{id}/{extra}.json`, extras like `skip=20&search=x`
pub async fn catalog_with_extra_handler(
    State(state): State<AppState>,
    Path((cfg, kind, id, _extra)): Path<(String, String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
) -> Json<CatalogResponse> {
    // The raw segment keeps encoded `&` and `=` inside values intact.
    let extra = uri.path().rsplit('/').next().unwrap_or_default();
    let options = catalog_options(&query, Some(strip_json(extra)));
    Json(catalog(&state, &cfg, &kind, &id, &options).await)
}

async fn catalog(
    state: &AppState,
    cfg: &str,
    kind: &str,
    catalog_id: &str,
    options: &CatalogOptions,
) -> CatalogResponse {
    let Ok(kind) = kind.parse::<CatalogKind>() else {
        debug!(kind, "catalog request for unsupported type");
        return CatalogResponse::default();
    };
    let session = match state.open_session(cfg) {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "catalog request with unusable configuration");
            return CatalogResponse::default();
        }
    };

    match session
        .library()
        .library_metas(Some(catalog_id), kind, options)
        .await
    {
        Ok(metas) => {
            debug!(catalog = catalog_id, %kind, count = metas.len(), "catalog served");
            CatalogResponse { metas }
        }
        Err(err) => {
            warn!(error = %err, catalog = catalog_id, %kind, "failed to load catalog");
            CatalogResponse::default()
        }
    }
}

/// Query-string extras first, then path extras so the path wins.
pub fn catalog_options(
    query: &HashMap<String, String>,
    path_extra: Option<&str>,
) -> CatalogOptions {
    let mut options = CatalogOptions::default();
    for (key, value) in query {
        apply_extra(&mut options, key, value);
    }
    if let Some(extra) = path_extra {
        for (key, value) in url::form_urlencoded::parse(extra.as_bytes()) {
            apply_extra(&mut options, &key, &value);
        }
    }
    options
}

fn apply_extra(options: &mut CatalogOptions, key: &str, value: &str) {
    match key {
        "skip" => {
            if let Ok(skip) = value.trim().parse() {
                options.skip = Some(skip);
            }
        }
        "limit" => {
            if let Some(limit) = value.trim().parse::<u32>().ok().filter(|limit| *limit > 0) {
                options.limit = Some(limit);
            }
        }
        "search" if !value.trim().is_empty() => options.search = Some(value.to_string()),
        "sort" => {
            if let Some(sort) = CatalogSort::parse(value) {
                options.sort = Some(sort);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_extras_override_query_extras() {
        let query = HashMap::from([
            ("skip".to_string(), "40".to_string()),
            ("search".to_string(), "alien".to_string()),
            ("sort".to_string(), "name".to_string()),
        ]);
        let options = catalog_options(&query, Some("skip=20&search=the%20expanse&genre=Drama"));

        assert_eq!(options.skip, Some(20));
        assert_eq!(options.search.as_deref(), Some("the expanse"));
        assert_eq!(options.sort, Some(CatalogSort::Name));
        assert_eq!(options.limit, None);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let options = catalog_options(
            &HashMap::new(),
            Some("skip=-5&limit=ten&sort=random&search=%20"),
        );
        assert_eq!(options.skip, None);
        assert_eq!(options.limit, None);
        assert_eq!(options.sort, None);
        assert_eq!(options.search, None);
    }

    #[test]
    fn zero_limit_is_ignored() {
        let query = HashMap::from([("limit".to_string(), "25".to_string())]);
        let options = catalog_options(&query, Some("limit=0"));
        assert_eq!(options.limit, Some(25));

        let options = catalog_options(&HashMap::new(), Some("limit=0"));
        assert_eq!(options.limit, None);
    }

    #[test]
    fn encoded_separators_stay_in_values() {
        let options = catalog_options(&HashMap::new(), Some("search=tom%26jerry&sort=lastAdded"));
        assert_eq!(options.search.as_deref(), Some("tom&jerry"));
        assert_eq!(options.sort, Some(CatalogSort::LastAdded));
    }
}
