use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Value, json};
use streambridge_config::Config;
use streambridge_core::source::{InMemoryConnector, InMemorySource};
use streambridge_model::{ItemType, MediaSource, MediaStream, RawItem};
use streambridge_server::{AppState, create_app};

fn token() -> String {
    URL_SAFE_NO_PAD.encode(
        json!({
            "serverUrl": "http://emby.local:8096/",
            "userId": "u1",
            "accessToken": "secret",
        })
        .to_string(),
    )
}

fn view(id: &str, name: &str, collection_type: &str) -> RawItem {
    let mut view = RawItem::new(id, ItemType::CollectionFolder).with_name(name);
    view.collection_type = Some(collection_type.to_string());
    view
}

/// Shows: Andor (native episodes) and an Anime folder holding Bleach, whose
/// episodes only exist as loose descendants. Films: two movies.
fn library() -> InMemorySource {
    let mut source = InMemorySource::new();
    source.add_view(view("tv", "Shows", "tvshows"));
    source.add_view(view("mov", "Films", "movies"));
    source.add_view(view("music", "Music", "music"));

    source.add_item(
        Some("tv"),
        RawItem::new("s1", ItemType::Series)
            .with_name("Andor")
            .with_provider_id("Imdb", "tt9253284"),
    );
    source.add_item(Some("tv"), RawItem::new("f1", ItemType::Folder).with_name("Anime"));
    source.add_item(Some("f1"), RawItem::new("s2", ItemType::Series).with_name("Bleach"));
    source.set_episodes(
        "s1",
        vec![
            RawItem::new("e11", ItemType::Episode)
                .with_name("Aldhani")
                .with_numbers(Some(1), Some(2)),
            RawItem::new("e10", ItemType::Episode)
                .with_name("Kassa")
                .with_numbers(Some(1), Some(1)),
        ],
    );

    source.add_item(Some("s2"), RawItem::new("sea1", ItemType::Season).with_name("Season 1"));
    source.add_item(
        Some("sea1"),
        RawItem::new("e1", ItemType::Episode)
            .with_name("The Day I Became a Shinigami")
            .with_numbers(Some(1), Some(1)),
    );
    source.add_item(Some("sea1"), RawItem::new("v1", ItemType::Video));

    source.add_item(
        Some("mov"),
        RawItem::new("m1", ItemType::Movie)
            .with_name("Blade Runner")
            .with_provider_id("Imdb", "tt0083658")
            .with_provider_id("Tmdb", "78"),
    );
    source.add_item(Some("mov"), RawItem::new("m2", ItemType::Movie).with_name("Alien"));

    source.set_media_sources(
        "m1",
        vec![
            MediaSource::new("m1-src", "mkv").with_stream(MediaStream::video("h264", 1920, 1080)),
            MediaSource::new("m1-web", "mp4"),
        ],
    );
    let uhd = MediaStream::video("hevc", 3840, 2160);
    source.set_media_sources("e11", vec![MediaSource::new("e11-src", "mkv").with_stream(uhd)]);
    source.set_media_sources("v1", vec![MediaSource::new("v1-src", "mkv")]);
    source
}

fn server() -> (TestServer, Arc<InMemoryConnector>) {
    let connector = Arc::new(InMemoryConnector::new(library()));
    let state = AppState::new(Config::default(), connector.clone());
    (TestServer::new(create_app(state)).unwrap(), connector)
}

fn meta_ids(body: &Value) -> Vec<&str> {
    body["metas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|meta| meta["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let (server, _) = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn base_manifest_requires_configuration() {
    let (server, _) = server();
    let body: Value = server.get("/manifest.json").await.json();

    assert_eq!(body["id"], "org.streambridge.embyresolver");
    assert_eq!(body["behaviorHints"]["configurationRequired"], true);
    assert_eq!(body["catalogs"], json!([]));
    assert_eq!(body["resources"][0]["name"], "stream");
    assert_eq!(
        body["resources"][0]["idPrefixes"],
        json!(["tt", "imdb:", "tmdb:", "emby~"])
    );
    assert_eq!(body["resources"][1]["name"], "meta");
}

#[tokio::test]
async fn configured_manifest_lists_two_catalogs_per_library() {
    let (server, connector) = server();
    let cfg = token();
    let body: Value = server.get(&format!("/{cfg}/manifest.json")).await.json();

    assert_eq!(
        body["id"],
        format!("org.streambridge.embyresolver.{}", &cfg[..8])
    );
    assert!(body["name"].as_str().unwrap().ends_with("(emby.local:8096)"));
    assert_eq!(body["behaviorHints"]["configurationRequired"], false);

    let catalogs: Vec<(&str, &str)> = body["catalogs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| (c["type"].as_str().unwrap(), c["id"].as_str().unwrap()))
        .collect();
    assert_eq!(
        catalogs,
        vec![
            ("series", "tv"),
            ("series", "tv::lastAdded"),
            ("movie", "mov"),
            ("movie", "mov::lastAdded"),
        ]
    );

    let connections = connector.connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].server_url, "http://emby.local:8096");
    assert_eq!(connections[0].user_id, "u1");
}

#[tokio::test]
async fn configured_manifest_rejects_bad_configuration() {
    let (server, _) = server();
    let missing_token = URL_SAFE_NO_PAD.encode(r#"{"serverUrl":"http://emby","userId":"u1"}"#);

    for cfg in ["not-base64!", missing_token.as_str()] {
        let response = server
            .get(&format!("/{cfg}/manifest.json"))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], 400);
    }
}

#[tokio::test]
async fn series_catalog_walks_folders() {
    let (server, connector) = server();
    let body: Value = server
        .get(&format!("/{}/catalog/series/tv.json", token()))
        .await
        .json();

    assert_eq!(meta_ids(&body), vec!["emby~series~s1", "emby~series~s2"]);

    let root = &connector.source().queries()[0];
    assert_eq!(root.parent_id.as_deref(), Some("tv"));
    assert!(!root.is_recursive());
    assert_eq!(root.user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn last_added_catalog_queries_recursively() {
    let (server, connector) = server();
    let body: Value = server
        .get(&format!("/{}/catalog/series/tv::lastAdded.json", token()))
        .await
        .json();

    let mut ids = meta_ids(&body);
    ids.sort_unstable();
    assert_eq!(ids, vec!["emby~series~s1", "emby~series~s2"]);

    let queries = connector.source().queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].is_recursive());
    assert_eq!(queries[0].sort_by, vec!["DateCreated".to_string()]);
}

#[tokio::test]
async fn movie_catalog_sorts_by_name_and_honors_path_extras() {
    let (server, _) = server();
    let cfg = token();

    let body: Value = server
        .get(&format!("/{cfg}/catalog/movie/mov.json"))
        .await
        .json();
    assert_eq!(meta_ids(&body), vec!["emby~movie~m2", "emby~movie~m1"]);
    assert_eq!(body["metas"][0]["name"], "Alien");

    let body: Value = server
        .get(&format!("/{cfg}/catalog/movie/mov/search=blade.json"))
        .await
        .json();
    assert_eq!(meta_ids(&body), vec!["emby~movie~m1"]);

    let body: Value = server
        .get(&format!("/{cfg}/catalog/movie/mov/skip=1.json"))
        .add_query_param("skip", "0")
        .await
        .json();
    assert_eq!(meta_ids(&body), vec!["emby~movie~m1"]);
}

#[tokio::test]
async fn catalog_degrades_to_empty_list() {
    let (server, _) = server();
    let cfg = token();

    for path in [
        format!("/{cfg}/catalog/tv/tv.json"),
        "/garbage/catalog/movie/mov.json".to_string(),
        format!("/{cfg}/catalog/movie/.json"),
    ] {
        let response = server.get(&path).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "metas": [] }));
    }
}

#[tokio::test]
async fn series_meta_uses_native_episodes_in_order() {
    let (server, _) = server();
    let body: Value = server
        .get(&format!("/{}/meta/series/emby~series~s1.json", token()))
        .await
        .json();

    let meta = &body["meta"];
    assert_eq!(meta["id"], "emby~series~s1");
    assert_eq!(meta["name"], "Andor");
    let videos: Vec<&str> = meta["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(videos, vec!["emby~episode~e10", "emby~episode~e11"]);
}

#[tokio::test]
async fn series_meta_synthesizes_episodes_for_loose_folders() {
    let (server, _) = server();
    let body: Value = server
        .get(&format!("/{}/meta/series/emby~series~s2.json", token()))
        .await
        .json();

    let videos = body["meta"]["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["id"], "emby~episode~e1");
    assert_eq!(videos[0]["episode"], 1);
    assert_eq!(videos[1]["id"], "emby~episode~v1");
    assert_eq!(videos[1]["season"], 1);
    assert_eq!(videos[1]["episode"], 2);
    assert_eq!(videos[1]["title"], "Episode 2");
}

#[tokio::test]
async fn meta_is_null_for_foreign_or_unknown_ids() {
    let (server, _) = server();
    let cfg = token();

    for path in [
        format!("/{cfg}/meta/movie/tt0000001.json"),
        format!("/{cfg}/meta/movie/tvdb:81189.json"),
        format!("/{cfg}/meta/movie/emby~movie~missing.json"),
        format!("/{cfg}/meta/channel/emby~movie~m1.json"),
        "/garbage/meta/movie/emby~movie~m1.json".to_string(),
    ] {
        let response = server.get(&path).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "meta": null }));
    }
}

#[tokio::test]
async fn meta_resolves_provider_ids() {
    let (server, _) = server();
    let cfg = token();

    let body: Value = server
        .get(&format!("/{cfg}/meta/movie/tmdb:78.json"))
        .await
        .json();
    assert_eq!(body["meta"]["id"], "tmdb:78");
    assert_eq!(body["meta"]["name"], "Blade Runner");

    let body: Value = server
        .get(&format!("/{cfg}/meta/series/tt9253284.json"))
        .await
        .json();
    assert_eq!(body["meta"]["name"], "Andor");
    assert_eq!(body["meta"]["videos"][0]["id"], "emby~episode~e10");
}

#[tokio::test]
async fn movie_stream_by_imdb_id() {
    let (server, connector) = server();
    let body: Value = server
        .get(&format!("/{}/stream/movie/tt0083658.json", token()))
        .await
        .json();

    let streams = body["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0]["name"], "Emby");
    assert_eq!(streams[0]["title"], "1080p H264");
    assert_eq!(
        streams[0]["url"],
        "http://emby.local:8096/Videos/m1/stream.mkv\
         ?MediaSourceId=m1-src&Static=true&api_key=secret&DeviceId=stremio-addon-device-id"
    );
    assert_eq!(
        streams[0]["behaviorHints"],
        json!({ "bingeGroup": "Emby-1080p H264", "notWebReady": true })
    );

    let lookup = &connector.source().queries()[0];
    assert_eq!(lookup.any_provider_id_equals.as_deref(), Some("imdb.tt0083658"));
}

#[tokio::test]
async fn episode_streams_by_provider_or_emby_id() {
    let (server, _) = server();
    let cfg = token();

    let body: Value = server
        .get(&format!("/{cfg}/stream/series/tt9253284:1:2.json"))
        .await
        .json();
    assert_eq!(body["streams"][0]["title"], "2160p HEVC");
    assert!(
        body["streams"][0]["url"]
            .as_str()
            .unwrap()
            .contains("/Videos/e11/stream.mkv")
    );

    let body: Value = server
        .get(&format!("/{cfg}/stream/series/emby~episode~v1.json"))
        .await
        .json();
    assert_eq!(body["streams"][0]["title"], "MKV");
}

#[tokio::test]
async fn streams_degrade_to_empty_list() {
    let (server, _) = server();
    let cfg = token();

    for path in [
        format!("/{cfg}/stream/movie/tt0000001.json"),
        format!("/{cfg}/stream/series/tt9253284:9:9.json"),
        format!("/{cfg}/stream/series/emby~series~s1.json"),
        format!("/{cfg}/stream/movie/emby~movie~m2.json"),
        format!("/{cfg}/stream/tv/tt0083658.json"),
        "/garbage/stream/movie/tt0083658.json".to_string(),
    ] {
        let response = server.get(&path).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "streams": [] }));
    }
}
