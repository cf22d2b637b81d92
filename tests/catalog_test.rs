use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, http::StatusCode};
use guessthebeat::{
    api,
    catalog::{CatalogClient, CatalogProxy},
    error::ApiError,
    server::{self, ServerState},
    spotify::auth::{ClientCredentials, TokenRefresher},
};
use serde_json::json;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn deezer_hit() -> serde_json::Value {
    json!({
        "data": [
            {
                "id": 3135556,
                "title": "Harder, Better, Faster, Stronger",
                "artist": { "id": 27, "name": "Daft Punk" },
                "preview": "https://cdns-preview.dzcdn.net/stream/abc.mp3"
            }
        ],
        "total": 1
    })
}

fn params(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
    Query(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn proxy_reshapes_deezer_results() {
    let deezer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Harder Better - Daft Punk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deezer_hit()))
        .expect(1)
        .mount(&deezer)
        .await;

    let proxy = Arc::new(CatalogProxy::new(&deezer.uri()));
    let (status, body) = api::search(
        params(&[("songName", "Harder Better - Daft Punk")]),
        Extension(proxy),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.0,
        json!({
            "tracks": [{
                "id": "3135556",
                "title": "Harder, Better, Faster, Stronger",
                "artist": { "name": "Daft Punk" },
                "preview": "https://cdns-preview.dzcdn.net/stream/abc.mp3"
            }]
        })
    );
}

#[tokio::test]
async fn proxy_requires_song_name() {
    let deezer = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&deezer)
        .await;
    let proxy = Arc::new(CatalogProxy::new(&deezer.uri()));

    let (status, body) = api::search(params(&[]), Extension(proxy.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.0.get("error").is_some());

    let (status, _) = api::search(params(&[("songName", "   ")]), Extension(proxy)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn proxy_reports_upstream_failure() {
    let deezer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&deezer)
        .await;

    let proxy = Arc::new(CatalogProxy::new(&deezer.uri()));
    let (status, body) = api::search(params(&[("songName", "anything")]), Extension(proxy)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.0.get("error").is_some());
}

#[tokio::test]
async fn client_finds_first_preview() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("songName", "Around the World - Daft Punk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": [
                { "id": "1", "title": "Around the World", "artist": { "name": "Daft Punk" }, "preview": "" },
                { "id": "2", "title": "Around the World", "artist": { "name": "Daft Punk" }, "preview": "https://p/2.mp3" }
            ]
        })))
        .mount(&proxy)
        .await;

    let preview = CatalogClient::new(&proxy.uri())
        .find_preview("Around the World - Daft Punk")
        .await
        .expect("preview");
    assert_eq!(preview, "https://p/2.mp3");
}

#[tokio::test]
async fn client_reports_missing_preview() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tracks": [] })))
        .mount(&proxy)
        .await;

    let err = CatalogClient::new(&proxy.uri())
        .find_preview("Unknown - Nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UpstreamDataEmpty(ref m) if m.contains("Unknown - Nobody")));
}

#[tokio::test]
async fn client_surfaces_proxy_error() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "track search failed" })),
        )
        .mount(&proxy)
        .await;

    match CatalogClient::new(&proxy.uri()).search("x").await {
        Err(ApiError::Transient { message, .. }) => assert_eq!(message, "track search failed"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn served_router_answers_search_and_health() {
    let deezer = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deezer_hit()))
        .mount(&deezer)
        .await;

    let state = ServerState {
        pending: Arc::new(Mutex::new(None)),
        refresher: Arc::new(TokenRefresher::new(
            &deezer.uri(),
            ClientCredentials::new("id", "secret"),
        )),
        catalog: Arc::new(CatalogProxy::new(&deezer.uri())),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, server::router(state)).await.ok();
    });

    let base = format!("http://{}", addr);
    let preview = CatalogClient::new(&base)
        .find_preview("Harder Better - Daft Punk")
        .await
        .expect("preview through router");
    assert_eq!(preview, "https://cdns-preview.dzcdn.net/stream/abc.mp3");

    let health: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .expect("health")
        .json()
        .await
        .expect("json");
    assert_eq!(health["status"], "ok");

    let callback = reqwest::get(format!("{}/callback?code=abc", base))
        .await
        .expect("callback")
        .text()
        .await
        .expect("body");
    assert!(callback.contains("No login in progress"));

    let missing = reqwest::get(format!("{}/api/search", base))
        .await
        .expect("search without query");
    assert_eq!(missing.status(), reqwest::StatusCode::BAD_REQUEST);

    handle.abort();
}
