use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use libmysound_catalog::credentials::{MemoryTokenStore, TokenManager};
use libmysound_catalog::{CatalogClient, CatalogError, CatalogSettings, HttpCatalogClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::TcpListener;

#[ctor::ctor]
fn init() {
    tracing_subscriber::fmt()
        .pretty()
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_test_writer()
        .init();
}

#[derive(Clone, Default)]
struct Backend {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

impl Backend {
    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_owned());
        self.auth_headers.lock().unwrap().push(value);
    }

    fn seen(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }
}

async fn recommendations(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    backend.record(&headers);
    if id == "500" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if id == "garbage" {
        return "not json".into_response();
    }
    axum::Json(json!([
        { "id": 20, "title": "Next", "imageUrl": "/images/next.jpg",
          "artists": [{ "id": 1, "name": "Someone" }] },
        { "id": 21, "title": "After", "artists": [] }
    ]))
    .into_response()
}

async fn playlist(
    State(backend): State<Backend>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    backend.record(&headers);
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    axum::Json(json!({
        "id": id,
        "name": "Road trip",
        "songs": [{ "id": 1, "title": "One" }, { "id": 2, "title": "Two" }]
    }))
    .into_response()
}

async fn playlists(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(&headers);
    axum::Json(json!([{ "id": 1, "name": "A" }, { "id": 2, "name": "B" }])).into_response()
}

async fn search(
    State(backend): State<Backend>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    backend.record(&headers);
    let query = params.get("query").cloned().unwrap_or_default();
    axum::Json(json!([{ "id": 5, "title": query }])).into_response()
}

async fn start_backend() -> (Backend, String) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/songs/recommendations/{id}", get(recommendations))
        .route("/api/songs/search", get(search))
        .route("/api/playlists", get(playlists))
        .route("/api/playlists/{id}", get(playlist))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (backend, format!("http://{addr}/"))
}

fn client(base_url: &str, token: Option<&str>) -> HttpCatalogClient {
    let manager = TokenManager::new(MemoryTokenStore::new_boxed());
    if let Some(token) = token {
        manager.save_token(token, false).unwrap();
    }
    let settings = CatalogSettings {
        base_url: base_url.to_owned(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
        max_retries: 0,
    };
    HttpCatalogClient::new(settings, Arc::new(manager)).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_recommendations_with_token() {
    let (backend, base_url) = start_backend().await;
    let client = client(&base_url, Some("secret"));

    let recommendations = client.get_recommendations("10").await;

    assert_eq!(
        vec!["20", "21"],
        recommendations
            .iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>()
    );
    assert_eq!(vec![Some("Bearer secret".to_owned())], backend.seen());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_request_without_token_has_no_auth_header() {
    let (backend, base_url) = start_backend().await;
    let client = client(&base_url, None);

    let playlists = client.get_playlists().await.unwrap();

    assert_eq!(2, playlists.len());
    assert_eq!(vec![None], backend.seen());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_recommendations_failures_are_empty() {
    let (_, base_url) = start_backend().await;
    let client = client(&base_url, None);

    assert!(client.get_recommendations("500").await.is_empty());
    assert!(client.get_recommendations("garbage").await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_recommendations_unreachable_backend_is_empty() {
    // Nothing listens on the discard port
    let client = client("http://127.0.0.1:9", None);
    assert!(client.get_recommendations("1").await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_get_playlist() {
    let (_, base_url) = start_backend().await;
    let client = client(&base_url, None);

    let playlist = client.get_playlist("7").await.unwrap();

    assert_eq!(Some(7), playlist.id);
    assert_eq!(
        vec!["1", "2"],
        playlist
            .songs
            .iter()
            .map(|s| s.id.as_str())
            .collect::<Vec<_>>()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_get_playlist_errors() {
    let (backend, base_url) = start_backend().await;
    let client = client(&base_url, None);

    assert_matches!(
        client.get_playlist("404").await,
        Err(CatalogError::Status { status: 404, .. })
    );
    assert_matches!(
        client.get_playlist("abc").await,
        Err(CatalogError::InvalidPlaylistIdentifier(id)) if id == "abc"
    );
    // The invalid id never reached the backend
    assert_eq!(1, backend.seen().len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_search_encodes_query() {
    let (_, base_url) = start_backend().await;
    let client = client(&base_url, None);

    let results = client.search_songs("drum & bass").await.unwrap();

    assert_eq!(1, results.len());
    assert_eq!("drum & bass", results[0].title);
}

#[tokio::test]
async fn test_stream_url_uses_base_url() {
    let client = client("http://host:8080/", None);
    assert_eq!(
        "http://host:8080/api/stream/12",
        client.stream_url("12").unwrap()
    );
}
