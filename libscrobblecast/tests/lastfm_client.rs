//! Integration tests for the Last.fm client
//!
//! Runs LastfmClient against a local axum server standing in for
//! ws.audioscrobbler.com and checks the requests it sends.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Form, Json, Router};
use chrono::NaiveDate;
use libscrobblecast::error::ScrobbleError;
use libscrobblecast::period::previous_month;
use libscrobblecast::scrobbles::lastfm::{sign, LastfmClient};
use libscrobblecast::scrobbles::ScrobbleSource;
use libscrobblecast::{ScrobblecastError, Tag};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

const API_KEY: &str = "test-key";
const API_SECRET: &str = "test-secret";
const PASSWORD: &str = "hunter2";

type Params = HashMap<String, String>;

#[derive(Clone)]
struct StubState {
    top_albums: Value,
    requests: Arc<Mutex<Vec<(&'static str, Params)>>>,
}

impl StubState {
    fn new(top_albums: Value) -> Self {
        Self {
            top_albums,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self, method: &str) -> Vec<(&'static str, Params)> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, params)| params.get("method").map(String::as_str) == Some(method))
            .cloned()
            .collect()
    }
}

async fn handle_get(
    State(state): State<StubState>,
    Query(params): Query<Params>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(("GET", params.clone()));

    match params.get("method").map(String::as_str) {
        Some("user.getTopAlbums") => (StatusCode::OK, Json(state.top_albums.clone())),
        Some("album.getTopTags") => (
            StatusCode::OK,
            Json(json!({"toptags": {"tag": [
                {"count": 100, "name": "pop"},
                {"count": 90, "name": "Alt Rock"},
                {"count": 80, "name": "indie"}
            ]}})),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": 3, "message": "Invalid Method"})),
        ),
    }
}

async fn handle_post(
    State(state): State<StubState>,
    Form(params): Form<Params>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(("POST", params.clone()));

    let signed: BTreeMap<&str, String> = params
        .iter()
        .filter(|(key, _)| key.as_str() != "api_sig")
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    if params.get("api_sig") != Some(&sign(&signed, API_SECRET)) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": 13, "message": "Invalid method signature supplied"})),
        );
    }

    if params.get("password").map(String::as_str) != Some(PASSWORD) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": 4, "message": "Authentication Failed"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({"session": {"subscriber": 0, "name": "CanonicalUser", "key": "sk-1"}})),
    )
}

async fn start_stub(state: StubState) -> String {
    let app = Router::new()
        .route("/2.0/", get(handle_get).post(handle_post))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/2.0/", addr)
}

fn client(api_root: &str, secret: &str, password: &str) -> LastfmClient {
    LastfmClient::new(
        API_KEY.to_string(),
        SecretString::from(secret.to_string()),
        "user".to_string(),
        SecretString::from(password.to_string()),
    )
    .with_api_root(api_root)
}

fn one_album() -> Value {
    json!({"topalbums": {"album": [{
        "name": "X",
        "url": "http://u",
        "playcount": "10",
        "artist": {"name": "Y", "url": "http://a"},
        "@attr": {"rank": "1"}
    }]}})
}

#[tokio::test]
async fn test_authenticate_and_fetch_top_album() {
    let state = StubState::new(one_album());
    let api_root = start_stub(state.clone()).await;
    let mut client = client(&api_root, API_SECRET, PASSWORD);

    client.authenticate().await.unwrap();
    let month = previous_month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    let album = client.top_album(&month).await.unwrap().unwrap();

    assert_eq!(album.title, "X");
    assert_eq!(album.artist, "Y");
    assert_eq!(album.url, "http://u");
    assert_eq!(album.playcount, 10);
    assert_eq!(
        album.tags,
        vec![Tag::new("pop"), Tag::new("Alt Rock"), Tag::new("indie")]
    );

    let sessions = state.requests("auth.getMobileSession");
    assert_eq!(sessions.len(), 1);
    let (verb, params) = &sessions[0];
    assert_eq!(*verb, "POST");
    assert_eq!(params["username"], "user");
    assert_eq!(params["api_key"], API_KEY);
    assert_eq!(params["format"], "json");

    let top = state.requests("user.getTopAlbums");
    assert_eq!(top.len(), 1);
    let (verb, params) = &top[0];
    assert_eq!(*verb, "GET");
    assert_eq!(params["user"], "CanonicalUser");
    assert_eq!(params["period"], "1month");
    assert_eq!(params["limit"], "1");
    assert!(!params.contains_key("password"));

    let tags = state.requests("album.getTopTags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].1["artist"], "Y");
    assert_eq!(tags[0].1["album"], "X");
}

#[tokio::test]
async fn test_empty_month_skips_tag_lookup() {
    let state = StubState::new(json!({"topalbums": {"album": [], "@attr": {"total": "0"}}}));
    let api_root = start_stub(state.clone()).await;
    let mut client = client(&api_root, API_SECRET, PASSWORD);

    client.authenticate().await.unwrap();
    let month = previous_month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

    assert!(client.top_album(&month).await.unwrap().is_none());
    assert!(state.requests("album.getTopTags").is_empty());
}

#[tokio::test]
async fn test_wrong_password_is_an_authentication_error() {
    let state = StubState::new(one_album());
    let api_root = start_stub(state.clone()).await;
    let mut client = client(&api_root, API_SECRET, "wrong");

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(
        err,
        ScrobblecastError::Scrobbles(ScrobbleError::Authentication(_))
    ));
    assert_eq!(err.exit_code(), 2);
    assert!(state.requests("user.getTopAlbums").is_empty());
}

#[tokio::test]
async fn test_signature_uses_the_shared_secret() {
    let state = StubState::new(one_album());
    let api_root = start_stub(state).await;
    let mut client = client(&api_root, "not-the-secret", PASSWORD);

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(
        err,
        ScrobblecastError::Scrobbles(ScrobbleError::Api { code: 13, .. })
    ));
}
