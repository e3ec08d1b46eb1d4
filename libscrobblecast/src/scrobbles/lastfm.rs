//! Last.fm scrobble source
//!
//! Talks to the Last.fm web service (`ws.audioscrobbler.com/2.0`) over JSON.
//! Authentication uses a signed `auth.getMobileSession` call; the top album
//! comes from `user.getTopAlbums` and its tags from `album.getTopTags`.

use async_trait::async_trait;
use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::LastfmConfig;
use crate::error::{Result, ScrobbleError};
use crate::period::ReportMonth;
use crate::scrobbles::ScrobbleSource;
use crate::types::{Tag, TopAlbum};

pub const DEFAULT_API_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

/// Period name Last.fm uses for the trailing month
pub const PERIOD_ONE_MONTH: &str = "1month";

/// Last.fm client
pub struct LastfmClient {
    http: reqwest::Client,
    /// Endpoint every method is sent to
    api_root: String,
    api_key: String,
    /// Shared secret used to sign authenticated calls
    api_secret: SecretString,
    username: String,
    password: SecretString,
    /// Canonical user name returned by `auth.getMobileSession`
    session_user: Option<String>,
}

impl LastfmClient {
    /// Create a client against the public Last.fm API
    ///
    /// No request is made until [`authenticate`](ScrobbleSource::authenticate).
    ///
    /// # Arguments
    ///
    /// * `api_key` - Application API key
    /// * `api_secret` - Application shared secret, used for `api_sig`
    /// * `username` - Last.fm account name
    /// * `password` - Last.fm account password
    pub fn new(
        api_key: String,
        api_secret: SecretString,
        username: String,
        password: SecretString,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_root: DEFAULT_API_ROOT.to_string(),
            api_key,
            api_secret,
            username,
            password,
            session_user: None,
        }
    }

    /// Create a client from the validated `[lastfm]` settings
    pub fn from_config(config: &LastfmConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            SecretString::from(config.api_secret.expose_secret().to_string()),
            config.username.clone(),
            SecretString::from(config.password.expose_secret().to_string()),
        )
    }

    /// Point the client at a different API root
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, params: &BTreeMap<&str, String>) -> Result<T> {
        let response = self
            .http
            .get(&self.api_root)
            .query(params)
            .send()
            .await
            .map_err(|e| ScrobbleError::Network(format!("Last.fm request failed: {}", e)))?;

        read_response(response).await
    }

    async fn post<T: DeserializeOwned>(&self, params: &BTreeMap<&str, String>) -> Result<T> {
        let response = self
            .http
            .post(&self.api_root)
            .form(params)
            .send()
            .await
            .map_err(|e| ScrobbleError::Network(format!("Last.fm request failed: {}", e)))?;

        read_response(response).await
    }

    async fn album_tags(&self, artist: &str, album: &str) -> Result<Vec<Tag>> {
        let mut params = BTreeMap::new();
        params.insert("method", "album.getTopTags".to_string());
        params.insert("artist", artist.to_string());
        params.insert("album", album.to_string());
        params.insert("api_key", self.api_key.clone());
        params.insert("format", "json".to_string());

        let response: TopTagsResponse = self.get(&params).await?;
        Ok(response
            .toptags
            .tag
            .into_vec()
            .into_iter()
            .map(|t| Tag::new(t.name))
            .collect())
    }
}

#[async_trait]
impl ScrobbleSource for LastfmClient {
    async fn authenticate(&mut self) -> Result<()> {
        let mut params = BTreeMap::new();
        params.insert("method", "auth.getMobileSession".to_string());
        params.insert("username", self.username.clone());
        params.insert("password", self.password.expose_secret().to_string());
        params.insert("api_key", self.api_key.clone());
        let signature = sign(&params, self.api_secret.expose_secret());
        params.insert("api_sig", signature);
        params.insert("format", "json".to_string());

        let response: SessionResponse = self.post(&params).await?;
        debug!(user = %response.session.name, "Last.fm session established");

        self.session_user = Some(response.session.name);
        Ok(())
    }

    async fn top_album(&self, month: &ReportMonth) -> Result<Option<TopAlbum>> {
        let user = self.session_user.as_ref().ok_or_else(|| {
            ScrobbleError::Authentication("Not authenticated with Last.fm".to_string())
        })?;

        debug!(user = %user, month = month.number, "Requesting top album");

        let mut params = BTreeMap::new();
        params.insert("method", "user.getTopAlbums".to_string());
        params.insert("user", user.clone());
        params.insert("period", PERIOD_ONE_MONTH.to_string());
        params.insert("limit", "1".to_string());
        params.insert("api_key", self.api_key.clone());
        params.insert("format", "json".to_string());

        let response: TopAlbumsResponse = self.get(&params).await?;
        let Some(entry) = response.topalbums.album.into_vec().into_iter().next() else {
            return Ok(None);
        };

        let playcount = entry.playcount.value()?;
        let tags = self.album_tags(&entry.artist.name, &entry.name).await?;

        Ok(Some(TopAlbum {
            title: entry.name,
            artist: entry.artist.name,
            url: entry.url,
            playcount,
            tags,
        }))
    }

    fn name(&self) -> &str {
        "lastfm"
    }
}

/// Compute a Last.fm `api_sig`
///
/// Parameters are concatenated as `keyvalue` in key order, followed by the
/// shared secret, and hashed with MD5. `format` and `callback` are never
/// signed.
pub fn sign(params: &BTreeMap<&str, String>, secret: &str) -> String {
    let mut hasher = Md5::new();
    for (key, value) in params {
        if *key == "format" || *key == "callback" {
            continue;
        }
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ScrobbleError::Network(format!("Failed to read Last.fm response: {}", e)))?;

    Ok(parse_body(status.as_u16(), &body)?)
}

/// Decode a Last.fm response body, surfacing API error payloads
pub fn parse_body<T: DeserializeOwned>(status: u16, body: &str) -> std::result::Result<T, ScrobbleError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        if (200..300).contains(&status) {
            ScrobbleError::Parse(format!("Invalid JSON from Last.fm: {}", e))
        } else {
            ScrobbleError::Network(format!("Last.fm returned HTTP {}", status))
        }
    })?;

    if let Ok(api_error) = serde_json::from_value::<ApiErrorBody>(value.clone()) {
        return Err(map_api_error(api_error.error, api_error.message));
    }

    if !(200..300).contains(&status) {
        return Err(ScrobbleError::Network(format!("Last.fm returned HTTP {}", status)));
    }

    serde_json::from_value(value)
        .map_err(|e| ScrobbleError::Parse(format!("Unexpected Last.fm response: {}", e)))
}

/// Map a Last.fm error code to a ScrobbleError
///
/// - 4, 9, 10, 14, 26 → `Authentication` (bad credentials, session or key)
/// - 29 → `RateLimit`
/// - anything else → `Api`
pub fn map_api_error(code: u32, message: String) -> ScrobbleError {
    match code {
        4 | 9 | 10 | 14 | 26 => {
            ScrobbleError::Authentication(format!("Last.fm error {}: {}", code, message))
        }
        29 => ScrobbleError::RateLimit(message),
        _ => ScrobbleError::Api { code, message },
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: u32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: SessionBody,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TopAlbumsResponse {
    topalbums: TopAlbums,
}

#[derive(Debug, Deserialize)]
struct TopAlbums {
    #[serde(default)]
    album: OneOrMany<AlbumEntry>,
}

#[derive(Debug, Deserialize)]
struct AlbumEntry {
    name: String,
    url: String,
    playcount: Count,
    artist: ArtistRef,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TopTagsResponse {
    toptags: TopTags,
}

#[derive(Debug, Deserialize)]
struct TopTags {
    #[serde(default)]
    tag: OneOrMany<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Last.fm collapses single-element lists into a bare object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Counts arrive as strings ("42") or numbers depending on the endpoint
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
}

impl Count {
    fn value(&self) -> std::result::Result<u64, ScrobbleError> {
        match self {
            Count::Number(n) => Ok(*n),
            Count::Text(s) => s.trim().parse().map_err(|_| {
                ScrobbleError::Parse(format!("Invalid play count from Last.fm: {:?}", s))
            }),
        }
    }
}
