//! Mock scrobble source for testing
//!
//! Simulates a scrobbling service that returns a fixed album, nothing, or a
//! failure, and counts the calls it receives.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{Result, ScrobbleError};
use crate::period::ReportMonth;
use crate::scrobbles::ScrobbleSource;
use crate::types::{Tag, TopAlbum};

/// Configuration for mock source behavior
#[derive(Debug, Clone)]
pub struct MockScrobbleConfig {
    /// Album returned by `top_album` (None simulates an empty period)
    pub album: Option<TopAlbum>,

    /// Error to return on authentication
    pub auth_error: Option<String>,

    /// Error to return on fetch
    pub fetch_error: Option<String>,

    pub auth_call_count: Arc<Mutex<usize>>,
    pub fetch_call_count: Arc<Mutex<usize>>,
}

impl Default for MockScrobbleConfig {
    fn default() -> Self {
        Self {
            album: None,
            auth_error: None,
            fetch_error: None,
            auth_call_count: Arc::new(Mutex::new(0)),
            fetch_call_count: Arc::new(Mutex::new(0)),
        }
    }
}

/// Mock scrobble source
pub struct MockScrobbleSource {
    config: MockScrobbleConfig,
    authenticated: bool,
}

impl MockScrobbleSource {
    pub fn new(config: MockScrobbleConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A source whose top album is `album`
    pub fn with_album(album: TopAlbum) -> Self {
        Self::new(MockScrobbleConfig {
            album: Some(album),
            ..Default::default()
        })
    }

    /// A source with no listening data for the period
    pub fn empty() -> Self {
        Self::new(MockScrobbleConfig::default())
    }

    /// A source that rejects authentication
    pub fn auth_failure(error: &str) -> Self {
        Self::new(MockScrobbleConfig {
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A source whose fetch fails with a network error
    pub fn fetch_failure(error: &str) -> Self {
        Self::new(MockScrobbleConfig {
            fetch_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Album "X" by "Y", 10 plays, tags a through e
    pub fn sample_album() -> TopAlbum {
        TopAlbum {
            title: "X".to_string(),
            artist: "Y".to_string(),
            url: "http://u".to_string(),
            playcount: 10,
            tags: ["a", "b", "c", "d", "e"].into_iter().map(Tag::new).collect(),
        }
    }

    pub fn auth_call_count(&self) -> usize {
        *self.config.auth_call_count.lock().unwrap()
    }

    pub fn fetch_call_count(&self) -> usize {
        *self.config.fetch_call_count.lock().unwrap()
    }
}

#[async_trait]
impl ScrobbleSource for MockScrobbleSource {
    async fn authenticate(&mut self) -> Result<()> {
        *self.config.auth_call_count.lock().unwrap() += 1;

        match &self.config.auth_error {
            Some(error) => Err(ScrobbleError::Authentication(error.clone()).into()),
            None => {
                self.authenticated = true;
                Ok(())
            }
        }
    }

    async fn top_album(&self, _month: &ReportMonth) -> Result<Option<TopAlbum>> {
        *self.config.fetch_call_count.lock().unwrap() += 1;

        if !self.authenticated {
            return Err(ScrobbleError::Authentication("Not authenticated".to_string()).into());
        }

        if let Some(error) = &self.config.fetch_error {
            return Err(ScrobbleError::Network(error.clone()).into());
        }

        Ok(self.config.album.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
