//! Core types for Scrobblecast

use serde::{Deserialize, Serialize};

/// A tag attached to an album by the scrobbling service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The user's most played album over a period
///
/// `playcount` is the user's play count for the period, and `tags` keeps the
/// order the service ranked them in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopAlbum {
    pub title: String,
    pub artist: String,
    pub url: String,
    pub playcount: u64,
    pub tags: Vec<Tag>,
}
