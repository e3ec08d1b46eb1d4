//! Scrobbling service abstraction
//!
//! A [`ScrobbleSource`] answers one question: which album did the
//! authenticated user play most over the trailing month. Last.fm is the only
//! real implementation; the mock backs the service tests.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::period::ReportMonth;
use crate::types::TopAlbum;

pub mod lastfm;

// Mock source is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Read access to a user's listening statistics
#[async_trait]
pub trait ScrobbleSource: Send + Sync {
    /// Establish an authenticated session
    ///
    /// # Errors
    ///
    /// Returns `ScrobbleError::Authentication` for rejected credentials and
    /// `ScrobbleError::Network` when the service cannot be reached.
    async fn authenticate(&mut self) -> Result<()>;

    /// The top album over the trailing one-month period
    ///
    /// `month` is only used for log context. `Ok(None)` means the service
    /// had no albums for the period.
    async fn top_album(&self, month: &ReportMonth) -> Result<Option<TopAlbum>>;

    /// Lowercase service identifier (e.g. "lastfm")
    fn name(&self) -> &str;
}

/// Fetch the top album for `month`, logging when there is none
///
/// An empty result is not an error. Transport and authentication failures
/// are returned untouched.
pub async fn fetch_top_album(
    source: &dyn ScrobbleSource,
    month: &ReportMonth,
) -> Result<Option<TopAlbum>> {
    let album = source.top_album(month).await?;

    match &album {
        Some(album) => info!(
            source = source.name(),
            title = %album.title,
            artist = %album.artist,
            playcount = album.playcount,
            "Top album for month {}",
            month.number
        ),
        None => warn!("No top album found for month {}.", month.number),
    }

    Ok(album)
}

#[cfg(test)]
mod tests {
    use super::mock::MockScrobbleSource;
    use super::*;
    use crate::period::previous_month;
    use chrono::NaiveDate;

    fn month() -> ReportMonth {
        previous_month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_top_album_present() {
        let mut source = MockScrobbleSource::with_album(MockScrobbleSource::sample_album());
        source.authenticate().await.unwrap();

        let album = fetch_top_album(&source, &month()).await.unwrap();
        assert_eq!(album.unwrap().title, "X");
        assert_eq!(source.fetch_call_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_top_album_empty_is_not_an_error() {
        let mut source = MockScrobbleSource::empty();
        source.authenticate().await.unwrap();

        let album = fetch_top_album(&source, &month()).await.unwrap();
        assert!(album.is_none());
    }

    #[tokio::test]
    async fn test_fetch_top_album_propagates_errors() {
        let mut source = MockScrobbleSource::fetch_failure("connection reset");
        source.authenticate().await.unwrap();

        let err = fetch_top_album(&source, &month()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
