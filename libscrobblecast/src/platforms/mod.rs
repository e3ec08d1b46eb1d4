//! Publishing platforms
//!
//! A [`Platform`] takes finished text and publishes it. Mastodon (and other
//! servers speaking the Mastodon API) is the real implementation.
//!
//! # Examples
//!
//! ```no_run
//! use libscrobblecast::platforms::{Platform, mastodon::MastodonClient};
//!
//! # async fn example() -> libscrobblecast::Result<()> {
//! let mut client = MastodonClient::new(
//!     "https://mastodon.social".to_string(),
//!     "your-access-token".to_string(),
//! )?;
//!
//! client.prepare().await?;
//! let status_id = client.post("In January, ...").await?;
//! println!("Posted: {}", status_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::{PlatformError, Result};

pub mod mastodon;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Write access to a social account
#[async_trait]
pub trait Platform: Send + Sync {
    /// Fetch whatever the platform needs before posting
    ///
    /// Called once per run, after the message is composed and before
    /// [`post`](Platform::post). The default does nothing.
    ///
    /// # Errors
    ///
    /// Implementations may fail if the server cannot be reached.
    async fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    /// Publish `content` publicly
    ///
    /// Returns the platform's identifier for the new post.
    ///
    /// # Errors
    ///
    /// - `PlatformError::Validation` if the content is rejected locally or by the server
    /// - `PlatformError::Authentication` for an invalid or expired token
    /// - `PlatformError::Network` / `PlatformError::Posting` for everything else
    async fn post(&self, content: &str) -> Result<String>;

    /// Lowercase platform identifier (e.g. "mastodon")
    fn name(&self) -> &str;

    /// Maximum post length in characters, if the platform has one
    fn character_limit(&self) -> Option<usize>;

    /// Length of `content` as the platform counts it
    ///
    /// Defaults to the number of chars.
    fn content_length(&self, content: &str) -> usize {
        content.chars().count()
    }

    /// Check content before it is sent
    ///
    /// The default rejects blank content and content whose
    /// [`content_length`](Platform::content_length) is over
    /// [`character_limit`](Platform::character_limit).
    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        if let Some(limit) = self.character_limit() {
            let count = self.content_length(content);
            if count > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds {}'s {} character limit (current: {} characters)",
                    self.name(),
                    limit,
                    count
                ))
                .into());
            }
        }

        Ok(())
    }
}
