//! Mastodon platform implementation
//!
//! Uses the megalodon library, so any server implementing the Mastodon API
//! (Mastodon, Pleroma, Akkoma, GoToSocial) works.

use async_trait::async_trait;
use megalodon::entities::StatusVisibility;
use megalodon::megalodon::{PostStatusInputOptions, PostStatusOutput};
use megalodon::{Megalodon, SNS};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::config::{normalize_base_url, MastodonConfig};
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

/// Mastodon's default status length, used until the instance reports its own
pub const DEFAULT_CHARACTER_LIMIT: usize = 500;

/// Length Mastodon charges for any link, whatever its real length
pub const URL_LENGTH: usize = 23;

/// Mastodon platform client
///
/// Posts are always public. The character limit starts at
/// [`DEFAULT_CHARACTER_LIMIT`] and is replaced by the instance's own limit
/// once [`fetch_instance_info`](MastodonClient::fetch_instance_info) succeeds.
pub struct MastodonClient {
    /// megalodon client bound to the instance and access token
    client: Box<dyn Megalodon + Send + Sync>,
    /// Instance URL, always with a scheme
    base_url: String,
    /// Maximum status length as the instance counts it
    character_limit: usize,
}

impl MastodonClient {
    /// Create a new Mastodon client
    ///
    /// No request is made until [`prepare`](Platform::prepare) or the first
    /// post.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Instance URL; `https://` is added when no scheme is given
    /// * `access_token` - OAuth access token with `write:statuses` scope
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if megalodon cannot build a
    /// client for the instance.
    pub fn new(base_url: String, access_token: String) -> Result<Self> {
        let base_url = normalize_base_url(&base_url);
        let client = megalodon::generator(
            SNS::Mastodon,
            base_url.clone(),
            Some(access_token),
            Some("scrobblecast".to_string()),
        )
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to create Mastodon client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            character_limit: DEFAULT_CHARACTER_LIMIT,
        })
    }

    /// Create a Mastodon client from configuration
    ///
    /// # Errors
    ///
    /// Same as [`new`](MastodonClient::new).
    pub fn from_config(config: &MastodonConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.access_token.expose_secret().to_string(),
        )
    }

    /// Fetch instance information including the character limit
    ///
    /// Queries `/api/v1/instance` and stores the instance's
    /// `configuration.statuses.max_characters`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The instance is unreachable
    /// - The API request fails
    /// - The response cannot be parsed
    pub async fn fetch_instance_info(&mut self) -> Result<()> {
        let response = self
            .client
            .get_instance()
            .await
            .map_err(|e| map_megalodon_error(e, "fetch instance info"))?;

        let limit = response.json.configuration.statuses.max_characters;
        self.character_limit = limit as usize;
        debug!(limit = self.character_limit, "Mastodon character limit");

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Platform for MastodonClient {
    /// Reads the instance's character limit
    ///
    /// A failure is logged and the current limit is kept.
    async fn prepare(&mut self) -> Result<()> {
        if let Err(e) = self.fetch_instance_info().await {
            warn!(
                "Could not read the character limit of {}, assuming {}: {}",
                self.base_url, self.character_limit, e
            );
        }
        Ok(())
    }

    async fn post(&self, content: &str) -> Result<String> {
        self.validate_content(content)?;

        let response = self
            .client
            .post_status(content.to_string(), Some(&post_options()))
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let status_id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };

        Ok(status_id)
    }

    fn name(&self) -> &str {
        "mastodon"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(self.character_limit)
    }

    fn content_length(&self, content: &str) -> usize {
        weighted_length(content)
    }
}

fn post_options() -> PostStatusInputOptions {
    PostStatusInputOptions {
        visibility: Some(StatusVisibility::Public),
        ..Default::default()
    }
}

/// Count `content` the way Mastodon does
///
/// Every whitespace-delimited `http://` or `https://` link counts as
/// [`URL_LENGTH`]; everything else counts one per char.
pub fn weighted_length(content: &str) -> usize {
    let mut length = 0;
    let mut rest = content;

    while !rest.is_empty() {
        let word_start = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        length += rest[..word_start].chars().count();
        rest = &rest[word_start..];

        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_end];
        length += if is_link(word) {
            URL_LENGTH
        } else {
            word.chars().count()
        };
        rest = &rest[word_end..];
    }

    length
}

fn is_link(word: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| word.len() > scheme.len() && word.starts_with(scheme))
}

/// Map megalodon errors to PlatformError
///
/// - HTTP 401/403 → `Authentication`
/// - HTTP 422 → `Validation`
/// - HTTP 429 → `RateLimit`
/// - other HTTP statuses and transport failures → `Network`
/// - undecodable responses → `Posting`
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    classify_error(&error.to_string(), context)
}

fn classify_error(error_str: &str, context: &str) -> PlatformError {
    let error_lower = error_str.to_lowercase();

    match extract_http_status(error_str) {
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "Mastodon rejected the access token ({}): {}",
            context, error_str
        )),
        Some(422) => PlatformError::Validation(format!(
            "Mastodon rejected the status ({}): {}",
            context, error_str
        )),
        Some(429) => PlatformError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, error_str
        )),
        Some(code) => PlatformError::Network(format!(
            "Mastodon HTTP {} ({}): {}",
            code, context, error_str
        )),
        None if error_lower.contains("unauthorized") || error_lower.contains("forbidden") => {
            PlatformError::Authentication(format!(
                "Mastodon rejected the access token ({}): {}",
                context, error_str
            ))
        }
        None if error_lower.contains("parse")
            || error_lower.contains("json")
            || error_lower.contains("deserialize") =>
        {
            PlatformError::Posting(format!(
                "Unexpected Mastodon response ({}): {}",
                context, error_str
            ))
        }
        None => PlatformError::Network(format!("Mastodon error ({}): {}", context, error_str)),
    }
}

/// Extract an HTTP status code from an error message
///
/// Recognizes "HTTP 401", "status 403", "code: 429" and bare codes
/// followed by ':' or ' '.
fn extract_http_status(error_str: &str) -> Option<u16> {
    let prefixes = ["HTTP ", "status ", "code: ", "status_code: "];

    for prefix in &prefixes {
        if let Some(pos) = error_str.find(prefix) {
            let code = error_str[pos + prefix.len()..]
                .get(0..3)
                .and_then(|s| s.parse::<u16>().ok());
            if let Some(code) = code.filter(|c| (100..=599).contains(c)) {
                return Some(code);
            }
        }
    }

    let bytes = error_str.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        let digits = window[..3].iter().all(u8::is_ascii_digit);
        let terminated = window[3] == b':' || window[3] == b' ';
        let standalone = i == 0 || !bytes[i - 1].is_ascii_digit();
        if digits && terminated && standalone {
            let code = std::str::from_utf8(&window[..3])
                .ok()
                .and_then(|s| s.parse::<u16>().ok());
            if let Some(code) = code.filter(|c| (100..=599).contains(c)) {
                return Some(code);
            }
        }
    }

    None
}
