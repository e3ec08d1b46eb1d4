//! Configuration management for Scrobblecast
//!
//! Six settings are required: the Last.fm API key and secret, the Last.fm
//! username and password, and the Mastodon access token and base URL. They
//! come from the environment, optionally layered over a TOML file:
//!
//! ```toml
//! [lastfm]
//! api_key = "..."
//! api_secret = "..."
//! username = "..."
//! password = "..."
//!
//! [mastodon]
//! access_token = "..."
//! base_url = "https://mastodon.social"
//! ```
//!
//! Environment variables take precedence over file values.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const LASTFM_API_KEY: &str = "LASTFM_API_KEY";
pub const LASTFM_API_SECRET: &str = "LASTFM_API_SECRET";
pub const LASTFM_USERNAME: &str = "LASTFM_USERNAME";
pub const LASTFM_PASSWORD: &str = "LASTFM_PASSWORD";
pub const MASTODON_ACCESS_TOKEN: &str = "MASTODON_ACCESS_TOKEN";
pub const MASTODON_BASE_URL: &str = "MASTODON_BASE_URL";

/// Overrides the config file location
pub const CONFIG_PATH_VAR: &str = "SCROBBLECAST_CONFIG";

/// Every required setting, in reporting order
pub const REQUIRED_VARS: [&str; 6] = [
    LASTFM_API_KEY,
    LASTFM_API_SECRET,
    LASTFM_USERNAME,
    LASTFM_PASSWORD,
    MASTODON_ACCESS_TOKEN,
    MASTODON_BASE_URL,
];

/// Validated, immutable configuration
#[derive(Debug)]
pub struct Config {
    pub lastfm: LastfmConfig,
    pub mastodon: MastodonConfig,
}

#[derive(Debug)]
pub struct LastfmConfig {
    pub api_key: String,
    pub api_secret: SecretString,
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct MastodonConfig {
    pub access_token: SecretString,
    pub base_url: String,
}

/// On-disk layout; every field is optional until merged and validated
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub lastfm: LastfmSection,
    #[serde(default)]
    pub mastodon: MastodonSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct LastfmSection {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MastodonSection {
    pub access_token: Option<String>,
    pub base_url: Option<String>,
}

impl ConfigFile {
    /// Load a config file from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let file: ConfigFile = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(file)
    }

    fn value(&self, key: &str) -> Option<&str> {
        match key {
            LASTFM_API_KEY => self.lastfm.api_key.as_deref(),
            LASTFM_API_SECRET => self.lastfm.api_secret.as_deref(),
            LASTFM_USERNAME => self.lastfm.username.as_deref(),
            LASTFM_PASSWORD => self.lastfm.password.as_deref(),
            MASTODON_ACCESS_TOKEN => self.mastodon.access_token.as_deref(),
            MASTODON_BASE_URL => self.mastodon.base_url.as_deref(),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from the config file (if any) and the environment
    pub fn load() -> Result<Self> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => ConfigFile::load_from_path(&expand_path(&path))?,
            Err(_) => match default_config_path() {
                Some(path) if path.exists() => ConfigFile::load_from_path(&path)?,
                _ => ConfigFile::default(),
            },
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Build configuration from environment-style lookups only
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_sources(ConfigFile::default(), lookup)
    }

    /// Merge a config file with lookups (lookups win) and validate
    ///
    /// Blank values count as missing. All missing settings are reported
    /// together.
    pub fn from_sources<F>(file: ConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |key: &str| -> Option<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.value(key).map(str::to_string))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let values: Vec<Option<String>> = REQUIRED_VARS.iter().map(|key| resolve(*key)).collect();

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingField(missing).into());
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();

        Ok(Self {
            lastfm: LastfmConfig {
                api_key: next(),
                api_secret: SecretString::from(next()),
                username: next(),
                password: SecretString::from(next()),
            },
            mastodon: MastodonConfig {
                access_token: SecretString::from(next()),
                base_url: normalize_base_url(&next()),
            },
        })
    }
}

/// Ensure the instance URL carries a scheme
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Default config file location following the XDG Base Directory spec
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scrobblecast").join("config.toml"))
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
