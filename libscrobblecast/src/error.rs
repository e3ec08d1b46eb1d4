//! Error types for Scrobblecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrobblecastError>;

#[derive(Error, Debug)]
pub enum ScrobblecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scrobble service error: {0}")]
    Scrobbles(#[from] ScrobbleError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl ScrobblecastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ScrobblecastError::Platform(PlatformError::Authentication(_)) => 2,
            ScrobblecastError::Scrobbles(ScrobbleError::Authentication(_)) => 2,
            ScrobblecastError::Platform(_) => 1,
            ScrobblecastError::Scrobbles(_) => 1,
            ScrobblecastError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required setting(s): {}", .0.join(", "))]
    MissingField(Vec<String>),
}

#[derive(Error, Debug, Clone)]
pub enum ScrobbleError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("API error {code}: {message}")]
    Api { code: u32, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
