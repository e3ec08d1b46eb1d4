//! Scrobblecast - monthly top-album announcements
//!
//! This library fetches the authenticated Last.fm user's top album for the
//! trailing month and publishes a short announcement to Mastodon.

pub mod compose;
pub mod config;
pub mod error;
pub mod logging;
pub mod period;
pub mod platforms;
pub mod scrobbles;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ScrobblecastError, Result};
pub use period::ReportMonth;
pub use service::{MonthlyRun, RunOptions, RunOutcome};
pub use types::{Tag, TopAlbum};
