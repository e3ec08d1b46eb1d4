//! Mock platform implementation for testing
//!
//! Records everything it is asked to post and can be configured to fail, so
//! the monthly run can be exercised without credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub name: String,

    /// Error to return on posting (None means posting succeeds)
    pub post_error: Option<String>,

    pub character_limit: Option<usize>,

    /// Number of times prepare has been called
    pub prepare_call_count: Arc<Mutex<usize>>,

    /// Number of times post has been called
    pub post_call_count: Arc<Mutex<usize>>,

    /// Posts that have been made
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            post_error: None,
            character_limit: None,
            prepare_call_count: Arc::new(Mutex::new(0)),
            post_call_count: Arc::new(Mutex::new(0)),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A platform that accepts every post
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A platform whose posts fail with `error`
    pub fn post_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A platform with a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    pub fn prepare_call_count(&self) -> usize {
        *self.config.prepare_call_count.lock().unwrap()
    }

    pub fn post_call_count(&self) -> usize {
        *self.config.post_call_count.lock().unwrap()
    }

    /// Content of every successful post, in order
    pub fn posted_content(&self) -> Vec<String> {
        self.config.posted_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn prepare(&mut self) -> Result<()> {
        *self.config.prepare_call_count.lock().unwrap() += 1;
        Ok(())
    }

    async fn post(&self, content: &str) -> Result<String> {
        *self.config.post_call_count.lock().unwrap() += 1;

        self.validate_content(content)?;

        if let Some(error) = &self.config.post_error {
            return Err(PlatformError::Posting(error.clone()).into());
        }

        let mut posted = self.config.posted_content.lock().unwrap();
        posted.push(content.to_string());
        Ok(format!("{}:mock-{}", self.config.name, posted.len()))
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }
}
