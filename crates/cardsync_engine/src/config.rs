//! Configuration for the remote card service.

use crate::error::{SyncError, SyncResult};
use std::fmt;
use std::time::Duration;

/// Default Mochi API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://app.mochi.cards/api";

/// Default number of cards requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page the service honours. A page shorter than the requested size
/// marks the end of a listing, so requesting more than this would truncate
/// the fetch.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration handed to the remote card service.
///
/// Credentials live here and nowhere else; the reconciliation logic never
/// reads the environment.
#[derive(Clone)]
pub struct ServiceConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// API key (sent as the basic-auth user name).
    pub api_key: String,
    /// Cards requested per listing page.
    pub page_size: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Creates a configuration for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that the configuration can be used.
    pub fn validate(&self) -> SyncResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(SyncError::Config("API key is empty".into()));
        }
        if self.base_url.is_empty() {
            return Err(SyncError::Config("base URL is empty".into()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(SyncError::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}
