//! Client configuration
//!
//! Credentials and endpoints are passed in explicitly; `from_env` is a
//! convenience for binaries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WclError;

pub const DEFAULT_BASE_URL: &str = "https://www.warcraftlogs.com:443/v1";
pub const DEFAULT_SITE_URL: &str = "https://www.warcraftlogs.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Retry policy for report API and score page requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries (0 = no retries, run once).
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries (milliseconds).
    pub backoff_base_ms: u64,
    /// HTTP statuses worth retrying.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base_ms: 100,
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Whether a failed request is worth another attempt.
    pub fn is_retryable(&self, err: &WclError) -> bool {
        match err {
            WclError::Status { status, .. } => self.retry_statuses.contains(status),
            WclError::Transport(_) => true,
            _ => false,
        }
    }
}

/// Report API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WclConfig {
    /// Report API root, e.g. `https://www.warcraftlogs.com:443/v1`
    pub base_url: String,
    /// Public site root, used for report links
    pub site_url: String,
    /// API key sent as the `api_key` query parameter
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Pre-rendered score page endpoint with `{code}` and `{fight}`
    /// placeholders. Unset means score pages are read from disk.
    pub score_page_url: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for WclConfig {
    fn default() -> Self {
        WclConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            score_page_url: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl WclConfig {
    /// Read `WCL_API_KEY`, `WCL_BASE_URL`, `WCL_SITE_URL` and
    /// `WCL_SCORE_PAGE_URL`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        WclConfig {
            base_url: std::env::var("WCL_BASE_URL").unwrap_or(defaults.base_url),
            site_url: std::env::var("WCL_SITE_URL").unwrap_or(defaults.site_url),
            api_key: std::env::var("WCL_API_KEY").ok().filter(|k| !k.is_empty()),
            score_page_url: std::env::var("WCL_SCORE_PAGE_URL").ok(),
            ..defaults
        }
    }

    /// Config for the public API with the given key.
    pub fn new(api_key: &str) -> Self {
        WclConfig {
            api_key: Some(api_key.to_string()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.site_url = site_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_score_page_url(mut self, template: &str) -> Self {
        self.score_page_url = Some(template.to_string());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The API key, or `MissingApiKey`.
    pub fn require_api_key(&self) -> Result<&str, WclError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(WclError::MissingApiKey)
    }

    /// Public reports root on the site, e.g. `https://www.warcraftlogs.com/reports`.
    pub fn reports_url(&self) -> String {
        format!("{}/reports", self.site_url.trim_end_matches('/'))
    }
}
