//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::RateLimiter;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.crawler.validate()
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Number of concurrent crawl workers
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    /// Global request budget shared by all workers
    #[serde(default = "defaults::requests_per_second")]
    pub requests_per_second: f64,

    /// Maximum number of queued crawl tasks
    #[serde(default = "defaults::max_queue")]
    pub max_queue: usize,

    /// Link hops followed from the seed page (0 = seed only)
    #[serde(default = "defaults::max_depth")]
    pub max_depth: u32,

    /// Follow links leaving the seed's domain
    #[serde(default)]
    pub follow_external: bool,

    /// File extensions of interest
    #[serde(default = "defaults::extensions")]
    pub extensions: Vec<String>,
}

impl CrawlerConfig {
    /// Validate crawler settings.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.workers == 0 {
            return Err(AppError::validation("crawler.workers must be > 0"));
        }
        if !RateLimiter::accepts(self.requests_per_second) {
            return Err(AppError::validation(format!(
                "crawler.requests_per_second must be a positive number, got {}",
                self.requests_per_second
            )));
        }
        if self.max_queue == 0 {
            return Err(AppError::validation("crawler.max_queue must be > 0"));
        }
        if self.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            return Err(AppError::validation("crawler.extensions is empty"));
        }
        Ok(())
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            workers: defaults::workers(),
            requests_per_second: defaults::requests_per_second(),
            max_queue: defaults::max_queue(),
            max_depth: defaults::max_depth(),
            follow_external: false,
            extensions: defaults::extensions(),
        }
    }
}

/// Extensions treated as files when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "txt", "csv",
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "svg", "webp",
    // archives
    "zip", "rar", "7z", "tar", "gz",
    // contact cards
    "vcf",
];

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; metacrawl/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn workers() -> usize {
        5
    }
    pub fn requests_per_second() -> f64 {
        2.0
    }
    pub fn max_queue() -> usize {
        10_000
    }
    pub fn max_depth() -> u32 {
        1
    }
    pub fn extensions() -> Vec<String> {
        super::DEFAULT_EXTENSIONS
            .iter()
            .map(|e| e.to_string())
            .collect()
    }
}
