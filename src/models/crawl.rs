// src/models/crawl.rs

//! Crawl tasks and run options.

use std::path::PathBuf;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::RateLimiter;
use crate::utils::validate_seed;

/// A unit of work on the frontier: fetch `url` and expand its links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    /// Link hops still allowed below this page
    pub remaining_depth: u32,
    /// Authority of the seed URL, used by the domain policy
    pub base_domain: String,
    pub follow_external: bool,
}

impl CrawlTask {
    /// Build the child task for a page linked from this one.
    ///
    /// Returns `None` once the depth budget is spent.
    pub fn child(&self, url: String) -> Option<Self> {
        let remaining_depth = self.remaining_depth.checked_sub(1)?;
        Some(Self {
            url,
            remaining_depth,
            base_domain: self.base_domain.clone(),
            follow_external: self.follow_external,
        })
    }
}

/// What to do with discovered files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlMode {
    /// Tally files per extension without fetching them.
    Scan,
    /// Fetch files and write them into `dir`.
    Download { dir: PathBuf },
}

impl CrawlMode {
    /// Resolve the mode from the two mutually exclusive CLI switches.
    pub fn from_flags(scan: bool, download: Option<PathBuf>) -> Result<Self> {
        match (scan, download) {
            (true, Some(_)) => Err(AppError::config(
                "scan and download modes are mutually exclusive",
            )),
            (true, None) => Ok(Self::Scan),
            (false, Some(dir)) => Ok(Self::Download { dir }),
            (false, None) => Err(AppError::config(
                "choose either scan mode or a download directory",
            )),
        }
    }
}

/// Everything a single crawl run needs to know.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed: String,
    pub max_depth: u32,
    pub extensions: Vec<String>,
    pub workers: usize,
    pub requests_per_second: f64,
    pub follow_external: bool,
    pub max_queue: usize,
    pub mode: CrawlMode,
}

impl CrawlOptions {
    /// Build run options from the crawler section of the config file.
    pub fn from_config(seed: impl Into<String>, mode: CrawlMode, config: &CrawlerConfig) -> Self {
        Self {
            seed: seed.into(),
            max_depth: config.max_depth,
            extensions: config.extensions.clone(),
            workers: config.workers,
            requests_per_second: config.requests_per_second,
            follow_external: config.follow_external,
            max_queue: config.max_queue,
            mode,
        }
    }

    /// Check the options and return the parsed seed URL.
    pub fn validate(&self) -> Result<Url> {
        let seed = validate_seed(&self.seed)?;

        if self.workers == 0 {
            return Err(AppError::validation("workers must be > 0"));
        }
        if !RateLimiter::accepts(self.requests_per_second) {
            return Err(AppError::validation(format!(
                "requests per second must be a positive number, got {}",
                self.requests_per_second
            )));
        }
        if self.max_queue == 0 {
            return Err(AppError::validation("max queue size must be > 0"));
        }
        if self
            .extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err(AppError::validation("no file extensions to look for"));
        }
        if let CrawlMode::Download { dir } = &self.mode {
            if dir.exists() && !dir.is_dir() {
                return Err(AppError::config(format!(
                    "download destination {} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(seed)
    }
}
