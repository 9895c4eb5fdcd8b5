// src/services/downloader.rs

//! File downloader with content deduplication.

use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::services::RateLimiter;
use crate::storage::{LocalStore, StoreOutcome};
use crate::utils::file_name_from_url;
use crate::utils::http::Fetcher;

/// Fetches files and hands them to the [`LocalStore`].
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    rate_limiter: Arc<RateLimiter>,
    store: LocalStore,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, rate_limiter: Arc<RateLimiter>, store: LocalStore) -> Self {
        Self {
            fetcher,
            rate_limiter,
            store,
        }
    }

    /// Fetch `url` and save it under its path basename.
    pub async fn download(&self, url: &Url) -> Result<StoreOutcome> {
        self.rate_limiter.wait().await;
        log::info!("Downloading {}", url);
        let file = self.fetcher.fetch(url.as_str()).await?;

        let file_name = file_name_from_url(url).unwrap_or_else(|| "download".to_string());
        let outcome = self.store.store(&file_name, &file.body).await?;

        let path = outcome.path().display();
        match &outcome {
            StoreOutcome::Saved { .. } => {
                log::info!("Saved {} -> {} (sha256 {})", url, path, outcome.digest());
            }
            StoreOutcome::Duplicate { .. } => {
                log::info!("Skipped {}: identical content already saved as {}", url, path);
            }
        }

        Ok(outcome)
    }
}
