//! Service layer for the crawler.
//!
//! This module contains the building blocks the crawl pipeline wires together:
//! - Request throttling (`RateLimiter`)
//! - Link extraction (`extract_links`)
//! - File classification (`FileClassifier`)
//! - File downloading (`Downloader`)

mod classifier;
mod downloader;
mod links;
mod rate_limiter;

pub use classifier::FileClassifier;
pub use downloader::Downloader;
pub use links::{extract_links, is_html_content_type};
pub use rate_limiter::RateLimiter;
