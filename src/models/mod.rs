// src/models/mod.rs

//! Domain models for the crawler.
//!
//! This module contains the data structures shared across the crate,
//! organized by their primary purpose.

mod config;
mod crawl;
mod report;

// Re-export all public types
pub use config::{Config, CrawlerConfig, DEFAULT_EXTENSIONS};
pub use crawl::{CrawlMode, CrawlOptions, CrawlTask};
pub use report::{CrawlReport, render_stats_table};
