// src/lib.rs

//! metacrawl Library
//!
//! Crawls a site from a seed URL, classifies linked resources by file
//! extension, and either tallies them or downloads them without duplicates.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
