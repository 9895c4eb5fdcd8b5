// src/pipeline/state.rs

//! Per-crawl shared sets: visited URLs and discovered files.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// URLs already claimed by a worker in this crawl.
#[derive(Debug, Default)]
pub struct SeenSet {
    urls: Mutex<HashSet<String>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `url`. Returns `false` if it was claimed before.
    pub fn insert(&self, url: &str) -> bool {
        let mut urls = lock(&self.urls);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        lock(&self.urls).contains(url)
    }

    /// Number of URLs claimed so far.
    pub fn count(&self) -> usize {
        lock(&self.urls).len()
    }
}

/// Distinct `(url, file name)` pairs per extension, for scan mode.
///
/// Counts are an estimate of unique files: two URLs serving the same bytes
/// count twice, since nothing is fetched to compare them.
#[derive(Debug, Default)]
pub struct FileStats {
    by_extension: Mutex<BTreeMap<String, HashSet<(String, String)>>>,
}

impl FileStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file. Returns `false` if the pair was already recorded.
    pub fn record(&self, extension: &str, url: &str, file_name: &str) -> bool {
        lock(&self.by_extension)
            .entry(extension.to_string())
            .or_default()
            .insert((url.to_string(), file_name.to_string()))
    }

    /// Count per extension, sorted by extension.
    pub fn counts(&self) -> Vec<(String, usize)> {
        lock(&self.by_extension)
            .iter()
            .map(|(ext, files)| (ext.clone(), files.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        lock(&self.by_extension).values().map(HashSet::len).sum()
    }
}
