// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of a finished crawl run.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Distinct URLs claimed by the crawl (pages and downloaded files)
    pub visited: usize,
    /// Pages fetched successfully
    pub fetched: usize,
    /// Fetches or downloads that failed
    pub failed: usize,
    /// Tasks rejected because the frontier was full
    pub dropped: usize,
    /// Files written to the download directory
    pub saved: usize,
    /// Downloads skipped because identical content was already on disk
    pub duplicates: usize,
    /// Distinct files per extension (scan mode)
    pub file_counts: Vec<(String, usize)>,
    pub total_files: usize,
}

impl CrawlReport {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Render the scan-mode table of extension counts.
pub fn render_stats_table(report: &CrawlReport) -> String {
    let mut out = String::new();

    if report.total_files == 0 {
        out.push_str("No matching files were found.\n");
    } else {
        let width = report
            .file_counts
            .iter()
            .map(|(ext, _)| ext.len())
            .max()
            .unwrap_or(0)
            .max("Extension".len());

        out.push_str(&format!("{:<width$}  Files\n", "Extension"));
        out.push_str(&format!("{}  {}\n", "-".repeat(width), "-".repeat(5)));
        for (ext, count) in &report.file_counts {
            out.push_str(&format!("{ext:<width$}  {count:>5}\n"));
        }
        out.push_str(&format!("{:<width$}  {:>5}\n", "Total", report.total_files));
    }

    out.push_str(&format!("URLs visited: {}\n", report.visited));
    out
}
