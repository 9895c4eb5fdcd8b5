//! metacrawl CLI
//!
//! Crawls a site for documents, images and archives, then prints a tally or
//! downloads them into a directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgGroup, Parser};
use metacrawl::{
    error::Result,
    models::{Config, CrawlMode, CrawlOptions, CrawlReport, render_stats_table},
    pipeline,
    utils::http::HttpFetcher,
};

/// metacrawl - find and collect files linked from a website
#[derive(Parser, Debug)]
#[command(name = "metacrawl", version, about = "Crawl a site for files of interest")]
#[command(group(ArgGroup::new("mode").required(true).args(["scan", "download"])))]
struct Cli {
    /// Seed URL (http or https)
    seed: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "metacrawl.toml")]
    config: PathBuf,

    /// Link hops to follow from the seed page (0 = seed only)
    #[arg(short = 'D', long)]
    depth: Option<u32>,

    /// File extensions to look for (overrides the default list)
    #[arg(short, long, num_args = 1..)]
    extensions: Option<Vec<String>>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Requests per second across all workers
    #[arg(short, long)]
    rate: Option<f64>,

    /// Follow links to other domains
    #[arg(long)]
    follow_external: bool,

    /// Only count discovered files per extension
    #[arg(long)]
    scan: bool,

    /// Download discovered files into this directory
    #[arg(short, long, value_name = "DIR")]
    download: Option<PathBuf>,

    /// Write the crawl report as JSON to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Merge config file values with command-line overrides.
    fn crawl_options(&self, config: &Config) -> Result<CrawlOptions> {
        let mode = CrawlMode::from_flags(self.scan, self.download.clone())?;
        let mut options = CrawlOptions::from_config(&self.seed, mode, &config.crawler);

        if let Some(depth) = self.depth {
            options.max_depth = depth;
        }
        if let Some(extensions) = &self.extensions {
            options.extensions = extensions.clone();
        }
        if let Some(workers) = self.workers {
            options.workers = workers;
        }
        if let Some(rate) = self.rate {
            options.requests_per_second = rate;
        }
        options.follow_external |= self.follow_external;

        Ok(options)
    }
}

/// Load and validate the config file, or fall back to defaults if it is absent.
fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let config = Config::load(path)?;
        log::info!("Loaded configuration from {}", path.display());
        config
    } else {
        log::debug!("No config file at {}, using defaults", path.display());
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_summary(options: &CrawlOptions, report: &CrawlReport) {
    match &options.mode {
        CrawlMode::Scan => print!("{}", render_stats_table(report)),
        CrawlMode::Download { dir } => {
            log::info!(
                "Saved {} files to {} ({} duplicates skipped)",
                report.saved,
                dir.display(),
                report.duplicates
            );
            log::info!("URLs visited: {}", report.visited);
        }
    }

    if report.failed > 0 {
        log::warn!("{} requests failed; see log above", report.failed);
    }
    if report.dropped > 0 {
        log::warn!("{} links dropped because the queue was full", report.dropped);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
    };

    let options = cli.crawl_options(&config)?;
    if let Err(e) = options.validate() {
        log::error!("Invalid crawl options: {}", e);
        return Err(e);
    }

    let fetcher = Arc::new(HttpFetcher::from_config(&config.crawler)?);
    let report = pipeline::run_crawler(&options, fetcher).await?;

    print_summary(&options, &report);

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
