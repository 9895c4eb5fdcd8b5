// src/pipeline/crawl.rs

//! Crawl pipeline: a fixed pool of workers sharing one frontier.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlMode, CrawlOptions, CrawlReport, CrawlTask};
use crate::pipeline::frontier::{Frontier, PushError, TaskGuard};
use crate::pipeline::state::{FileStats, SeenSet};
use crate::services::{Downloader, FileClassifier, RateLimiter, extract_links, is_html_content_type};
use crate::storage::{LocalStore, StoreOutcome};
use crate::utils::http::Fetcher;
use crate::utils::{authority, file_name_from_url, is_http, resolve_url};

#[derive(Debug, Default)]
struct Counters {
    fetched: AtomicUsize,
    failed: AtomicUsize,
    dropped: AtomicUsize,
    saved: AtomicUsize,
    duplicates: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// State shared by every worker of one crawl.
struct CrawlContext {
    frontier: Frontier,
    seen: SeenSet,
    stats: FileStats,
    counters: Counters,
    rate_limiter: Arc<RateLimiter>,
    fetcher: Arc<dyn Fetcher>,
    classifier: FileClassifier,
    /// Present in download mode only
    downloader: Option<Downloader>,
}

impl CrawlContext {
    fn report(&self, started_at: DateTime<Utc>) -> CrawlReport {
        let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);

        CrawlReport {
            started_at,
            finished_at: Utc::now(),
            visited: self.seen.count(),
            fetched: load(&self.counters.fetched),
            failed: load(&self.counters.failed),
            dropped: load(&self.counters.dropped),
            saved: load(&self.counters.saved),
            duplicates: load(&self.counters.duplicates),
            file_counts: self.stats.counts(),
            total_files: self.stats.total(),
        }
    }
}

/// Crawl from `options.seed` until no work is left.
///
/// Configuration problems are returned before any request is made; every
/// later failure is logged, counted in the report, and skipped.
pub async fn run_crawler(options: &CrawlOptions, fetcher: Arc<dyn Fetcher>) -> Result<CrawlReport> {
    let seed = options.validate()?;
    let started_at = Utc::now();

    let rate_limiter = Arc::new(RateLimiter::new(options.requests_per_second));
    let downloader = match &options.mode {
        CrawlMode::Scan => None,
        CrawlMode::Download { dir } => {
            let store = LocalStore::open(dir).await?;
            Some(Downloader::new(
                Arc::clone(&fetcher),
                Arc::clone(&rate_limiter),
                store,
            ))
        }
    };

    let context = Arc::new(CrawlContext {
        frontier: Frontier::new(options.max_queue),
        seen: SeenSet::new(),
        stats: FileStats::new(),
        counters: Counters::default(),
        rate_limiter,
        fetcher,
        classifier: FileClassifier::new(&options.extensions),
        downloader,
    });

    log::info!(
        "Crawling {} (depth {}, {} workers, {} req/s, {})",
        seed,
        options.max_depth,
        options.workers,
        options.requests_per_second,
        match &options.mode {
            CrawlMode::Scan => "scan".to_string(),
            CrawlMode::Download { dir } => format!("download to {}", dir.display()),
        }
    );

    context
        .frontier
        .push(CrawlTask {
            url: seed.to_string(),
            remaining_depth: options.max_depth,
            base_domain: authority(&seed).to_string(),
            follow_external: options.follow_external,
        })
        .map_err(|e| AppError::crawl(seed.as_str(), e))?;

    let handles: Vec<_> = (0..options.workers)
        .map(|id| {
            let worker = Worker {
                id,
                context: Arc::clone(&context),
            };
            tokio::spawn(worker.run())
        })
        .collect();

    context.frontier.join().await;
    context.frontier.close();

    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            log::error!("Crawl worker terminated abnormally: {}", e);
        }
    }

    let report = context.report(started_at);
    log::info!(
        "Crawl finished in {:.1}s: {} URLs visited, {} pages fetched, {} failures",
        report.duration_secs(),
        report.visited,
        report.fetched,
        report.failed
    );

    Ok(report)
}

struct Worker {
    id: usize,
    context: Arc<CrawlContext>,
}

impl Worker {
    async fn run(self) {
        log::debug!("Worker {} started", self.id);

        while let Some(task) = self.context.frontier.pop().await {
            let _done = TaskGuard::new(&self.context.frontier);
            self.process(task).await;
        }

        log::debug!("Worker {} stopped", self.id);
    }

    async fn process(&self, task: CrawlTask) {
        let ctx = &self.context;

        if !ctx.seen.insert(&task.url) {
            log::debug!("Already visited {}", task.url);
            return;
        }

        ctx.rate_limiter.wait().await;
        log::info!(
            "Fetching {} (worker {}, depth left {})",
            task.url,
            self.id,
            task.remaining_depth
        );

        let page = match ctx.fetcher.fetch(&task.url).await {
            Ok(page) => page,
            Err(e) => {
                Counters::bump(&ctx.counters.failed);
                log::warn!("Failed to fetch {}: {}", task.url, e);
                return;
            }
        };
        Counters::bump(&ctx.counters.fetched);

        if !is_html_content_type(page.content_type.as_deref()) {
            log::debug!(
                "Not HTML ({}), no links followed: {}",
                page.content_type.as_deref().unwrap_or("no content type"),
                task.url
            );
            return;
        }

        let links = match page.text() {
            Ok(html) => extract_links(html),
            Err(e) => {
                Counters::bump(&ctx.counters.failed);
                log::warn!("{}", e);
                return;
            }
        };

        let Some(base) = Url::parse(&page.url)
            .or_else(|_| Url::parse(&task.url))
            .ok()
        else {
            return;
        };

        let (files, pages) = self.partition(&base, links);

        if task.remaining_depth > 0 {
            for url in pages {
                self.enqueue(&task, url);
            }
        }

        for (url, extension) in files {
            self.handle_file(url, &extension).await;
        }
    }

    /// Resolve links and split them into `(file, extension)` pairs and pages.
    fn partition(&self, base: &Url, links: Vec<String>) -> (Vec<(Url, String)>, Vec<Url>) {
        let mut files = Vec::new();
        let mut pages = Vec::new();

        for link in links {
            let Some(url) = resolve_url(base, &link) else {
                log::debug!("Unresolvable link {:?} on {}", link, base);
                continue;
            };
            if !is_http(&url) {
                continue;
            }

            match self.context.classifier.extension(url.path()) {
                Some(extension) => files.push((url, extension)),
                None => pages.push(url),
            }
        }

        (files, pages)
    }

    /// Push a child task for `url` if the domain policy allows it.
    fn enqueue(&self, parent: &CrawlTask, url: Url) {
        let ctx = &self.context;

        if !parent.follow_external && authority(&url) != parent.base_domain {
            log::debug!("Skipping external link {}", url);
            return;
        }
        if ctx.seen.contains(url.as_str()) {
            return;
        }
        let Some(child) = parent.child(url.into()) else {
            return;
        };

        match ctx.frontier.push(child) {
            Ok(()) => {}
            Err(e @ PushError::Full(_)) => {
                Counters::bump(&ctx.counters.dropped);
                log::warn!("Dropping link from {}: {}", parent.url, e);
            }
            Err(PushError::Closed) => {
                log::debug!("Frontier closed, dropping link from {}", parent.url);
            }
        }
    }

    async fn handle_file(&self, url: Url, extension: &str) {
        let ctx = &self.context;

        let Some(downloader) = &ctx.downloader else {
            let file_name = file_name_from_url(&url).unwrap_or_default();
            if ctx.stats.record(extension, url.as_str(), &file_name) {
                log::debug!("Found {} file {}", extension, url);
            }
            return;
        };

        if !ctx.seen.insert(url.as_str()) {
            log::debug!("Already downloaded {}", url);
            return;
        }

        match downloader.download(&url).await {
            Ok(StoreOutcome::Saved { .. }) => Counters::bump(&ctx.counters.saved),
            Ok(StoreOutcome::Duplicate { .. }) => Counters::bump(&ctx.counters.duplicates),
            Err(e) => {
                Counters::bump(&ctx.counters.failed);
                log::warn!("Failed to download {}: {}", url, e);
            }
        }
    }
}
