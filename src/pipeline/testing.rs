//! In-memory `Fetcher` for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::utils::http::{FetchedPage, Fetcher};

/// Serves canned responses and records every URL it was asked for.
#[derive(Debug, Default)]
pub struct MockFetcher {
    responses: HashMap<String, FetchedPage>,
    log: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.respond(url, Some("text/html; charset=utf-8"), html.as_bytes())
    }

    pub fn file(self, url: &str, bytes: &[u8]) -> Self {
        self.respond(url, Some("application/octet-stream"), bytes)
    }

    pub fn respond(mut self, url: &str, content_type: Option<&str>, body: &[u8]) -> Self {
        self.responses.insert(
            url.to_string(),
            FetchedPage {
                url: url.to_string(),
                content_type: content_type.map(str::to_string),
                body: body.to_vec(),
            },
        );
        self
    }

    /// Every URL fetched so far, in request order.
    pub fn fetched(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.log.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
