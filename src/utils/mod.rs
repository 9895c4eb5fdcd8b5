//! Utility functions and helpers.

pub mod http;

use url::{Position, Url};

use crate::error::{AppError, Result};

/// Resolve a potentially relative URL against a base URL.
///
/// The fragment is dropped so that `page#a` and `page#b` name the same page.
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

/// Whether the URL uses a scheme the crawler can fetch.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Host and explicit port of a URL, lower-cased by the parser.
pub fn authority(url: &Url) -> &str {
    &url[Position::BeforeHost..Position::AfterPort]
}

/// Last non-empty path segment of a URL, if any.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}

/// Parse and check a seed URL: `http`/`https` with a host.
pub fn validate_seed(seed: &str) -> Result<Url> {
    let url = Url::parse(seed.trim())
        .map_err(|e| AppError::config(format!("invalid seed URL '{seed}': {e}")))?;

    if !is_http(&url) {
        return Err(AppError::config(format!(
            "seed URL must use http or https: {seed}"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::config(format!("seed URL has no host: {seed}")));
    }

    Ok(url)
}
