// src/services/links.rs

//! Link extraction from fetched HTML documents.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

/// Which attribute carries the link for each tag of interest.
const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("link", "href"),
    ("img", "src"),
    ("script", "src"),
];

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href], link[href], img[src], script[src]")
        .expect("link selector is valid CSS")
});

/// Stylesheets and scripts, optionally followed by a query or fragment.
static ASSET_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:css|js)(?:[?#].*)?$").expect("asset pattern is a valid regex")
});

/// Whether a `Content-Type` header announces an HTML document.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Links that never lead anywhere useful.
fn is_noise(link: &str) -> bool {
    link.get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        || ASSET_NOISE.is_match(link)
}

/// Collect raw link strings from an HTML document in document order.
///
/// Links may be relative. Malformed markup yields whatever html5ever recovers.
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| {
            let tag = element.value().name();
            let attr = LINK_ATTRIBUTES
                .iter()
                .find(|(name, _)| *name == tag)
                .map(|(_, attr)| *attr)?;
            element.value().attr(attr)
        })
        .map(str::trim)
        .filter(|link| !link.is_empty() && !is_noise(link))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_link_carrying_tags() {
        let html = r#"
            <html><head>
              <link rel="icon" href="/favicon.png">
              <script src="/app.js"></script>
            </head><body>
              <a href="/about">About</a>
              <img src="photo.jpg">
              <a href="docs/report.pdf">Report</a>
              <iframe src="/ignored"></iframe>
              <img data-src="/also-ignored.png">
            </body></html>
        "#;

        assert_eq!(
            extract_links(html),
            vec!["/favicon.png", "/about", "photo.jpg", "docs/report.pdf"]
        );
    }

    #[test]
    fn drops_scripts_styles_and_javascript_links() {
        let html = r#"
            <link rel="stylesheet" href="/main.css?v=3">
            <script src="bundle.JS#x"></script>
            <a href="JavaScript:void(0)">noop</a>
            <a href="  ">blank</a>
            <a href="/style.css.pdf">tricky</a>
        "#;

        assert_eq!(extract_links(html), vec!["/style.css.pdf"]);
    }

    #[test]
    fn tolerates_malformed_markup() {
        let html = r#"<div><a href="/one">one<p><a href="/two">two</div></span><img src="x.png""#;
        let links = extract_links(html);
        assert!(links.contains(&"/one".to_string()));
        assert!(links.contains(&"/two".to_string()));
    }

    #[test]
    fn html_content_types() {
        assert!(is_html_content_type(Some("text/html")));
        assert!(is_html_content_type(Some("text/HTML; charset=utf-8")));
        assert!(is_html_content_type(Some("application/xhtml+xml")));
        assert!(!is_html_content_type(Some("application/pdf")));
        assert!(!is_html_content_type(Some("image/png")));
        assert!(!is_html_content_type(None));
    }
}
