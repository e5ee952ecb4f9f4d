//! HTML parser for extracting links
//!
//! Links are resolved and canonicalised here, so every URL leaving this module is an
//! absolute http(s) URL in the form used as a frontier key.

use crate::url::resolve;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from a fetched page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All followable links on the page, canonicalised
    pub links: HashSet<Url>,
}

/// Parses HTML content and extracts links and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:`, `data:` references
/// - Fragment-only references
/// - Anything that does not resolve to http(s)
///
/// # Example
///
/// ```
/// use product_scout::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: links_in(&document, base_url),
    }
}

/// Extracts the set of followable links from `html`
pub fn extract_links(html: &str, base_url: &Url) -> HashSet<Url> {
    links_in(&Html::parse_document(html), base_url)
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn links_in(document: &Html, base_url: &Url) -> HashSet<Url> {
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                push_resolved(&mut links, href, base_url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                push_resolved(&mut links, href, base_url);
            }
        }
    }

    links
}

fn push_resolved(links: &mut HashSet<Url>, href: &str, base_url: &Url) {
    match resolve(href, base_url) {
        Ok(url) => {
            links.insert(url);
        }
        Err(e) => tracing::trace!("Dropping link {:?}: {}", href, e),
    }
}
