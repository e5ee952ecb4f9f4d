use crate::url::matcher::host_matches;
use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use product_scout::url::extract_domain;
///
/// let url = Url::parse("https://SHOP.example/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("shop.example".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Decides whether a URL is in the crawl's target domain
///
/// True iff the URL parses, is http(s), and its host equals the target's host or is a strict
/// subdomain of it. Malformed URLs never match.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use product_scout::url::in_domain;
///
/// let target = Url::parse("https://shop.example/").unwrap();
/// assert!(in_domain("https://www.shop.example/product/1", &target));
/// assert!(!in_domain("https://other.example/", &target));
/// assert!(!in_domain("::not a url::", &target));
/// ```
pub fn in_domain(url: &str, target: &Url) -> bool {
    match Url::parse(url) {
        Ok(parsed) => url_in_domain(&parsed, target),
        Err(_) => false,
    }
}

/// Same as [`in_domain`] for an already-parsed URL
pub fn url_in_domain(url: &Url, target: &Url) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match (extract_domain(url), extract_domain(target)) {
        (Some(host), Some(target_host)) => host_matches(&host, &target_host),
        _ => false,
    }
}
