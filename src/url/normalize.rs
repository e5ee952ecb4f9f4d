use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "_ga"];

/// Reference prefixes that never lead to a crawlable page
const EXCLUDED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes an absolute URL into the canonical form used as a crawl key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Lowercase the host
/// 4. Normalize path:
///    - Remove dot segments and repeated slashes
///    - Remove trailing slash (except for root /)
/// 5. Remove fragment
/// 6. Remove tracking query parameters and sort the rest
///
/// # Examples
///
/// ```
/// use product_scout::url::normalize_url;
///
/// let url = normalize_url("https://SHOP.example/cat/shoes/?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "https://shop.example/cat/shoes");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Resolves a possibly-relative reference against a base URL
///
/// The result is canonicalized with the same rules as [`normalize_url`]. References that are
/// empty, fragment-only, use a non-navigational scheme, or resolve to something other than
/// http(s) are rejected.
///
/// # Examples
///
/// ```
/// use product_scout::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example/cat/").unwrap();
/// assert_eq!(
///     resolve("../product/42", &base).unwrap().as_str(),
///     "https://shop.example/product/42"
/// );
/// assert!(resolve("mailto:sales@shop.example", &base).is_err());
/// ```
pub fn resolve(href: &str, base_url: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Excluded(href.to_string()));
    }

    let lowered = href.to_ascii_lowercase();
    if EXCLUDED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return Err(UrlError::Excluded(href.to_string()));
    }

    let joined = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(joined)
}

fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .map(|h| h.to_lowercase())
        .ok_or(UrlError::MissingDomain)?;
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
