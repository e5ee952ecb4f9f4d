//! URL-shape product detection
//!
//! The pattern fast-path flags product detail URLs without fetching anything. It is tuned
//! for precision: a miss just sends the URL to the render-based classifier.

use crate::config::ClassifierConfig;
use std::collections::HashMap;
use url::Url;

/// Product URL conventions: path segments and identifier query keys
#[derive(Debug, Clone)]
pub struct ProductPatterns {
    path_segments: Vec<String>,
    query_keys: Vec<String>,
}

impl ProductPatterns {
    pub fn new<S: AsRef<str>>(path_segments: &[S], query_keys: &[S]) -> Self {
        Self {
            path_segments: path_segments
                .iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            query_keys: query_keys
                .iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.product_path_segments, &config.product_query_keys)
    }

    /// True if a product segment is followed by at least one more path segment
    ///
    /// `/product/42` and `/shop/p/blue-shirt` match; `/products` alone is a listing.
    pub fn matches_path(&self, url: &Url) -> bool {
        let segments: Vec<String> = url
            .path_segments()
            .map(|s| {
                s.filter(|seg| !seg.is_empty())
                    .map(|seg| seg.to_lowercase())
                    .collect()
            })
            .unwrap_or_default();

        segments
            .iter()
            .enumerate()
            .any(|(i, seg)| i + 1 < segments.len() && self.path_segments.contains(seg))
    }

    /// True if the query carries a non-empty product identifier
    pub fn matches_query(&self, url: &Url) -> bool {
        url.query_pairs().any(|(key, value)| {
            !value.is_empty() && self.query_keys.contains(&key.to_lowercase())
        })
    }

    pub fn matches(&self, url: &Url) -> bool {
        self.matches_path(url) || self.matches_query(url)
    }
}

impl Default for ProductPatterns {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

/// Memoized pattern classifier, one instance per crawl run
#[derive(Debug)]
pub struct PatternClassifier {
    patterns: ProductPatterns,
    cache: HashMap<String, bool>,
    evaluations: u64,
}

impl PatternClassifier {
    pub fn new(patterns: ProductPatterns) -> Self {
        Self {
            patterns,
            cache: HashMap::new(),
            evaluations: 0,
        }
    }

    /// Returns the cached verdict for `url`, evaluating the pattern set on first sight only
    pub fn is_likely_product(&mut self, url: &Url) -> bool {
        if let Some(&verdict) = self.cache.get(url.as_str()) {
            return verdict;
        }

        self.evaluations += 1;
        let verdict = self.patterns.matches(url);
        self.cache.insert(url.as_str().to_string(), verdict);
        verdict
    }

    /// Number of times the pattern set was actually evaluated
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn patterns(&self) -> &ProductPatterns {
        &self.patterns
    }
}
