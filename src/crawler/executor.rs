//! Bounded worker pools for one crawl round
//!
//! Fetches and render-based classifications run in separate pools, each capped by its own
//! semaphore. A round submits its whole batch and awaits every item before returning, so the
//! coordinator only ever sees complete rounds.

use crate::classifier::ContentClassifier;
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_url, FetchOutcome};
use crate::render::{BrowsingContext, RenderBackend, RenderError, RenderOptions};
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Concurrency-bounded HTTP fetch pool
pub struct FetchPool {
    client: Client,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    max_bytes: usize,
}

impl FetchPool {
    pub fn new(client: Client, concurrency: usize, timeout: Duration, max_bytes: usize) -> Self {
        Self {
            client,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            timeout,
            max_bytes,
        }
    }

    pub fn from_config(client: Client, config: &CrawlerConfig) -> Self {
        Self::new(
            client,
            config.fetch_concurrency,
            Duration::from_millis(config.fetch_timeout_ms),
            config.max_body_bytes,
        )
    }

    /// Fetches every URL, at most `concurrency` at a time; outcomes follow input order
    pub async fn fetch_batch(&self, urls: &[Url]) -> Vec<FetchOutcome> {
        let fetches = urls.iter().map(|url| async move {
            let _permit = self.semaphore.acquire().await;
            fetch_url(&self.client, url, self.timeout, self.max_bytes).await
        });
        join_all(fetches).await
    }
}

/// Concurrency-bounded render-and-classify pool
pub struct RenderPool {
    semaphore: Arc<Semaphore>,
    options: RenderOptions,
    classifier: ContentClassifier,
}

impl RenderPool {
    pub fn new(concurrency: usize, options: RenderOptions, classifier: ContentClassifier) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            options,
            classifier,
        }
    }

    /// Classifies every URL; any failure counts as "not a product"
    pub async fn classify_batch<B: RenderBackend>(
        &self,
        backend: &B,
        urls: &[Url],
    ) -> Vec<(Url, bool)> {
        let checks = urls.iter().map(|url| async move {
            let is_product = self.classify_one(backend, url).await;
            (url.clone(), is_product)
        });
        join_all(checks).await
    }

    async fn classify_one<B: RenderBackend>(&self, backend: &B, url: &Url) -> bool {
        let _permit = self.semaphore.acquire().await;

        let mut context = match backend.acquire().await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!("Could not acquire {} context for {}: {}", backend.name(), url, e);
                return false;
            }
        };

        let checked = tokio::time::timeout(self.options.timeout, async {
            context.render(url, &self.options).await?;
            let html = context.document().await?;
            Ok::<_, RenderError>(self.classifier.classify(&html, url))
        })
        .await;

        // released on every path, including timeout
        context.release().await;

        match checked {
            Ok(Ok(verdict)) => {
                tracing::debug!(
                    "Rendered {}: product={} score={}",
                    url,
                    verdict.is_product,
                    verdict.score
                );
                verdict.is_product
            }
            Ok(Err(e)) => {
                tracing::warn!("Render failed for {}: {}", url, e);
                false
            }
            Err(_) => {
                tracing::warn!(
                    "Render failed for {}: {}",
                    url,
                    RenderError::Timeout(self.options.timeout)
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderResult;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PRODUCT_HTML: &str = r#"<script type="application/ld+json">{"@type": "Product"}</script>"#;
    const PLAIN_HTML: &str = "<h1>About us</h1>";

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        released: AtomicUsize,
        in_use: AtomicUsize,
        peak: AtomicUsize,
    }

    struct MockBackend {
        pages: HashMap<String, String>,
        delay: Duration,
        counters: Arc<Counters>,
    }

    struct MockContext {
        pages: HashMap<String, String>,
        delay: Duration,
        counters: Arc<Counters>,
        document: Option<String>,
    }

    impl MockBackend {
        fn new(pages: &[(&str, &str)], delay: Duration) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.to_string()))
                    .collect(),
                delay,
                counters: Arc::new(Counters::default()),
            }
        }
    }

    impl BrowsingContext for MockContext {
        async fn render(&mut self, url: &Url, _options: &RenderOptions) -> RenderResult<()> {
            tokio::time::sleep(self.delay).await;
            match self.pages.get(url.as_str()) {
                Some(html) => {
                    self.document = Some(html.clone());
                    Ok(())
                }
                None => Err(RenderError::Navigation(format!("404 {}", url))),
            }
        }

        async fn document(&self) -> RenderResult<String> {
            self.document
                .clone()
                .ok_or_else(|| RenderError::Backend("empty".to_string()))
        }

        async fn release(self) {
            self.counters.in_use.fetch_sub(1, Ordering::SeqCst);
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl RenderBackend for MockBackend {
        type Context = MockContext;

        async fn acquire(&self) -> RenderResult<MockContext> {
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
            let now = self.counters.in_use.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.peak.fetch_max(now, Ordering::SeqCst);
            Ok(MockContext {
                pages: self.pages.clone(),
                delay: self.delay,
                counters: self.counters.clone(),
                document: None,
            })
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn pool(concurrency: usize, timeout: Duration) -> RenderPool {
        let options = RenderOptions {
            timeout,
            ..RenderOptions::default()
        };
        RenderPool::new(concurrency, options, ContentClassifier::default())
    }

    #[tokio::test]
    async fn test_classify_batch_verdicts_and_release() {
        let backend = MockBackend::new(
            &[
                ("https://shop.example/lamp", PRODUCT_HTML),
                ("https://shop.example/about", PLAIN_HTML),
            ],
            Duration::from_millis(0),
        );
        let urls = vec![
            url("https://shop.example/lamp"),
            url("https://shop.example/about"),
            url("https://shop.example/gone"),
        ];

        let results = pool(2, Duration::from_secs(1))
            .classify_batch(&backend, &urls)
            .await;

        assert_eq!(
            results,
            vec![
                (urls[0].clone(), true),
                (urls[1].clone(), false),
                (urls[2].clone(), false),
            ]
        );
        assert_eq!(backend.counters.acquired.load(Ordering::SeqCst), 3);
        assert_eq!(backend.counters.released.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_negative_and_still_releases() {
        let backend = MockBackend::new(
            &[("https://shop.example/lamp", PRODUCT_HTML)],
            Duration::from_millis(500),
        );
        let urls = vec![url("https://shop.example/lamp")];

        let results = pool(1, Duration::from_millis(50))
            .classify_batch(&backend, &urls)
            .await;

        assert_eq!(results, vec![(urls[0].clone(), false)]);
        assert_eq!(backend.counters.released.load(Ordering::SeqCst), 1);
        assert_eq!(backend.counters.in_use.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_render_concurrency_is_bounded() {
        let pages: Vec<(String, String)> = (0..6)
            .map(|i| (format!("https://shop.example/c/{}", i), PLAIN_HTML.to_string()))
            .collect();
        let refs: Vec<(&str, &str)> = pages
            .iter()
            .map(|(u, h)| (u.as_str(), h.as_str()))
            .collect();
        let backend = MockBackend::new(&refs, Duration::from_millis(20));
        let urls: Vec<Url> = pages.iter().map(|(u, _)| url(u)).collect();

        pool(2, Duration::from_secs(1))
            .classify_batch(&backend, &urls)
            .await;

        assert!(backend.counters.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(backend.counters.released.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_fetch_batch_keeps_order_and_isolates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetch_pool = FetchPool::new(Client::new(), 2, Duration::from_secs(2), 1024);
        let urls = vec![
            url(&format!("{}/ok", server.uri())),
            url(&format!("{}/down", server.uri())),
            url(&format!("{}/ok", server.uri())),
        ];

        let outcomes = fetch_pool.fetch_batch(&urls).await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[2].success);
        assert_eq!(outcomes[1].url, urls[1]);
    }
}
