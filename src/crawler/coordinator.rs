//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns everything one domain crawl needs and drives it in synchronous
//! rounds:
//! 1. Take a batch from the frontier (marked visited before dispatch)
//! 2. Fetch the batch concurrently and report each URL to the progress callback
//! 3. Extract in-domain links that the frontier has never seen
//! 4. Confirm products by URL pattern, render-classify the rest
//! 5. Enqueue non-products within the depth budget
//! 6. Flush buffered products once the threshold is reached
//!
//! Frontier state is only touched here, between rounds.

use crate::classifier::{ContentClassifier, PatternClassifier, ProductPatterns};
use crate::config::{Config, CrawlerConfig, DomainEntry, RenderBackendKind};
use crate::crawler::executor::{FetchPool, RenderPool};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::parser::parse_html;
use crate::crawler::persister::BatchPersister;
use crate::crawler::build_http_client;
use crate::render::{HttpRenderBackend, RenderBackend, RenderOptions};
use crate::storage::{open_storage, Storage, StorageError};
use crate::url::{normalize_url, url_in_domain};
use crate::{CrawlError, Result};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use url::Url;

/// One domain to crawl and its budget; immutable for the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub base_url: Url,
    pub max_depth: u32,
    pub max_pages: usize,
}

impl CrawlTarget {
    pub fn new(base_url: Url, max_depth: u32, max_pages: usize) -> Self {
        Self {
            base_url,
            max_depth,
            max_pages,
        }
    }

    /// Builds a target from a seed URL with the crawler-wide limits
    pub fn from_seed(seed: &str, defaults: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(
            normalize_url(seed)?,
            defaults.max_depth,
            defaults.max_pages,
        ))
    }

    /// Builds a target from a `[[domain]]` entry, applying its overrides
    pub fn from_entry(entry: &DomainEntry, defaults: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(
            normalize_url(&entry.url)?,
            entry.max_depth.unwrap_or(defaults.max_depth),
            entry.max_pages.unwrap_or(defaults.max_pages),
        ))
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<B: RenderBackend, S: Storage> {
    target: CrawlTarget,
    batch_size: usize,
    flush_threshold: usize,
    max_renders: Option<usize>,
    fetch_pool: FetchPool,
    render_pool: RenderPool,
    backend: B,
    patterns: PatternClassifier,
    storage: Arc<Mutex<S>>,
}

impl<B: RenderBackend, S: Storage> Coordinator<B, S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `target` - The domain to crawl
    /// * `backend` - Render backend, owned for the lifetime of the coordinator
    /// * `storage` - Storage shared with other coordinators of the same process
    pub fn new(
        config: &Config,
        target: CrawlTarget,
        backend: B,
        storage: Arc<Mutex<S>>,
    ) -> Result<Self> {
        let client = build_http_client(&config.user_agent)?;
        let render_options =
            RenderOptions::from_config(&config.render, config.crawler.render_timeout_ms);

        Ok(Self {
            target,
            batch_size: config.crawler.batch_size.max(1),
            flush_threshold: config.crawler.flush_threshold,
            max_renders: config.crawler.max_renders,
            fetch_pool: FetchPool::from_config(client, &config.crawler),
            render_pool: RenderPool::new(
                config.crawler.render_concurrency,
                render_options,
                ContentClassifier::from_config(&config.classifier),
            ),
            backend,
            patterns: PatternClassifier::new(ProductPatterns::from_config(&config.classifier)),
            storage,
        })
    }

    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gives the render backend back, e.g. to shut a browser down
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Runs the crawl loop until the frontier drains or the page budget is spent
    ///
    /// `on_url_visited` is called once for every URL actually fetched. Returns the confirmed
    /// product URLs, sorted.
    pub async fn crawl<F: FnMut(&Url)>(&mut self, mut on_url_visited: F) -> Result<Vec<Url>> {
        let base_url = self.target.base_url.clone();
        let max_depth = self.target.max_depth;
        let max_pages = self.target.max_pages;

        let domain_id = self
            .storage
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .upsert_domain(base_url.as_str())?;

        tracing::info!(
            "Crawling {} (max depth {}, max pages {}, render backend {})",
            base_url,
            max_depth,
            max_pages,
            self.backend.name()
        );

        let mut frontier = Frontier::new(base_url.clone());
        let mut persister = BatchPersister::new(domain_id, self.flush_threshold);
        let start_time = Instant::now();
        let mut round = 0;
        let mut renders_used = 0;

        while frontier.has_pending() && frontier.fetched_len() < max_pages {
            round += 1;
            let budget = self.batch_size.min(max_pages - frontier.fetched_len());
            let batch = frontier.next_batch(budget)?;
            let urls: Vec<Url> = batch.iter().map(|entry| entry.url.clone()).collect();

            let outcomes = self.fetch_pool.fetch_batch(&urls).await;

            // Collect never-seen in-domain links, deduplicated within the round
            let mut candidates: Vec<FrontierEntry> = Vec::new();
            let mut in_round: HashSet<Url> = HashSet::new();
            for (entry, outcome) in batch.iter().zip(outcomes) {
                frontier.settle(&entry.url)?;
                on_url_visited(&entry.url);

                if !outcome.success {
                    continue;
                }

                let parsed = parse_html(&outcome.html, outcome.base_url());
                tracing::debug!(
                    "Fetched {} (depth {}, {} links, title {:?})",
                    entry.url,
                    entry.depth,
                    parsed.links.len(),
                    parsed.title
                );

                for link in parsed.links {
                    if !url_in_domain(&link, &base_url) || frontier.is_known(&link) {
                        continue;
                    }
                    if in_round.insert(link.clone()) {
                        candidates.push(FrontierEntry::new(link, entry.depth + 1));
                    }
                }
            }

            // Pattern fast-path
            let mut unconfirmed: Vec<FrontierEntry> = Vec::new();
            let mut by_pattern = 0;
            for candidate in candidates {
                if self.patterns.is_likely_product(&candidate.url) {
                    persister.record(&candidate.url);
                    frontier.mark_product(candidate.url)?;
                    by_pattern += 1;
                } else {
                    unconfirmed.push(candidate);
                }
            }

            // Render slow-path, within the render budget
            let renderable = match self.max_renders {
                Some(max) => max.saturating_sub(renders_used).min(unconfirmed.len()),
                None => unconfirmed.len(),
            };
            if renderable < unconfirmed.len() {
                tracing::debug!(
                    "Render budget spent, {} candidates left unclassified",
                    unconfirmed.len() - renderable
                );
            }
            let render_urls: Vec<Url> = unconfirmed[..renderable]
                .iter()
                .map(|c| c.url.clone())
                .collect();
            let verdicts = self
                .render_pool
                .classify_batch(&self.backend, &render_urls)
                .await;
            renders_used += render_urls.len();

            // unrendered candidates count as non-products
            let mut verdicts = verdicts.into_iter().map(|(_, is_product)| is_product);
            let mut by_render = 0;
            for candidate in unconfirmed {
                let is_product = verdicts.next().unwrap_or(false);
                if is_product {
                    persister.record(&candidate.url);
                    frontier.mark_product(candidate.url)?;
                    by_render += 1;
                } else if candidate.depth <= max_depth {
                    frontier.enqueue(candidate)?;
                } else {
                    frontier.mark_seen(candidate.url);
                }
            }

            if persister.should_flush() {
                persister.flush(&*self.storage);
            }

            tracing::info!(
                "Round {}: fetched {}, products +{} by pattern +{} by render, {} pending, {} fetched total",
                round,
                urls.len(),
                by_pattern,
                by_render,
                frontier.pending_len(),
                frontier.fetched_len()
            );
        }

        if !persister.flush(&*self.storage) {
            tracing::warn!(
                "{} product URLs for {} could not be persisted",
                persister.unflushed(),
                base_url
            );
        }

        let products = frontier.products();
        tracing::info!(
            "Finished {}: {} pages fetched, {} products, {} rounds in {:?}",
            base_url,
            frontier.fetched_len(),
            products.len(),
            round,
            start_time.elapsed()
        );

        Ok(products)
    }
}

/// Summary of one domain's crawl
#[derive(Debug, Clone)]
pub struct DomainReport {
    pub target: CrawlTarget,
    pub pages_fetched: usize,
    pub products: Vec<Url>,
}

/// Crawls a single seed URL with the crawler-wide limits
///
/// # Example
///
/// ```no_run
/// use product_scout::config::load_config;
/// use product_scout::render::HttpRenderBackend;
/// use product_scout::storage::SqliteStorage;
/// use std::path::Path;
/// use std::sync::{Arc, Mutex};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let client = product_scout::crawler::build_http_client(&config.user_agent)?;
/// let backend = HttpRenderBackend::new(client, config.crawler.max_body_bytes);
/// let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory()?));
///
/// let products = product_scout::crawl(&config, "https://shop.example/", backend, storage, |url| {
///     println!("visited {}", url);
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn crawl<B, S, F>(
    config: &Config,
    seed: &str,
    backend: B,
    storage: Arc<Mutex<S>>,
    on_url_visited: F,
) -> Result<Vec<Url>>
where
    B: RenderBackend,
    S: Storage,
    F: FnMut(&Url),
{
    let target = CrawlTarget::from_seed(seed, &config.crawler)?;
    let mut coordinator = Coordinator::new(config, target, backend, storage)?;
    coordinator.crawl(on_url_visited).await
}

/// Crawls the configured domains in order, sharing one backend and one database
///
/// `only_domain` restricts the run to the entry whose URL normalizes to the same value.
pub async fn run_crawl(config: &Config, only_domain: Option<&str>) -> Result<Vec<DomainReport>> {
    let storage = Arc::new(Mutex::new(open_storage(Path::new(
        &config.output.database_path,
    ))?));
    let targets = select_targets(config, only_domain)?;

    match config.render.backend {
        RenderBackendKind::Http => {
            let client = build_http_client(&config.user_agent)?;
            let backend = HttpRenderBackend::new(client, config.crawler.max_body_bytes);
            let (reports, _) = crawl_targets(config, targets, backend, storage).await?;
            Ok(reports)
        }
        #[cfg(feature = "chrome")]
        RenderBackendKind::Chrome => {
            let backend = crate::render::ChromeRenderBackend::new();
            let (reports, backend) = crawl_targets(config, targets, backend, storage).await?;
            backend.shutdown().await;
            Ok(reports)
        }
        #[cfg(not(feature = "chrome"))]
        RenderBackendKind::Chrome => Err(CrawlError::Config(crate::ConfigError::Validation(
            "render backend \"chrome\" requires the `chrome` feature".to_string(),
        ))),
    }
}

/// Resolves the configured domains into crawl targets
pub fn select_targets(config: &Config, only_domain: Option<&str>) -> Result<Vec<CrawlTarget>> {
    let wanted = only_domain.map(normalize_url).transpose()?;

    let targets: Vec<CrawlTarget> = config
        .domains
        .iter()
        .map(|entry| CrawlTarget::from_entry(entry, &config.crawler))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .filter(|target| wanted.as_ref().map_or(true, |w| *w == target.base_url))
        .collect();

    if let (Some(wanted), true) = (wanted, targets.is_empty()) {
        return Err(CrawlError::Config(crate::ConfigError::InvalidUrl(format!(
            "{} is not a configured domain",
            wanted
        ))));
    }

    Ok(targets)
}

async fn crawl_targets<B: RenderBackend, S: Storage>(
    config: &Config,
    targets: Vec<CrawlTarget>,
    mut backend: B,
    storage: Arc<Mutex<S>>,
) -> Result<(Vec<DomainReport>, B)> {
    let mut reports = Vec::with_capacity(targets.len());

    for target in targets {
        let mut coordinator = Coordinator::new(config, target.clone(), backend, storage.clone())?;
        let mut pages_fetched = 0;
        let products = coordinator
            .crawl(|url| {
                pages_fetched += 1;
                tracing::debug!("Visited [{}] {}", pages_fetched, url);
            })
            .await?;
        backend = coordinator.into_backend();

        reports.push(DomainReport {
            target,
            pages_fetched,
            products,
        });
    }

    Ok((reports, backend))
}
