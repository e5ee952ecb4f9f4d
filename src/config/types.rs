use serde::Deserialize;

/// Main configuration structure for Product-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default, rename = "domain")]
    pub domains: Vec<DomainEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed URL
    pub max_depth: u32,

    /// Maximum number of pages fetched per domain
    pub max_pages: usize,

    /// Number of frontier entries dispatched per round
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of concurrent HTTP fetches
    pub fetch_concurrency: usize,

    /// Maximum number of concurrent render-based classifications
    pub render_concurrency: usize,

    /// Per-fetch timeout (milliseconds)
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Per-render timeout, covering load and evaluation (milliseconds)
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Response bodies are truncated past this size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Buffered product URLs that trigger a flush to storage
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,

    /// Render-based classifications allowed per domain; unlimited when unset.
    /// Candidates past the budget are treated as non-products without a render.
    #[serde(default)]
    pub max_renders: Option<usize>,
}

fn default_batch_size() -> usize {
    20
}

fn default_fetch_timeout_ms() -> u64 {
    15_000
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_flush_threshold() -> usize {
    50
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Product classifier configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClassifierConfig {
    /// Path segments that introduce a product detail path (`/product/<id>`)
    pub product_path_segments: Vec<String>,

    /// Query keys that carry a product identifier (`?pid=<id>`)
    pub product_query_keys: Vec<String>,

    /// Minimum structural score for a page to count as a product
    pub confidence_threshold: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            product_path_segments: ["product", "products", "item", "p", "pd", "dp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            product_query_keys: ["pid", "product_id", "productid", "sku", "itemid", "variant"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence_threshold: 60,
        }
    }
}

/// Which render service classifies candidate pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackendKind {
    /// Server HTML fetched over plain HTTP
    Http,
    /// Headless Chromium (requires the `chrome` feature)
    Chrome,
}

/// Subresource classes a browsing context may refuse to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Image,
    Font,
    Stylesheet,
    Media,
}

/// Render service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RenderConfig {
    pub backend: RenderBackendKind,
    pub blocked_resource_types: Vec<ResourceClass>,
    /// Analytics and tracking hosts whose requests are blocked
    pub blocked_hosts: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackendKind::Http,
            blocked_resource_types: vec![
                ResourceClass::Image,
                ResourceClass::Font,
                ResourceClass::Stylesheet,
                ResourceClass::Media,
            ],
            blocked_hosts: [
                "google-analytics.com",
                "googletagmanager.com",
                "doubleclick.net",
                "connect.facebook.net",
                "hotjar.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// A shop to crawl, with optional per-domain limits
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DomainEntry {
    /// Seed URL; its host is the crawl's target domain
    pub url: String,

    /// Overrides `crawler.max-depth`
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Overrides `crawler.max-pages`
    #[serde(default)]
    pub max_pages: Option<usize>,
}
