//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock shops and run the full crawl cycle
//! end-to-end: fetch, link extraction, pattern and render classification,
//! and batched persistence.

use product_scout::config::{
    ClassifierConfig, Config, CrawlerConfig, DomainEntry, OutputConfig, RenderConfig,
    UserAgentConfig,
};
use product_scout::crawler::run_crawl;
use product_scout::render::HttpRenderBackend;
use product_scout::storage::{SqliteStorage, Storage};
use product_scout::{crawl, Coordinator, CrawlTarget};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seeds`
fn create_test_config(seeds: &[String], db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth: 2,
            max_pages: 50,
            batch_size: 10,
            fetch_concurrency: 4,
            render_concurrency: 2,
            fetch_timeout_ms: 2_000,
            render_timeout_ms: 2_000,
            max_body_bytes: 64 * 1024,
            flush_threshold: 1,
            max_renders: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestScout".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        classifier: ClassifierConfig::default(),
        render: RenderConfig::default(),
        domains: seeds
            .iter()
            .map(|url| DomainEntry {
                url: url.clone(),
                max_depth: None,
                max_pages: None,
            })
            .collect(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Shop</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, p: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn http_backend(config: &Config) -> HttpRenderBackend {
    let client = product_scout::crawler::build_http_client(&config.user_agent)
        .expect("Failed to build client");
    HttpRenderBackend::new(client, config.crawler.max_body_bytes)
}

fn memory_storage() -> Arc<Mutex<SqliteStorage>> {
    Arc::new(Mutex::new(
        SqliteStorage::new_in_memory().expect("Failed to open in-memory database"),
    ))
}

fn paths(urls: &[Url]) -> Vec<String> {
    let mut paths: Vec<String> = urls.iter().map(|u| u.path().to_string()).collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_pattern_match_skips_render_and_fetch() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a>
           <a href="/product/42">Boot</a>
           <a href="/cat/shoes">Shoes</a>"#,
    )
    .await;
    mount_page(&server, "/about", "<h1>About us</h1><p>Since 1952.</p>").await;
    mount_page(&server, "/cat/shoes", "<h1>Shoes</h1>").await;
    Mock::given(method("GET"))
        .and(path("/product/42"))
        .respond_with(html("<h1>Boot</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&[seed.clone()], ":memory:");
    let storage = memory_storage();
    let mut visited = Vec::new();

    let products = crawl(&config, &seed, http_backend(&config), storage.clone(), |url| {
        visited.push(url.clone())
    })
    .await
    .expect("Crawl failed");

    assert_eq!(paths(&products), vec!["/product/42".to_string()]);
    assert_eq!(
        paths(&visited),
        vec![
            "/".to_string(),
            "/about".to_string(),
            "/cat/shoes".to_string()
        ]
    );

    let storage = storage.lock().unwrap();
    let domain = storage.get_domain(&seed).unwrap().expect("domain upserted");
    let stored = storage.get_product_urls(domain.id).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].url.ends_with("/product/42"));
}

#[tokio::test]
async fn test_structured_data_page_is_a_product() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<a href="/kettle-classic">Kettle</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/kettle-classic"))
        .respond_with(html(
            r#"<script type="application/ld+json">
                {"@context": "https://schema.org", "@type": "Product", "name": "Kettle"}
               </script>
               <a href="/accessories">Accessories</a>"#,
        ))
        .expect(1) // rendered once, never fetched for links
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accessories"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&[seed.clone()], ":memory:");
    let mut visited = Vec::new();

    let products = crawl(&config, &seed, http_backend(&config), memory_storage(), |url| {
        visited.push(url.clone())
    })
    .await
    .expect("Crawl failed");

    assert_eq!(paths(&products), vec!["/kettle-classic".to_string()]);
    assert_eq!(paths(&visited), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_structural_score_decides_without_metadata() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<a href="/espresso-machine">Espresso</a><a href="/our-story">Story</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/espresso-machine",
        r#"<h1>Espresso Machine</h1>
           <span class="price">$349.00</span>
           <button>Add to Cart</button>"#,
    )
    .await;
    mount_page(
        &server,
        "/our-story",
        r#"<h1>Our story</h1><div class="product-description">We love coffee.</div>"#,
    )
    .await;

    let config = create_test_config(&[seed.clone()], ":memory:");
    let mut visited = Vec::new();

    let products = crawl(&config, &seed, http_backend(&config), memory_storage(), |url| {
        visited.push(url.clone())
    })
    .await
    .expect("Crawl failed");

    assert_eq!(paths(&products), vec!["/espresso-machine".to_string()]);
    assert!(visited.iter().any(|u| u.path() == "/our-story"));
    assert!(!visited.iter().any(|u| u.path() == "/espresso-machine"));
}

#[tokio::test]
async fn test_fetch_timeout_is_local_to_the_url() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<a href="/slow">Slow</a><a href="/fast">Fast</a>"#).await;
    mount_page(&server, "/fast", "<p>quick</p>").await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(r#"<a href="/hidden">Hidden</a>"#).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&[seed.clone()], ":memory:");
    config.crawler.fetch_timeout_ms = 200;
    config.crawler.render_timeout_ms = 200;
    let mut visited = Vec::new();

    let products = crawl(&config, &seed, http_backend(&config), memory_storage(), |url| {
        visited.push(url.clone())
    })
    .await
    .expect("A timed-out fetch must not fail the run");

    assert!(products.is_empty());
    assert_eq!(
        paths(&visited),
        vec!["/".to_string(), "/fast".to_string(), "/slow".to_string()]
    );
}

#[tokio::test]
async fn test_recrawl_keeps_one_row_per_product() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<a href="/p/red-boot">Red</a><a href="/p/blue-boot">Blue</a><a href="/item/3?utm_source=x">3</a>"#,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scout.db");
    let config = create_test_config(&[seed.clone()], db_path.to_str().unwrap());

    let mut runs = Vec::new();
    for _ in 0..2 {
        let storage = Arc::new(Mutex::new(SqliteStorage::new(&db_path).unwrap()));
        let target = CrawlTarget::from_seed(&seed, &config.crawler).unwrap();
        let mut coordinator =
            Coordinator::new(&config, target, http_backend(&config), storage).unwrap();
        runs.push(coordinator.crawl(|_| {}).await.expect("Crawl failed"));
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].len(), 3);

    let storage = SqliteStorage::new(&db_path).unwrap();
    let domains = storage.list_domains().unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(storage.count_product_urls(domains[0].id).unwrap(), 3);
}

#[tokio::test]
async fn test_run_crawl_over_configured_domains() {
    let shop_a = MockServer::start().await;
    let shop_b = MockServer::start().await;
    mount_page(&shop_a, "/", r#"<a href="/product/1">1</a>"#).await;
    mount_page(&shop_b, "/", r#"<a href="/view?pid=9">9</a><a href="/help">Help</a>"#).await;
    mount_page(&shop_b, "/help", "<h1>Help</h1>").await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scout.db");
    let seeds = vec![format!("{}/", shop_a.uri()), format!("{}/", shop_b.uri())];
    let config = create_test_config(&seeds, db_path.to_str().unwrap());

    let reports = run_crawl(&config, None).await.expect("Crawl failed");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].products.len(), 1);
    assert_eq!(reports[0].pages_fetched, 1);
    assert_eq!(reports[1].products.len(), 1);
    assert_eq!(reports[1].pages_fetched, 2);

    let only_b = run_crawl(&config, Some(seeds[1].as_str())).await.expect("Crawl failed");
    assert_eq!(only_b.len(), 1);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.list_domains().unwrap().len(), 2);
}
