//! Product-Scout main entry point
//!
//! This is the command-line interface for the Product-Scout product page discoverer.

use anyhow::Context;
use clap::Parser;
use product_scout::config::{load_config_with_hash, Config};
use product_scout::crawler::{run_crawl, select_targets};
use product_scout::output::{load_statistics, print_crawl_report, print_statistics};
use product_scout::storage::open_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Product-Scout: an e-commerce product page discoverer
///
/// Product-Scout crawls each configured shop from its seed URL, classifies
/// discovered pages as product or navigation pages, and stores the product
/// URLs it confirms.
#[derive(Parser, Debug)]
#[command(name = "product-scout")]
#[command(version = "1.0.0")]
#[command(about = "An e-commerce product page discoverer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show per-domain product counts from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Only crawl the configured domain with this URL
    #[arg(long, value_name = "URL")]
    domain: Option<String>,

    /// Print every product URL found, not just the counts
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.domain.as_deref())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, cli.domain.as_deref(), cli.list).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_scout=info,warn"),
            1 => EnvFilter::new("product_scout=debug,info"),
            2 => EnvFilter::new("product_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, only_domain: Option<&str>) -> anyhow::Result<()> {
    println!("=== Product-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages per domain: {}", config.crawler.max_pages);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!(
        "  Concurrency: {} fetches, {} renders",
        config.crawler.fetch_concurrency, config.crawler.render_concurrency
    );
    println!(
        "  Timeouts: fetch {}ms, render {}ms",
        config.crawler.fetch_timeout_ms, config.crawler.render_timeout_ms
    );
    println!("  Flush threshold: {}", config.crawler.flush_threshold);
    match config.crawler.max_renders {
        Some(max) => println!("  Max renders per domain: {}", max),
        None => println!("  Max renders per domain: unlimited"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nClassifier:");
    println!(
        "  Product path segments: {}",
        config.classifier.product_path_segments.join(", ")
    );
    println!(
        "  Product query keys: {}",
        config.classifier.product_query_keys.join(", ")
    );
    println!(
        "  Confidence threshold: {}",
        config.classifier.confidence_threshold
    );

    println!("\nRender:");
    println!("  Backend: {:?}", config.render.backend);
    println!(
        "  Blocked resources: {:?}",
        config.render.blocked_resource_types
    );
    println!("  Blocked hosts: {}", config.render.blocked_hosts.join(", "));

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let targets = select_targets(config, only_domain)?;
    println!("\nDomains ({}):", targets.len());
    for target in &targets {
        println!(
            "  - {} (depth {}, pages {})",
            target.base_url, target.max_depth, target.max_pages
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} domains", targets.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, only_domain: Option<&str>, list: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Domains: {}, render backend: {:?}",
        config.domains.len(),
        config.render.backend
    );

    let reports = run_crawl(config, only_domain)
        .await
        .context("Crawl failed")?;

    tracing::info!("Crawl completed successfully");
    print_crawl_report(&reports, list);

    Ok(())
}
