//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! per-domain product counts from the storage layer.

use crate::storage::Storage;
use crate::CrawlError;

/// Product count for one crawled domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStatistics {
    pub url: String,
    pub last_crawled_at: String,
    pub product_urls: u64,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// One entry per domain, ordered by URL
    pub domains: Vec<DomainStatistics>,

    /// Product URLs across all domains
    pub total_product_urls: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(CrawlError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, CrawlError> {
    let mut stats = CrawlStatistics::default();

    for domain in storage.list_domains()? {
        let product_urls = storage.count_product_urls(domain.id)?;
        stats.total_product_urls += product_urls;
        stats.domains.push(DomainStatistics {
            url: domain.url,
            last_crawled_at: domain.last_crawled_at,
            product_urls,
        });
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Domains crawled: {}", stats.domains.len());
    println!("  Product URLs stored: {}", stats.total_product_urls);
    println!();

    if stats.domains.is_empty() {
        println!("No domains have been crawled yet.");
        return;
    }

    println!("Product URLs by Domain:");
    let mut by_count: Vec<&DomainStatistics> = stats.domains.iter().collect();
    by_count.sort_by(|a, b| b.product_urls.cmp(&a.product_urls));

    for domain in by_count {
        let percentage = if stats.total_product_urls > 0 {
            (domain.product_urls as f64 / stats.total_product_urls as f64) * 100.0
        } else {
            0.0
        };
        println!(
            "  {}: {} ({:.1}%), last crawled {}",
            domain.url, domain.product_urls, percentage, domain.last_crawled_at
        );
    }
}
