//! Output module for crawl reports
//!
//! This module handles:
//! - Per-domain statistics read back from the database (`--stats`)
//! - The end-of-run report printed after a crawl

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics, DomainStatistics};

use crate::crawler::DomainReport;

/// Prints the results of a crawl run, one block per domain
///
/// `list_products` also prints every product URL found.
pub fn print_crawl_report(reports: &[DomainReport], list_products: bool) {
    println!("=== Crawl Report ===\n");

    for report in reports {
        println!(
            "{}: {} pages fetched, {} product URLs",
            report.target.base_url,
            report.pages_fetched,
            report.products.len()
        );
        if list_products {
            for url in &report.products {
                println!("  {}", url);
            }
        }
    }

    let total: usize = reports.iter().map(|r| r.products.len()).sum();
    println!("\nTotal product URLs: {}", total);
}
