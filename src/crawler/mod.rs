//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-call timeouts
//! - HTML parsing and link extraction
//! - The frontier and its per-URL state machine
//! - Bounded fetch and render pools
//! - Batched product persistence
//! - Overall crawl coordination

mod coordinator;
mod executor;
mod fetcher;
mod frontier;
mod parser;
mod persister;

pub use coordinator::{crawl, run_crawl, select_targets, Coordinator, CrawlTarget, DomainReport};
pub use executor::{FetchPool, RenderPool};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use persister::BatchPersister;
