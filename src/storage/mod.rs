//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler:
//! - SQLite database initialization and schema management
//! - Domain upserts at the start of each run
//! - Bulk, idempotent product URL writes

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::CrawlError;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlError> {
    SqliteStorage::new(path)
}

/// Represents a crawled domain in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub id: i64,
    pub url: String,
    pub last_crawled_at: String,
}

/// Represents a confirmed product URL in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUrlRecord {
    pub id: i64,
    pub url: String,
    pub domain_id: i64,
    pub discovered_at: String,
}
