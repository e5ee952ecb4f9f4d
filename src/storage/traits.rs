//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{DomainRecord, ProductUrlRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes come from two places only: the domain upsert at the start of a run and the batch
/// persister. Everything else is read side for the CLI.
pub trait Storage {
    // ===== Domains =====

    /// Inserts the domain or refreshes its `last_crawled_at` timestamp
    ///
    /// # Returns
    ///
    /// The domain ID (either newly created or existing)
    fn upsert_domain(&mut self, url: &str) -> StorageResult<i64>;

    /// Gets a domain by URL
    fn get_domain(&self, url: &str) -> StorageResult<Option<DomainRecord>>;

    /// Lists all known domains ordered by URL
    fn list_domains(&self) -> StorageResult<Vec<DomainRecord>>;

    // ===== Product URLs =====

    /// Bulk insert of product URLs for a domain, ignoring URLs already stored
    ///
    /// Runs as one transaction. Returns the number of rows actually inserted.
    fn upsert_product_urls(&mut self, urls: &[String], domain_id: i64) -> StorageResult<usize>;

    /// Gets all product URLs of a domain ordered by URL
    fn get_product_urls(&self, domain_id: i64) -> StorageResult<Vec<ProductUrlRecord>>;

    /// Counts the product URLs of a domain
    fn count_product_urls(&self, domain_id: i64) -> StorageResult<u64>;
}
