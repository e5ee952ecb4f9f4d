//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{DomainRecord, ProductUrlRecord};
use crate::CrawlError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (tests and dry runs)
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    // ===== Domains =====

    fn upsert_domain(&mut self, url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO domains (url, last_crawled_at) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET last_crawled_at = excluded.last_crawled_at",
            params![url, now],
        )?;

        // last_insert_rowid is stale on the update path
        let id = self
            .conn
            .query_row("SELECT id FROM domains WHERE url = ?1", params![url], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    fn get_domain(&self, url: &str) -> StorageResult<Option<DomainRecord>> {
        let domain = self
            .conn
            .query_row(
                "SELECT id, url, last_crawled_at FROM domains WHERE url = ?1",
                params![url],
                |row| {
                    Ok(DomainRecord {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        last_crawled_at: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(domain)
    }

    fn list_domains(&self) -> StorageResult<Vec<DomainRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, url, last_crawled_at FROM domains ORDER BY url")?;

        let domains = stmt
            .query_map([], |row| {
                Ok(DomainRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    last_crawled_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(domains)
    }

    // ===== Product URLs =====

    fn upsert_product_urls(&mut self, urls: &[String], domain_id: i64) -> StorageResult<usize> {
        if urls.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO product_urls (url, domain_id, discovered_at) VALUES (?1, ?2, ?3)",
            )?;
            for url in urls {
                inserted += stmt.execute(params![url, domain_id, now])?;
            }
        }
        tx.commit()?;

        Ok(inserted)
    }

    fn get_product_urls(&self, domain_id: i64) -> StorageResult<Vec<ProductUrlRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, domain_id, discovered_at FROM product_urls
             WHERE domain_id = ?1 ORDER BY url",
        )?;

        let urls = stmt
            .query_map(params![domain_id], |row| {
                Ok(ProductUrlRecord {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    domain_id: row.get(2)?,
                    discovered_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    fn count_product_urls(&self, domain_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM product_urls WHERE domain_id = ?1",
            params![domain_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_upsert_domain_keeps_id_and_refreshes_timestamp() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let first = storage.upsert_domain("https://shop.example/").unwrap();
        let before = storage
            .get_domain("https://shop.example/")
            .unwrap()
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = storage.upsert_domain("https://shop.example/").unwrap();
        let after = storage
            .get_domain("https://shop.example/")
            .unwrap()
            .unwrap();

        assert_eq!(first, second);
        assert!(after.last_crawled_at >= before.last_crawled_at);
        assert_eq!(storage.list_domains().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_domain_after_other_inserts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let a = storage.upsert_domain("https://a.example/").unwrap();
        let b = storage.upsert_domain("https://b.example/").unwrap();
        assert_ne!(a, b);
        assert_eq!(storage.upsert_domain("https://a.example/").unwrap(), a);
    }

    #[test]
    fn test_get_missing_domain() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.get_domain("https://nope.example/").unwrap(), None);
    }

    #[test]
    fn test_upsert_product_urls_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let domain_id = storage.upsert_domain("https://shop.example/").unwrap();
        let batch = urls(&[
            "https://shop.example/product/1",
            "https://shop.example/product/2",
        ]);

        assert_eq!(storage.upsert_product_urls(&batch, domain_id).unwrap(), 2);
        assert_eq!(storage.upsert_product_urls(&batch, domain_id).unwrap(), 0);
        assert_eq!(storage.count_product_urls(domain_id).unwrap(), 2);

        let stored = storage.get_product_urls(domain_id).unwrap();
        assert_eq!(stored[0].url, "https://shop.example/product/1");
        assert_eq!(stored[1].url, "https://shop.example/product/2");
    }

    #[test]
    fn test_upsert_product_urls_partial_overlap() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let domain_id = storage.upsert_domain("https://shop.example/").unwrap();

        storage
            .upsert_product_urls(&urls(&["https://shop.example/p/a"]), domain_id)
            .unwrap();
        let inserted = storage
            .upsert_product_urls(
                &urls(&["https://shop.example/p/a", "https://shop.example/p/b"]),
                domain_id,
            )
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(storage.count_product_urls(domain_id).unwrap(), 2);
    }

    #[test]
    fn test_upsert_product_urls_empty_batch() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.upsert_product_urls(&[], 1).unwrap(), 0);
    }

    #[test]
    fn test_upsert_product_urls_unknown_domain_fails() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result = storage.upsert_product_urls(&urls(&["https://x.example/p/1"]), 99);
        assert!(matches!(result, Err(StorageError::Sqlite(_))));
    }

    #[test]
    fn test_file_backed_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let id = storage.upsert_domain("https://shop.example/").unwrap();
            storage
                .upsert_product_urls(&urls(&["https://shop.example/p/1"]), id)
                .unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        let domain = storage
            .get_domain("https://shop.example/")
            .unwrap()
            .unwrap();
        assert_eq!(storage.count_product_urls(domain.id).unwrap(), 1);
    }
}
