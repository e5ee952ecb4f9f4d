//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Product-Scout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled shop; refreshed at the start of every run
CREATE TABLE IF NOT EXISTS domains (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    last_crawled_at TEXT NOT NULL
);

-- Confirmed product detail pages, written only by the batch persister
CREATE TABLE IF NOT EXISTS product_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    domain_id INTEGER NOT NULL REFERENCES domains(id),
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_urls_domain ON product_urls(domain_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
