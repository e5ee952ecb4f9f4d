//! Product-Scout: an e-commerce product page discoverer
//!
//! This crate crawls a shop from a seed URL, classifies the pages it discovers as
//! product or navigation pages, and persists confirmed product URLs in batches.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Product-Scout operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid state transition for {url}: {from:?} -> {to:?}")]
    InvalidTransition {
        url: String,
        from: Option<state::UrlState>,
        to: state::UrlState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Excluded reference: {0}")]
    Excluded(String),
}

/// Result type alias for Product-Scout operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use classifier::{ContentClassifier, PatternClassifier, ProductPatterns};
pub use config::Config;
pub use crawler::{crawl, CrawlTarget, Coordinator};
pub use state::UrlState;
pub use url::{in_domain, normalize_url, resolve};
