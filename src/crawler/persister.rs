//! Batched product URL persistence
//!
//! Confirmed products are buffered and written in one bulk upsert once the buffer reaches
//! the flush threshold, plus once more when the crawl ends. A failed write keeps the buffer
//! intact for the next trigger.

use crate::storage::{Storage, StorageError};
use std::sync::Mutex;
use url::Url;

pub struct BatchPersister {
    domain_id: i64,
    threshold: usize,
    unflushed: Vec<String>,
    flushed: usize,
}

impl BatchPersister {
    pub fn new(domain_id: i64, threshold: usize) -> Self {
        Self {
            domain_id,
            threshold: threshold.max(1),
            unflushed: Vec::new(),
            flushed: 0,
        }
    }

    pub fn record(&mut self, url: &Url) {
        self.unflushed.push(url.to_string());
    }

    pub fn should_flush(&self) -> bool {
        self.unflushed.len() >= self.threshold
    }

    pub fn unflushed(&self) -> usize {
        self.unflushed.len()
    }

    /// Total rows written by this persister
    pub fn flushed(&self) -> usize {
        self.flushed
    }

    /// Writes the buffer; failures are logged and the URLs kept for the next attempt
    ///
    /// Returns true when the buffer is empty afterwards.
    pub fn flush<S: Storage>(&mut self, storage: &Mutex<S>) -> bool {
        if self.unflushed.is_empty() {
            return true;
        }

        let result = storage
            .lock()
            .map_err(|_| StorageError::LockPoisoned)
            .and_then(|mut storage| storage.upsert_product_urls(&self.unflushed, self.domain_id));

        match result {
            Ok(inserted) => {
                tracing::debug!(
                    "Flushed {} product URLs ({} new) for domain {}",
                    self.unflushed.len(),
                    inserted,
                    self.domain_id
                );
                self.flushed += inserted;
                self.unflushed.clear();
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Flush of {} product URLs failed, retrying at next flush: {}",
                    self.unflushed.len(),
                    e
                );
                false
            }
        }
    }
}
