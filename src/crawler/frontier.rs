//! Crawl frontier: the single dedup authority for one run
//!
//! Every URL the run learns about ends up in exactly one place:
//! - `pending` (with its `queued` index) while waiting for dispatch
//! - `in_flight` between dispatch and settlement (already counted as visited)
//! - `visited` once fetched; `products` is a subset of `visited`
//! - `seen` when classified as a non-product beyond the depth budget
//!
//! Only the coordinator mutates the frontier, and only between rounds.

use crate::state::UrlState;
use crate::{CrawlError, Result};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL accepted for fetching, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Breadth-first frontier with explicit per-URL state
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<FrontierEntry>,
    queued: HashSet<Url>,
    in_flight: HashSet<Url>,
    visited: HashSet<Url>,
    products: HashSet<Url>,
    seen: HashSet<Url>,
}

impl Frontier {
    /// Creates a frontier holding only the seed at depth 0
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.queued.insert(seed.clone());
        frontier.pending.push_back(FrontierEntry::new(seed, 0));
        frontier
    }

    /// Current state of `url`, if it is tracked
    pub fn state_of(&self, url: &Url) -> Option<UrlState> {
        if self.products.contains(url) {
            Some(UrlState::Product)
        } else if self.in_flight.contains(url) {
            Some(UrlState::InFlight)
        } else if self.visited.contains(url) {
            Some(UrlState::Visited)
        } else if self.queued.contains(url) {
            Some(UrlState::Pending)
        } else {
            None
        }
    }

    /// True if the URL was already queued, visited, confirmed or classified
    pub fn is_known(&self, url: &Url) -> bool {
        self.visited.contains(url) || self.queued.contains(url) || self.seen.contains(url)
    }

    fn check_transition(&self, url: &Url, next: UrlState) -> Result<()> {
        let from = self.state_of(url);
        if self.seen.contains(url) || !UrlState::can_transition(from, next) {
            return Err(CrawlError::InvalidTransition {
                url: url.to_string(),
                from,
                to: next,
            });
        }
        Ok(())
    }

    /// Adds a new candidate to the back of the queue
    pub fn enqueue(&mut self, entry: FrontierEntry) -> Result<()> {
        self.check_transition(&entry.url, UrlState::Pending)?;
        self.queued.insert(entry.url.clone());
        self.pending.push_back(entry);
        Ok(())
    }

    /// Dequeues up to `max` entries and marks them in flight and visited before dispatch
    pub fn next_batch(&mut self, max: usize) -> Result<Vec<FrontierEntry>> {
        let mut batch = Vec::with_capacity(max.min(self.pending.len()));

        while batch.len() < max {
            let Some(entry) = self.pending.pop_front() else {
                break;
            };
            self.check_transition(&entry.url, UrlState::InFlight)?;

            self.queued.remove(&entry.url);
            self.visited.insert(entry.url.clone());
            self.in_flight.insert(entry.url.clone());
            batch.push(entry);
        }

        Ok(batch)
    }

    /// Closes out a dispatched URL once its fetch has returned
    pub fn settle(&mut self, url: &Url) -> Result<()> {
        self.check_transition(url, UrlState::Visited)?;
        self.in_flight.remove(url);
        Ok(())
    }

    /// Records a confirmed product; it joins both the product and visited sets
    pub fn mark_product(&mut self, url: Url) -> Result<()> {
        self.check_transition(&url, UrlState::Product)?;
        self.visited.insert(url.clone());
        self.products.insert(url);
        Ok(())
    }

    /// Records a classified non-product that will not be expanded
    pub fn mark_seen(&mut self, url: Url) -> bool {
        if self.is_known(&url) {
            return false;
        }
        self.seen.insert(url)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of URLs visited so far, products included
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs actually dispatched for fetching
    pub fn fetched_len(&self) -> usize {
        self.visited.len() - self.products.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn is_product(&self, url: &Url) -> bool {
        self.products.contains(url)
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Confirmed products, sorted
    pub fn products(&self) -> Vec<Url> {
        let mut products: Vec<Url> = self.products.iter().cloned().collect();
        products.sort();
        products
    }
}
