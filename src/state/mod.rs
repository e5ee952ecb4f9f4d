//! State module for tracking crawl progress
//!
//! `UrlState` is the per-URL lifecycle enforced by the frontier:
//! `Pending -> InFlight -> Visited`, or directly to the terminal `Product` marker.

mod url_state;

pub use url_state::UrlState;
