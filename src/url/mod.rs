//! URL handling module for Product-Scout
//!
//! This module provides reference resolution, canonicalization, and domain matching.
//! Every URL that enters the frontier or a classifier cache has passed through here.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, in_domain, url_in_domain};
pub use matcher::host_matches;
pub use normalize::{normalize_url, resolve};
