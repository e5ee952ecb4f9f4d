//! Page rendering boundary for the content classifier
//!
//! A `RenderBackend` is the single owning handle for a run (one browser, one HTTP client).
//! Each classification acquires its own `BrowsingContext`, loads one URL into it, reads the
//! document back and releases it. Backends:
//! - `HttpRenderBackend`: server HTML over `reqwest`, no subresources loaded
//! - `ChromeRenderBackend` (feature `chrome`): headless Chromium through `chromiumoxide`

#[cfg(feature = "chrome")]
mod chrome;
mod http;

#[cfg(feature = "chrome")]
pub use chrome::{ChromeContext, ChromeRenderBackend};
pub use http::{HttpContext, HttpRenderBackend};

use crate::config::{RenderConfig, ResourceClass};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised at the render boundary
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render timed out after {0:?}")]
    Timeout(Duration),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Render backend error: {0}")]
    Backend(String),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Per-render settings derived from the `[render]` config section
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub blocked_resource_types: Vec<ResourceClass>,
    pub blocked_hosts: Vec<String>,
    pub timeout: Duration,
}

impl RenderOptions {
    pub fn from_config(config: &RenderConfig, timeout_ms: u64) -> Self {
        Self {
            blocked_resource_types: config.blocked_resource_types.clone(),
            blocked_hosts: config.blocked_hosts.clone(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// URL wildcard patterns for every blocked resource class and host
    ///
    /// Patterns are matched against the whole request URL, so each extension also gets a
    /// variant for cache-busting query strings (`style.css?ver=6.4`).
    pub fn blocked_url_patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self
            .blocked_resource_types
            .iter()
            .flat_map(|class| resource_extensions(*class))
            .flat_map(|ext| [format!("*.{}", ext), format!("*.{}?*", ext)])
            .collect();

        patterns.extend(
            self.blocked_hosts
                .iter()
                .map(|host| format!("*{}*", host.trim().to_lowercase())),
        );
        patterns
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default(), 30_000)
    }
}

fn resource_extensions(class: ResourceClass) -> &'static [&'static str] {
    match class {
        ResourceClass::Image => &["png", "jpg", "jpeg", "gif", "webp", "svg", "ico"],
        ResourceClass::Font => &["woff", "woff2", "ttf", "otf"],
        ResourceClass::Stylesheet => &["css"],
        ResourceClass::Media => &["mp4", "webm", "mp3"],
    }
}

/// An isolated page, exclusive to one classification call
pub trait BrowsingContext: Send {
    /// Loads `url`, applying the resource blocking in `options`
    fn render(
        &mut self,
        url: &Url,
        options: &RenderOptions,
    ) -> impl Future<Output = RenderResult<()>> + Send;

    /// Serialized DOM of the loaded document
    fn document(&self) -> impl Future<Output = RenderResult<String>> + Send;

    /// Tears the context down; must be called on every exit path
    fn release(self) -> impl Future<Output = ()> + Send;
}

/// Owning handle to a render engine, shared read-mostly by the render pool
pub trait RenderBackend: Send + Sync {
    type Context: BrowsingContext;

    fn acquire(&self) -> impl Future<Output = RenderResult<Self::Context>> + Send;

    fn name(&self) -> &'static str;
}
