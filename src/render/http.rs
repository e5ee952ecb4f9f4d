//! Plain HTTP render backend
//!
//! The "rendered" document is the server HTML. No subresources are ever requested, so the
//! blocked classes and hosts in `RenderOptions` are satisfied without any filtering.

use crate::crawler::fetch_url;
use crate::render::{BrowsingContext, RenderBackend, RenderError, RenderOptions, RenderResult};
use reqwest::Client;
use url::Url;

/// Render backend sharing one `reqwest` client across all contexts
#[derive(Debug, Clone)]
pub struct HttpRenderBackend {
    client: Client,
    max_bytes: usize,
}

impl HttpRenderBackend {
    pub fn new(client: Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

/// One document slot; releasing it only drops the buffered body
#[derive(Debug)]
pub struct HttpContext {
    client: Client,
    max_bytes: usize,
    document: Option<String>,
}

impl BrowsingContext for HttpContext {
    async fn render(&mut self, url: &Url, options: &RenderOptions) -> RenderResult<()> {
        let outcome = fetch_url(&self.client, url, options.timeout, self.max_bytes).await;
        if !outcome.success {
            return Err(RenderError::Navigation(
                outcome
                    .error
                    .unwrap_or_else(|| format!("failed to load {}", url)),
            ));
        }
        self.document = Some(outcome.html);
        Ok(())
    }

    async fn document(&self) -> RenderResult<String> {
        self.document
            .clone()
            .ok_or_else(|| RenderError::Backend("no document loaded".to_string()))
    }

    async fn release(self) {}
}

impl RenderBackend for HttpRenderBackend {
    type Context = HttpContext;

    async fn acquire(&self) -> RenderResult<HttpContext> {
        Ok(HttpContext {
            client: self.client.clone(),
            max_bytes: self.max_bytes,
            document: None,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
