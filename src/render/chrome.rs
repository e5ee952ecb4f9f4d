//! Headless Chromium render backend
//!
//! The browser is launched on first acquisition and owned by the backend for the rest of the
//! run. Every context is a fresh tab with network-level URL blocking applied before
//! navigation; releasing the context closes the tab.

use crate::render::{BrowsingContext, RenderBackend, RenderError, RenderOptions, RenderResult};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, SetBlockedUrLsParams};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use url::Url;

/// Lazily launched, single-owner Chromium instance
#[derive(Default)]
pub struct ChromeRenderBackend {
    browser: OnceCell<(Browser, JoinHandle<()>)>,
}

impl ChromeRenderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn browser(&self) -> RenderResult<&Browser> {
        let (browser, _) = self
            .browser
            .get_or_try_init(|| async {
                let config = BrowserConfig::builder()
                    .build()
                    .map_err(RenderError::Backend)?;
                let (browser, mut handler) = Browser::launch(config)
                    .await
                    .map_err(|e| RenderError::Backend(e.to_string()))?;

                let events = tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                tracing::info!("Launched headless browser");
                Ok::<_, RenderError>((browser, events))
            })
            .await?;
        Ok(browser)
    }

    /// Closes the browser if it was ever launched
    pub async fn shutdown(self) {
        if let Some((mut browser, events)) = self.browser.into_inner() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("Failed to wait for browser exit: {}", e);
            }
            events.abort();
        }
    }
}

/// One browser tab
pub struct ChromeContext {
    page: Page,
}

impl BrowsingContext for ChromeContext {
    async fn render(&mut self, url: &Url, options: &RenderOptions) -> RenderResult<()> {
        self.page
            .execute(EnableParams::default())
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        self.page
            .execute(SetBlockedUrLsParams::new(options.blocked_url_patterns()))
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn document(&self) -> RenderResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))
    }

    async fn release(self) {
        if let Err(e) = self.page.close().await {
            tracing::warn!("Failed to close browser tab: {}", e);
        }
    }
}

impl RenderBackend for ChromeRenderBackend {
    type Context = ChromeContext;

    async fn acquire(&self) -> RenderResult<ChromeContext> {
        let page = self
            .browser()
            .await?
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        Ok(ChromeContext { page })
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}
