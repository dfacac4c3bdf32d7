use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::ExtractError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/89.0.4389.90 Safari/537.36";

/// The small slice of browser automation the extractor needs.
///
/// Selectors are CSS selectors. Operations that act on "the" element act
/// on the first match in document order.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    async fn goto(&self, url: &str) -> Result<(), ExtractError>;

    /// URL of the page currently shown, if any.
    async fn current_url(&self) -> Result<Option<String>, ExtractError>;

    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, ExtractError>;

    /// Click the first match. Returns `false` when nothing matches.
    async fn click(&self, selector: &str) -> Result<bool, ExtractError>;

    /// Type `text` into the first match. Returns `false` when nothing matches.
    async fn type_into(&self, selector: &str, text: &str) -> Result<bool, ExtractError>;

    /// Attribute `name` of the first match, `None` if there is no match or
    /// the attribute is not set.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ExtractError>;

    /// The currently rendered document as HTML.
    async fn content(&self) -> Result<String, ExtractError>;

    async fn close(self) -> Result<(), ExtractError>;
}

/// A Chrome instance driven over the DevTools protocol.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launch Chrome and open a blank tab.
    ///
    /// The window stays hidden (headless) unless `show_window` is set.
    pub async fn launch(show_window: bool) -> Result<Self, ExtractError> {
        let mut builder = BrowserConfig::builder()
            .window_size(1024, 768)
            .arg("--incognito")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={USER_AGENT}"));
        if show_window {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ExtractError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The CDP connection only makes progress while its handler is polled
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser handler stopped");
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        tracing::debug!(headless = !show_window, "Launched Chrome");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

impl BrowserSession for ChromeSession {
    async fn goto(&self, url: &str) -> Result<(), ExtractError> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>, ExtractError> {
        Ok(self.page.url().await?)
    }

    async fn count(&self, selector: &str) -> Result<usize, ExtractError> {
        Ok(self.page.find_elements(selector).await?.len())
    }

    async fn click(&self, selector: &str) -> Result<bool, ExtractError> {
        match self.page.find_elements(selector).await?.first() {
            Some(element) => {
                element.click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<bool, ExtractError> {
        match self.page.find_elements(selector).await?.first() {
            Some(element) => {
                element.click().await?.type_str(text).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, ExtractError> {
        match self.page.find_elements(selector).await?.first() {
            Some(element) => Ok(element.attribute(name).await?),
            None => Ok(None),
        }
    }

    async fn content(&self) -> Result<String, ExtractError> {
        Ok(self.page.content().await?)
    }

    async fn close(mut self) -> Result<(), ExtractError> {
        self.browser.close().await?;
        self.browser.wait().await?;
        if let Err(e) = self.handler.await {
            tracing::debug!(error = %e, "Browser handler task did not finish cleanly");
        }
        tracing::debug!("Closed Chrome");
        Ok(())
    }
}
