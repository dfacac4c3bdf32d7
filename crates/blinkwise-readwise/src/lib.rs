use blinkwise_model::{HighlightPage, RemoteHighlight, UploadBatch, UploadPayload};
use reqwest::header::AUTHORIZATION;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use reqwest::StatusCode;

pub const DEFAULT_BASE_URL: &str = "https://readwise.io/api/v2/highlights/";

/// Highlights requested per listing page.
pub const PAGE_SIZE: u32 = 1000;

/// Pause between listing pages, to stay under the API rate limit.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Readwise request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Readwise returned status code {status} for {url}, please check that the provided Readwise token is correct")]
    Status { status: StatusCode, url: String },
}

/// The unprocessed outcome of a batch upload.
#[derive(Debug, Clone)]
pub struct BatchResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Somewhere highlights are kept remotely.
#[allow(async_fn_in_trait)]
pub trait HighlightStore {
    /// Every stored highlight, in the order the store lists them.
    async fn read_all(&self) -> Result<Vec<RemoteHighlight>, StoreError>;

    /// Submit all `payloads` in a single request.
    ///
    /// A response with an error status is still `Ok`; deciding what it
    /// means is left to the caller.
    async fn write_batch(&self, payloads: &[UploadPayload]) -> Result<BatchResponse, StoreError>;
}

/// Client for the Readwise v2 highlights API.
pub struct ReadwiseClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    page_delay: Duration,
}

impl fmt::Debug for ReadwiseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadwiseClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("page_delay", &self.page_delay)
            .finish()
    }
}

impl ReadwiseClient {
    pub fn new(token: impl Into<String>) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("blinkwise/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            page_delay: DEFAULT_PAGE_DELAY,
        })
    }

    /// Point the client at another highlights endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }
}

impl HighlightStore for ReadwiseClient {
    async fn read_all(&self) -> Result<Vec<RemoteHighlight>, StoreError> {
        let mut highlights = Vec::new();
        let mut next = Some(self.base_url.clone());
        let mut pages = 0usize;

        while let Some(url) = next {
            if pages > 0 {
                tokio::time::sleep(self.page_delay).await;
            }

            let response = self
                .http
                .get(&url)
                .header(AUTHORIZATION, self.auth_header())
                .query(&[("page_size", PAGE_SIZE)])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                tracing::error!(status = %status, page = pages + 1, "Fetching Readwise highlights failed");
                return Err(StoreError::Status { status, url });
            }

            let page: HighlightPage = response.json().await?;
            pages += 1;
            tracing::debug!(page = pages, results = page.results.len(), "Fetched Readwise highlights page");

            highlights.extend(page.results);
            next = page.next;
        }

        tracing::info!(highlights = highlights.len(), pages, "Fetched current Readwise highlights");
        Ok(highlights)
    }

    async fn write_batch(&self, payloads: &[UploadPayload]) -> Result<BatchResponse, StoreError> {
        tracing::info!(highlights = payloads.len(), "Uploading highlights to Readwise");
        let response = self
            .http
            .post(&self.base_url)
            .header(AUTHORIZATION, self.auth_header())
            .json(&UploadBatch {
                highlights: payloads,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            tracing::warn!(status = %status, error = %e, "Could not read the Readwise upload response");
            String::new()
        });
        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Upload of highlights to Readwise failed");
        }
        Ok(BatchResponse { status, body })
    }
}
