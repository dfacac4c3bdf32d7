use blinkwise_model::{HighlightRecord, LoadPolicy};
use thiserror::Error;

pub mod blinkist;
pub mod output;
pub mod parse;
pub mod session;

pub use blinkist::{extract_highlights, BlinkistExtractor, Credentials, ExtractOptions, Pacing};
pub use session::{BrowserSession, ChromeSession};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("could not launch the browser: {0}")]
    Launch(String),

    #[error("browser automation failed: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("could not find all required fields on the Blinkist login page")]
    LoginFieldsMissing,

    #[error("Blinkist login failed, please check your credentials")]
    LoginRejected,

    #[error("could not find the sort-by-date control on the Blinkist highlights page")]
    SortControlMissing,

    #[error("could not find any highlights on the Blinkist highlights page")]
    NoHighlightMarkers,

    #[error("could not write highlights file: {0}")]
    Io(#[from] std::io::Error),
}

/// Somewhere highlights can be extracted from.
#[allow(async_fn_in_trait)]
pub trait HighlightSource {
    /// Extract highlights, most recent first, loading older ones for as
    /// long as `policy` asks for more.
    async fn extract<P: LoadPolicy>(
        &mut self,
        policy: &P,
    ) -> Result<Vec<HighlightRecord>, ExtractError>;
}
