use anyhow::{Context, Result};
use blinkwise_acquire::{BlinkistExtractor, Credentials, ExtractOptions, HighlightSource, Pacing};
use blinkwise_model::{HighlightRecord, KnownHighlights, UploadPayload};
use blinkwise_readwise::{HighlightStore, ReadwiseClient};
use std::path::PathBuf;

/// Everything a single run needs, gathered from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Save a CSV even when uploading to Readwise.
    pub download: bool,
    pub show_browser: bool,
    pub readwise_token: Option<String>,
    pub output: PathBuf,
    pub pacing: Pacing,
}

impl Config {
    /// Highlights go to the CSV when asked for, or when there is nowhere
    /// else for them to go.
    pub fn download_local(&self) -> bool {
        self.download || self.readwise_token.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Uploaded(usize),
    SavedLocally(usize),
}

/// Run one Blinkist to Readwise (or CSV) sync.
pub async fn run(config: Config) -> Result<SyncOutcome> {
    let download_local = config.download_local();

    let store = match &config.readwise_token {
        Some(token) => Some(ReadwiseClient::new(token.as_str())?),
        None => None,
    };

    let options = ExtractOptions {
        show_browser: config.show_browser,
        csv_path: download_local.then(|| config.output.clone()),
        pacing: config.pacing,
    };
    let mut source = BlinkistExtractor::new(config.credentials, options);

    sync_highlights(&mut source, store.as_ref(), download_local).await
}

/// Extract highlights from `source` and upload the new ones to `store`.
///
/// With a store, its current highlights are fetched first so extraction can
/// stop as soon as it reaches highlights the store already has, unless
/// `download_local` asks for the full history. Without a store the source
/// is expected to have persisted the highlights itself.
pub async fn sync_highlights<Src, St>(
    source: &mut Src,
    store: Option<&St>,
    download_local: bool,
) -> Result<SyncOutcome>
where
    Src: HighlightSource,
    St: HighlightStore,
{
    let remote = match store {
        Some(store) => {
            tracing::info!("Fetching current Readwise highlights");
            store
                .read_all()
                .await
                .context("Fetching current Readwise highlights failed")?
        }
        None => Vec::new(),
    };

    let policy = KnownHighlights::new(&remote, download_local);
    let records = source
        .extract(&policy)
        .await
        .context("Extracting Blinkist highlights failed")?;

    let Some(store) = store else {
        return Ok(SyncOutcome::SavedLocally(records.len()));
    };

    let payloads = upload_payloads(&records);
    let response = store
        .write_batch(&payloads)
        .await
        .context("Uploading highlights to Readwise failed")?;
    anyhow::ensure!(
        response.status.is_success(),
        "Upload of highlights to Readwise failed with status code {}",
        response.status
    );

    Ok(SyncOutcome::Uploaded(payloads.len()))
}

/// Readwise payloads for `records`, oldest first.
pub fn upload_payloads(records: &[HighlightRecord]) -> Vec<UploadPayload> {
    records.iter().rev().map(UploadPayload::from).collect()
}
