use blinkwise_model::{HighlightRecord, LoadPolicy};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::output;
use crate::parse::{is_displayed_block, parse_highlights_page};
use crate::session::{BrowserSession, ChromeSession};
use crate::{ExtractError, HighlightSource};

/// Login page; after a successful login Blinkist redirects to the highlights.
pub const LOGIN_URL: &str =
    "https://www.blinkist.com/en/nc/login?last_page_before_login=%2Fen%2Fnc%2Fhighlights";

const COOKIE_ACCEPT: &str = ".cookie-disclaimer__cta";
const EMAIL_FIELD: &str = r#"[name="login[email]"]"#;
const PASSWORD_FIELD: &str = r#"[name="login[password]"]"#;
const SUBMIT_BUTTON: &str = r#"[name="commit"]"#;
const SORT_BY_DATE: &str = "a[data-order-by='date']";
const LOAD_MORE: &str = "a.text-markersV2__load-more";

/// Blinkist account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fixed pauses after UI actions, giving the page time to react.
///
/// Blinkist needs roughly the default durations; shorter pauses make the
/// following lookup race the page's own scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After navigating, dismissing the cookie banner, or submitting the login form.
    pub page_load: Duration,
    /// After typing into a form field.
    pub keystroke: Duration,
    /// After re-sorting or loading more highlights.
    pub action: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(5),
            keystroke: Duration::from_secs(2),
            action: Duration::from_secs(5),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            page_load: Duration::ZERO,
            keystroke: Duration::ZERO,
            action: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Show the browser window instead of running headless.
    pub show_browser: bool,
    /// Where to save the extracted highlights as CSV, if anywhere.
    pub csv_path: Option<PathBuf>,
    pub pacing: Pacing,
}

/// Extracts highlights from Blinkist with a freshly launched Chrome.
#[derive(Debug, Clone)]
pub struct BlinkistExtractor {
    credentials: Credentials,
    options: ExtractOptions,
}

impl BlinkistExtractor {
    pub fn new(credentials: Credentials, options: ExtractOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }
}

impl HighlightSource for BlinkistExtractor {
    async fn extract<P: LoadPolicy>(
        &mut self,
        policy: &P,
    ) -> Result<Vec<HighlightRecord>, ExtractError> {
        let session = ChromeSession::launch(self.options.show_browser).await?;
        extract_highlights(session, &self.credentials, policy, &self.options).await
    }
}

/// Log in to Blinkist and extract highlights, most recent first.
///
/// Older highlights are loaded for as long as `policy` asks for them and
/// the page offers more. The session is closed before returning, whether
/// or not extraction succeeded. The CSV file, if requested, is only written
/// once the full set has been extracted.
pub async fn extract_highlights<S, P>(
    session: S,
    credentials: &Credentials,
    policy: &P,
    options: &ExtractOptions,
) -> Result<Vec<HighlightRecord>, ExtractError>
where
    S: BrowserSession,
    P: LoadPolicy,
{
    let outcome = drive(&session, credentials, policy, &options.pacing).await;

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to close the browser");
    }
    let records = outcome?;

    if let Some(path) = &options.csv_path {
        tracing::info!(path = %path.display(), "Saving Blinkist highlights to a CSV file");
        output::write_csv(path, &records)?;
    }

    Ok(records)
}

async fn drive<S, P>(
    session: &S,
    credentials: &Credentials,
    policy: &P,
    pacing: &Pacing,
) -> Result<Vec<HighlightRecord>, ExtractError>
where
    S: BrowserSession,
    P: LoadPolicy,
{
    log_in(session, credentials, pacing).await?;

    if !session.click(SORT_BY_DATE).await? {
        return Err(ExtractError::SortControlMissing);
    }
    tokio::time::sleep(pacing.action).await;

    tracing::info!("Extracting Blinkist highlights");
    let mut records = parse_highlights_page(&session.content().await?)?;
    let mut loads = 0usize;

    while policy.should_continue_loading(&records) {
        if !load_more_visible(session).await? {
            tracing::debug!("No older highlights to load");
            break;
        }
        session.click(LOAD_MORE).await?;
        tokio::time::sleep(pacing.action).await;

        // The page now shows everything loaded so far, so re-parse all of it
        records = parse_highlights_page(&session.content().await?)?;
        loads += 1;
        tracing::debug!(loads, highlights = records.len(), "Loaded older highlights");
    }

    tracing::info!(highlights = records.len(), loads, "Extracted Blinkist highlights");
    Ok(records)
}

async fn log_in<S: BrowserSession>(
    session: &S,
    credentials: &Credentials,
    pacing: &Pacing,
) -> Result<(), ExtractError> {
    tracing::info!(url = LOGIN_URL, "Opening the Blinkist webpage");
    session.goto(LOGIN_URL).await?;
    tokio::time::sleep(pacing.page_load).await;

    if session.click(COOKIE_ACCEPT).await? {
        tracing::debug!("Accepted cookies");
        tokio::time::sleep(pacing.page_load).await;
    }

    tracing::info!("Logging in to Blinkist");
    for selector in [EMAIL_FIELD, PASSWORD_FIELD, SUBMIT_BUTTON] {
        if session.count(selector).await? == 0 {
            tracing::debug!(selector, "Login form element not found");
            return Err(ExtractError::LoginFieldsMissing);
        }
    }

    session.type_into(EMAIL_FIELD, &credentials.email).await?;
    tokio::time::sleep(pacing.keystroke).await;
    session.type_into(PASSWORD_FIELD, &credentials.password).await?;
    tokio::time::sleep(pacing.keystroke).await;
    session.click(SUBMIT_BUTTON).await?;
    tokio::time::sleep(pacing.page_load).await;

    // A rejected login leaves us on the login page; no page at all is no better
    match session.current_url().await? {
        Some(url) if url != LOGIN_URL => Ok(()),
        _ => Err(ExtractError::LoginRejected),
    }
}

async fn load_more_visible<S: BrowserSession>(session: &S) -> Result<bool, ExtractError> {
    Ok(session
        .attribute(LOAD_MORE, "style")
        .await?
        .is_some_and(|style| is_displayed_block(&style)))
}
