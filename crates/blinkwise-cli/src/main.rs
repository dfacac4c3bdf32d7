use anyhow::Result;
use blinkwise_acquire::output::DEFAULT_CSV_PATH;
use blinkwise_acquire::{Credentials, Pacing};
use clap::Parser;
use std::path::PathBuf;

mod pipeline;

use pipeline::{Config, SyncOutcome};

#[derive(Parser)]
#[command(name = "blinkwise")]
#[command(about = "Copy your Blinkist highlights to Readwise or to a CSV file")]
#[command(version)]
struct Cli {
    /// Email address used to log in to your Blinkist account
    blinkist_email: String,

    /// Password used to log in to your Blinkist account
    blinkist_password: String,

    /// Download all Blinkist highlights into a CSV file
    #[arg(short, long)]
    download: bool,

    /// Show the browser window while extracting Blinkist highlights
    #[arg(short, long)]
    show_browser: bool,

    /// Token used to access your Readwise highlights
    #[arg(short, long, value_name = "TOKEN")]
    token_readwise: Option<String>,

    /// Path of the CSV file written when downloading
    #[arg(short, long, default_value = DEFAULT_CSV_PATH)]
    output: PathBuf,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the HTML parser and the DevTools client quiet at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,chromiumoxide=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,chromiumoxide=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    let config = Config {
        credentials: Credentials {
            email: cli.blinkist_email,
            password: cli.blinkist_password,
        },
        download: cli.download,
        show_browser: cli.show_browser,
        readwise_token: cli.token_readwise,
        output: cli.output,
        pacing: Pacing::default(),
    };
    let csv_path = config.output.clone();
    let download_local = config.download_local();

    match pipeline::run(config).await? {
        SyncOutcome::Uploaded(count) => {
            if download_local {
                tracing::info!(path = %csv_path.display(), "Blinkist highlights also saved to a CSV file");
            }
            tracing::info!(highlights = count, "Success: Blinkist highlights uploaded to Readwise!");
        }
        SyncOutcome::SavedLocally(count) => {
            tracing::info!(
                highlights = count,
                path = %csv_path.display(),
                "Success: Blinkist highlights extracted to a CSV file!"
            );
        }
    }

    Ok(())
}
