//! # DW Feeds
//!
//! A batch job that aggregates articles from RSS/Atom feeds and writes a
//! compact JSON snapshot for a static site to render.
//!
//! ## Features
//!
//! - Parses any RSS or Atom feed, one feed at a time
//! - Cleans HTML out of titles and descriptions and caps their length
//! - Finds a representative image in the feed, optionally on the linked page
//! - Translates non-Italian items into Italian via LibreTranslate, falling
//!   back to the original text on any failure
//! - Two snapshots: the latest keyword matches tagged by topic, or the
//!   single latest item per AI model
//!
//! ## Usage
//!
//! ```sh
//! dw_feeds articles            # data/feed_sources.json -> data/articoli.json
//! dw_feeds models              # data/ia_sources.json   -> data/ia.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: Fetch and parse each feed, clean fields, resolve images
//! 2. **Selecting**: Keyword filter, dedup by link, rank by date
//! 3. **Enriching**: Translate and tag the selected items
//! 4. **Output**: Write the JSON snapshot atomically

use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod classify;
mod clean;
mod cli;
mod config;
mod images;
mod jobs;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod translate;
mod utils;

use cli::{Cli, Command};
use config::Settings;
use outputs::json;
use translate::{LibreTranslate, Translator};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("dw_feeds starting up");

    let args = Cli::parse();
    let settings = Settings::from_cli(&args);
    let data_dir = PathBuf::from(&args.data_dir);
    let config_path = resolve_path(&data_dir, args.config.as_deref(), args.command.default_config());
    let output_path = resolve_path(&data_dir, args.output.as_deref(), args.command.default_output());
    debug!(
        command = ?args.command,
        config = %config_path.display(),
        output = %output_path.display(),
        user_agent = %settings.user_agent,
        timeout = ?settings.http_timeout,
        translate = settings.translate.is_some(),
        "Parsed CLI arguments"
    );

    // Early check: the snapshot must be writable before any network work
    let output_dir = output_path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = scrapers::build_client(&settings.user_agent, settings.http_timeout)?;
    let mut translator = match &settings.translate {
        Some(t) => Translator::new(LibreTranslate::new(client.clone(), t)),
        None => Translator::disabled(),
    };

    let snapshot = match args.command {
        Command::Articles => {
            let sources = config::load_feed_sources(&config_path).await?;
            jobs::run_articles(&client, &mut translator, &sources, settings.fetch_og_image).await
        }
        Command::Models => {
            let sources = config::load_model_sources(&config_path).await?;
            jobs::run_models(&client, &mut translator, &sources, settings.fetch_og_image).await
        }
    };

    if let Err(e) = json::write_snapshot(&snapshot, &output_path).await {
        error!(path = %output_path.display(), error = %e, "Failed to write snapshot");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        count = snapshot.items.len(),
        fetch_og = settings.fetch_og_image,
        translate = settings
            .translate
            .as_ref()
            .map(|t| t.translate_url.as_str())
            .unwrap_or("off"),
        path = %output_path.display(),
        ?elapsed,
        "Execution complete"
    );

    Ok(())
}

/// An explicit override wins; otherwise the mode's file inside the data directory.
fn resolve_path(data_dir: &Path, explicit: Option<&str>, default_name: &str) -> PathBuf {
    match explicit.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => PathBuf::from(p),
        None => data_dir.join(default_name),
    }
}
