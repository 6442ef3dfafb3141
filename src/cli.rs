//! Command-line interface definitions for the feed updater.
//!
//! Every option can be provided via a command-line flag or an environment
//! variable, so the job can be driven entirely from a scheduler's env.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand};

pub const DEFAULT_LIBRETRANSLATE_URL: &str = "https://libretranslate.de/translate";
pub const DEFAULT_USER_AGENT: &str = "DigitalWorkflowBot/1.0 (+https://fugallo.it/)";

/// Command-line arguments for the feed updater.
///
/// # Examples
///
/// ```sh
/// # All-items snapshot: data/feed_sources.json -> data/articoli.json
/// dw_feeds articles
///
/// # Best item per model: data/ia_sources.json -> data/ia.json
/// dw_feeds --data-dir ./site/data models
///
/// # With og:image fallback and a private LibreTranslate instance
/// FETCH_OG_IMAGE=1 LIBRETRANSLATE_URL=http://lt:5000/translate dw_feeds articles
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the source config and the written snapshot
    #[arg(short, long, env = "DW_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: String,

    /// Config file, overriding the mode's default inside the data directory
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output file, overriding the mode's default inside the data directory
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// LibreTranslate `/translate` endpoint
    #[arg(long, env = "LIBRETRANSLATE_URL", default_value = DEFAULT_LIBRETRANSLATE_URL, global = true)]
    pub libretranslate_url: String,

    /// LibreTranslate `/detect` endpoint (derived from the translate URL when unset)
    #[arg(long, env = "LIBRETRANSLATE_DETECT_URL", global = true)]
    pub libretranslate_detect_url: Option<String>,

    /// API key forwarded verbatim to LibreTranslate
    #[arg(long, env = "LIBRETRANSLATE_API_KEY", hide_env_values = true, global = true)]
    pub libretranslate_api_key: Option<String>,

    /// Fetch the linked page's og:image when the feed carries no image
    ///
    /// From the environment, `0`, `false`, `no`, `off` or empty mean off.
    #[arg(long, env = "FETCH_OG_IMAGE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), global = true)]
    pub fetch_og_image: bool,

    /// Skip language detection and translation
    #[arg(long, env = "DW_NO_TRANSLATE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new(), global = true)]
    pub no_translate: bool,

    /// User-Agent sent with every request
    #[arg(long, env = "DW_UA", default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "DW_HTTP_TIMEOUT", default_value_t = 12.0, global = true)]
    pub http_timeout: f64,
}

/// Which snapshot to produce.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Most recent keyword-matching items, tagged by topic
    Articles,
    /// Single most recent item per configured model
    Models,
}

impl Command {
    /// Config file name inside the data directory.
    pub fn default_config(self) -> &'static str {
        match self {
            Command::Articles => "feed_sources.json",
            Command::Models => "ia_sources.json",
        }
    }

    /// Snapshot file name inside the data directory.
    pub fn default_output(self) -> &'static str {
        match self {
            Command::Articles => "articoli.json",
            Command::Models => "ia.json",
        }
    }
}

/// Serializes tests that read or write the process environment.
#[cfg(test)]
pub(crate) mod test_env {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 8] = [
        "DW_DATA_DIR",
        "LIBRETRANSLATE_URL",
        "LIBRETRANSLATE_DETECT_URL",
        "LIBRETRANSLATE_API_KEY",
        "FETCH_OG_IMAGE",
        "DW_NO_TRANSLATE",
        "DW_UA",
        "DW_HTTP_TIMEOUT",
    ];

    /// Take the lock with every variable the CLI reads cleared.
    pub fn lock() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for var in VARS {
            // SAFETY: environment access in tests only happens under ENV_LOCK
            unsafe { std::env::remove_var(var) };
        }
        guard
    }

    pub fn set(var: &str, value: &str) {
        // SAFETY: callers hold the guard returned by `lock`
        unsafe { std::env::set_var(var, value) };
    }
}
