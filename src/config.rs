//! Source configuration files and runtime settings.
//!
//! Two JSON documents drive the job:
//! - `feed_sources.json` ([`FeedSources`]) for the all-items snapshot
//! - `ia_sources.json` ([`ModelSources`]) for the best-per-model snapshot
//!
//! [`Settings`] collects the knobs that come from the CLI/environment rather
//! than from those files.

use crate::cli::Cli;
use indexmap::IndexMap;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

const DEFAULT_HTTP_TIMEOUT_SECS: f64 = 12.0;

/// Configuration for the all-items snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSources {
    #[serde(default)]
    pub feeds: Vec<String>,
    /// Case-insensitive substrings; empty keeps every item.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_articles_entries")]
    pub max_entries_per_feed: usize,
}

/// Configuration for the best-per-model snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSources {
    #[serde(default)]
    pub feeds: Vec<String>,
    /// Models in document order; output follows this order.
    #[serde(default)]
    pub models: IndexMap<String, ModelRule>,
    #[serde(default = "default_models_entries")]
    pub max_entries_per_feed: usize,
}

/// Keyword set selecting items for one model. Empty matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelRule {
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_max_items() -> usize {
    24
}

fn default_articles_entries() -> usize {
    60
}

fn default_models_entries() -> usize {
    80
}

/// Load `feed_sources.json`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_feed_sources(path: &Path) -> Result<FeedSources, Box<dyn Error>> {
    let sources: FeedSources = read_json(path).await?;
    info!(
        feeds = sources.feeds.len(),
        keywords = sources.keywords.len(),
        max_items = sources.max_items,
        "Loaded feed sources"
    );
    Ok(sources)
}

/// Load `ia_sources.json`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_model_sources(path: &Path) -> Result<ModelSources, Box<dyn Error>> {
    let sources: ModelSources = read_json(path).await?;
    info!(
        feeds = sources.feeds.len(),
        models = sources.models.len(),
        "Loaded model sources"
    );
    Ok(sources)
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, Box<dyn Error>> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let parsed = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    Ok(parsed)
}

/// Settings for the translation service.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateSettings {
    pub translate_url: String,
    pub detect_url: String,
    pub api_key: Option<String>,
}

/// Runtime settings resolved from the CLI and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub user_agent: String,
    pub http_timeout: Duration,
    pub fetch_og_image: bool,
    /// `None` when translation is disabled.
    pub translate: Option<TranslateSettings>,
}

impl Settings {
    pub fn from_cli(args: &Cli) -> Self {
        let translate_url = args.libretranslate_url.trim().to_string();
        let translate = (!args.no_translate && !translate_url.is_empty()).then(|| {
            let detect_url = args
                .libretranslate_detect_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| detect_url_for(&translate_url));
            TranslateSettings {
                translate_url,
                detect_url,
                api_key: args
                    .libretranslate_api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string),
            }
        });

        Self {
            user_agent: args.user_agent.trim().to_string(),
            http_timeout: timeout_from_secs(args.http_timeout),
            fetch_og_image: args.fetch_og_image,
            translate,
        }
    }
}

/// `.../translate` becomes `.../detect`; anything else gets `/detect` appended.
pub fn detect_url_for(translate_url: &str) -> String {
    let base = translate_url.trim_end_matches('/');
    match base.strip_suffix("/translate") {
        Some(root) => format!("{root}/detect"),
        None => format!("{base}/detect"),
    }
}

fn timeout_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::from_secs_f64(DEFAULT_HTTP_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_env;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_feed_sources_defaults() {
        let sources: FeedSources = serde_json::from_str(r#"{"feeds": ["https://a.example/rss"]}"#).unwrap();
        assert_eq!(sources.feeds.len(), 1);
        assert!(sources.keywords.is_empty());
        assert_eq!(sources.max_items, 24);
        assert_eq!(sources.max_entries_per_feed, 60);
    }

    #[test]
    fn test_model_sources_keep_document_order() {
        let json = r#"{
            "feeds": [],
            "models": {
                "chatgpt": {"keywords": ["chatgpt", "openai"]},
                "copilot": {"keywords": ["copilot"]},
                "altri": {}
            },
            "unused": true
        }"#;
        let sources: ModelSources = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = sources.models.keys().map(String::as_str).collect();
        assert_eq!(names, ["chatgpt", "copilot", "altri"]);
        assert!(sources.models["altri"].keywords.is_empty());
        assert_eq!(sources.max_entries_per_feed, 80);
    }

    #[tokio::test]
    async fn test_load_feed_sources_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"feeds": ["https://a.example/rss"], "keywords": ["Notion"], "max_items": 5}}"#).unwrap();

        let sources = load_feed_sources(file.path()).await.unwrap();
        assert_eq!(sources.keywords, ["Notion"]);
        assert_eq!(sources.max_items, 5);
    }

    #[tokio::test]
    async fn test_load_reports_path_on_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load_model_sources(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_feed_sources(Path::new("/nonexistent/feed_sources.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_detect_url_for() {
        assert_eq!(
            detect_url_for("https://libretranslate.de/translate"),
            "https://libretranslate.de/detect"
        );
        assert_eq!(detect_url_for("http://lt:5000/translate/"), "http://lt:5000/detect");
        assert_eq!(detect_url_for("http://lt:5000"), "http://lt:5000/detect");
    }

    #[test]
    fn test_timeout_fallback() {
        assert_eq!(timeout_from_secs(2.5), Duration::from_millis(2500));
        assert_eq!(timeout_from_secs(-1.0), Duration::from_secs(12));
        assert_eq!(timeout_from_secs(f64::NAN), Duration::from_secs(12));
    }

    #[test]
    fn test_settings_from_cli() {
        let _env = test_env::lock();
        let cli = Cli::parse_from([
            "dw_feeds",
            "articles",
            "--libretranslate-url",
            " http://lt:5000/translate ",
            "--libretranslate-api-key",
            "secret",
            "--user-agent",
            "TestBot/1.0",
        ]);
        let settings = Settings::from_cli(&cli);
        assert_eq!(settings.user_agent, "TestBot/1.0");
        let translate = settings.translate.unwrap();
        assert_eq!(translate.translate_url, "http://lt:5000/translate");
        assert_eq!(translate.detect_url, "http://lt:5000/detect");
        assert_eq!(translate.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_settings_from_env() {
        let _env = test_env::lock();
        test_env::set("FETCH_OG_IMAGE", "1");
        test_env::set("DW_HTTP_TIMEOUT", "3.5");
        test_env::set("LIBRETRANSLATE_URL", "http://lt:5000/translate");

        let settings = Settings::from_cli(&Cli::try_parse_from(["dw_feeds", "articles"]).unwrap());
        assert!(settings.fetch_og_image);
        assert_eq!(settings.http_timeout, Duration::from_millis(3500));
        assert_eq!(settings.translate.unwrap().detect_url, "http://lt:5000/detect");

        test_env::set("DW_NO_TRANSLATE", "1");
        let settings = Settings::from_cli(&Cli::try_parse_from(["dw_feeds", "articles"]).unwrap());
        assert_eq!(settings.translate, None);
    }

    #[test]
    fn test_settings_translation_disabled() {
        let _env = test_env::lock();
        let cli = Cli::parse_from(["dw_feeds", "models", "--no-translate"]);
        assert_eq!(Settings::from_cli(&cli).translate, None);
    }
}
