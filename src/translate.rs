//! Language detection and Italian translation through a remote service.
//!
//! Translation is best-effort: every failure falls back to the original
//! text, and the run never stops because the service is slow or down.
//!
//! # Architecture
//!
//! - [`Translate`]: Core trait for a detection/translation backend
//! - [`LibreTranslate`]: Backend speaking the LibreTranslate HTTP API
//! - [`Translator`]: Wraps any backend with the fallback policy and a
//!   per-run cache, so repeated strings cost one request

use crate::config::TranslateSettings;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Target language of every translation.
pub const TARGET_LANG: &str = "it";

/// A language detection and translation backend.
pub trait Translate {
    /// Detect the language of `text`, returning an ISO 639-1 code.
    async fn detect(&self, text: &str) -> Result<String, Box<dyn Error>>;

    /// Translate `text` into Italian.
    async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>>;
}

/// Client for a LibreTranslate-compatible service.
///
/// Requests are form-encoded; the optional API key is forwarded verbatim.
#[derive(Debug, Clone)]
pub struct LibreTranslate {
    client: Client,
    translate_url: String,
    detect_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText", default)]
    translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f64,
}

impl LibreTranslate {
    pub fn new(client: Client, settings: &TranslateSettings) -> Self {
        Self {
            client,
            translate_url: settings.translate_url.clone(),
            detect_url: settings.detect_url.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T, Box<dyn Error>> {
        let mut fields: Vec<(&str, &str)> = form.to_vec();
        if let Some(key) = self.api_key.as_deref() {
            fields.push(("api_key", key));
        }
        let response = self.client.post(url).form(&fields).send().await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(format!("{url} returned {status}").into());
        }
        Ok(response.json::<T>().await?)
    }
}

impl Translate for LibreTranslate {
    #[instrument(level = "debug", skip_all)]
    async fn detect(&self, text: &str) -> Result<String, Box<dyn Error>> {
        let detections: Vec<Detection> = self.post_form(&self.detect_url, &[("q", text)]).await?;
        detections
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|d| d.language)
            .ok_or_else(|| "detect returned no candidates".into())
    }

    #[instrument(level = "debug", skip_all)]
    async fn translate(&self, text: &str) -> Result<String, Box<dyn Error>> {
        let form = [
            ("q", text),
            ("source", "auto"),
            ("target", TARGET_LANG),
            ("format", "text"),
        ];
        let body: TranslateResponse = self.post_form(&self.translate_url, &form).await?;
        Ok(body.translated_text.unwrap_or_default().trim().to_string())
    }
}

/// Applies the fallback policy on top of a [`Translate`] backend.
///
/// A disabled translator (no backend) returns every input unchanged.
#[derive(Debug)]
pub struct Translator<T> {
    backend: Option<T>,
    cache: HashMap<String, String>,
}

impl<T> Translator<T>
where
    T: Translate,
{
    pub fn new(backend: T) -> Self {
        Self {
            backend: Some(backend),
            cache: HashMap::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: None,
            cache: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Language of `text`; `"it"` when empty, disabled, or on any failure.
    pub async fn detect_lang(&self, text: &str) -> String {
        let text = text.trim();
        let Some(backend) = self.backend.as_ref().filter(|_| !text.is_empty()) else {
            return TARGET_LANG.to_string();
        };
        match backend.detect(text).await {
            Ok(lang) if !lang.trim().is_empty() => lang.trim().to_lowercase(),
            Ok(_) => TARGET_LANG.to_string(),
            Err(e) => {
                warn!(error = %e, "Language detection failed; assuming Italian");
                TARGET_LANG.to_string()
            }
        }
    }

    /// Italian translation of `text`, or `text` itself on failure.
    ///
    /// Results, fallbacks included, are cached for the rest of the run.
    pub async fn translate_to_it(&mut self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        if let Some(hit) = self.cache.get(text) {
            return hit.clone();
        }
        let Some(backend) = self.backend.as_ref() else {
            return text.to_string();
        };

        let t0 = Instant::now();
        let out = match backend.translate(text).await {
            Ok(t) if !t.is_empty() => t,
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!(
                    error = %e,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    text = %truncate_for_log(text, 80),
                    "Translation failed; keeping original"
                );
                text.to_string()
            }
        };
        self.cache.insert(text.to_string(), out.clone());
        out
    }

    /// Translate title and description when they are not already Italian.
    pub async fn maybe_translate(&mut self, title: &str, description: &str) -> (String, String) {
        if !self.is_enabled() {
            return (title.to_string(), description.to_string());
        }
        let sample = format!("{title} {description}");
        let lang = self.detect_lang(&sample).await;
        if lang.starts_with(TARGET_LANG) {
            return (title.to_string(), description.to_string());
        }
        debug!(%lang, title = %truncate_for_log(title, 80), "Translating item");

        let title_it = self.translate_to_it(title).await;
        let description_it = self.translate_to_it(description).await;
        (
            if title_it.is_empty() { title.to_string() } else { title_it },
            if description_it.is_empty() { description.to_string() } else { description_it },
        )
    }
}
