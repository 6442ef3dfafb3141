//! Data models for feed items and the JSON snapshot.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedItem`]: A cleaned entry extracted from a feed, still carrying its timestamp
//! - [`OutputItem`]: The serialized shape consumed by the static site
//! - [`Snapshot`]: The document written once per run
//!
//! Output field names are Italian because the downstream site reads them
//! as-is (`titolo`, `descrizione`, `fonte`, `data`, ...).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A feed entry after field extraction and cleaning.
///
/// `ts` is the entry's publication time in unix seconds (UTC). It drives
/// deduplication and ranking and is rendered as `data` on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub ts: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    /// Human readable feed name.
    pub source: String,
    /// Representative image URL, empty when none was found.
    pub image: String,
}

impl FeedItem {
    /// Lowercased `title + " " + description`, the text every keyword and
    /// topic rule is matched against.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }

    /// Identity used for deduplication: link, then title, then the timestamp.
    pub fn identity(&self) -> String {
        if !self.link.is_empty() {
            self.link.clone()
        } else if !self.title.is_empty() {
            self.title.clone()
        } else {
            self.ts.to_string()
        }
    }

    /// Convert into the serialized shape, dropping the raw timestamp.
    pub fn into_output(self) -> OutputItem {
        OutputItem {
            data: iso_utc(self.ts),
            titolo: self.title,
            descrizione: self.description,
            link: self.link,
            fonte: self.source,
            image: self.image,
            categoria: None,
            modello: None,
        }
    }
}

/// One item of the written snapshot.
///
/// Field order matters for readers diffing the file between runs, so it is
/// fixed here: `titolo, descrizione, link, fonte, image, data`, then the
/// mode-specific tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputItem {
    pub titolo: String,
    pub descrizione: String,
    pub link: String,
    pub fonte: String,
    pub image: String,
    pub data: String,
    /// Topic category, set in articles mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    /// Model/category name, set in models mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modello: Option<String>,
}

/// The JSON document produced by one run.
#[derive(Debug, Deserialize, Serialize)]
pub struct Snapshot {
    /// Generation time, ISO-8601 UTC.
    pub last_updated: String,
    pub items: Vec<OutputItem>,
}

impl Snapshot {
    /// Stamp `items` with the current time, to the millisecond.
    pub fn new(items: Vec<OutputItem>) -> Self {
        Self {
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, false),
            items,
        }
    }
}

/// Render unix seconds as ISO-8601 UTC with an explicit `+00:00` offset.
pub fn iso_utc(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .to_rfc3339()
}
