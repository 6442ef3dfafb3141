//! RSS/Atom feed collector.
//!
//! Each configured URL is fetched, parsed with `feed-rs` and turned into
//! cleaned [`FeedItem`]s. A feed that cannot be fetched or parsed is logged
//! and skipped; it never aborts the run.

use crate::clean::{MAX_FIELD_CHARS, MAX_SOURCE_CHARS, clean_text};
use crate::images::pick_image;
use crate::models::FeedItem;
use crate::scrapers::og_image::fetch_og_image;
use chrono::Utc;
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::error::Error;
use tracing::{debug, info, instrument, warn};

/// Fetch every feed in order and collect their items.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `urls` - Feed URLs, processed sequentially
/// * `max_entries` - Entries read from the top of each feed
/// * `fetch_og` - Fall back to the linked page's og:image when the feed has none
#[instrument(level = "info", skip_all, fields(feeds = urls.len(), max_entries = max_entries, fetch_og = fetch_og))]
pub async fn collect_feeds(
    client: &Client,
    urls: &[String],
    max_entries: usize,
    fetch_og: bool,
) -> Vec<FeedItem> {
    let items: Vec<FeedItem> = stream::iter(urls)
        .then(|url| collect_feed(client, url.trim(), max_entries, fetch_og))
        .flat_map(stream::iter)
        .collect()
        .await;

    info!(count = items.len(), "Collected feed items");
    items
}

/// Items of a single feed; empty when the feed is unavailable.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn collect_feed(
    client: &Client,
    url: &str,
    max_entries: usize,
    fetch_og: bool,
) -> Vec<FeedItem> {
    if url.is_empty() {
        return Vec::new();
    }
    let feed = match fetch_feed(client, url).await {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, %url, "Feed unavailable; skipping");
            return Vec::new();
        }
    };

    let mut items = items_from_feed(feed, url, max_entries, Utc::now().timestamp());

    if fetch_og {
        for item in items.iter_mut().filter(|i| i.image.is_empty() && !i.link.is_empty()) {
            if let Some(image) = fetch_og_image(client, &item.link).await {
                item.image = image;
            }
        }
    }

    let with_image = items.iter().filter(|i| !i.image.is_empty()).count();
    info!(count = items.len(), with_image, "Parsed feed");
    items
}

/// Download and parse one feed document.
pub async fn fetch_feed(client: &Client, url: &str) -> Result<Feed, Box<dyn Error>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("feed fetch failed with status: {status}").into());
    }
    let bytes = response.bytes().await?;
    debug!(bytes = bytes.len(), "Downloaded feed");
    let feed = parser::parse(bytes.as_ref())?;
    Ok(feed)
}

/// Convert parsed entries into cleaned items.
///
/// `now` stands in for entries carrying neither a published nor an updated
/// date. Entries with no title and no description are dropped.
pub fn items_from_feed(feed: Feed, feed_url: &str, max_entries: usize, now: i64) -> Vec<FeedItem> {
    let feed_title = feed.title.as_ref().map(|t| t.content.as_str()).unwrap_or("");
    let name = if feed_title.trim().is_empty() { feed_url } else { feed_title };
    let mut source = clean_text(name, MAX_SOURCE_CHARS);
    if source.is_empty() {
        source = feed_url.to_string();
    }

    feed.entries
        .iter()
        .take(max_entries)
        .filter_map(|entry| item_from_entry(entry, &source, now))
        .collect()
}

fn item_from_entry(entry: &Entry, source: &str, now: i64) -> Option<FeedItem> {
    let title = clean_text(
        entry.title.as_ref().map(|t| t.content.as_str()).unwrap_or(""),
        MAX_FIELD_CHARS,
    );
    let raw_description = entry
        .summary
        .as_ref()
        .map(|t| t.content.as_str())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.as_deref()))
        .unwrap_or("");
    let description = clean_text(raw_description, MAX_FIELD_CHARS);
    if title.is_empty() && description.is_empty() {
        return None;
    }

    let link = entry_link(entry);
    let ts = entry
        .published
        .or(entry.updated)
        .map(|d| d.timestamp())
        .unwrap_or(now);
    let image = pick_image(entry, &link).unwrap_or_default();

    Some(FeedItem {
        ts,
        title,
        description,
        link,
        source: source.to_string(),
        image,
    })
}

/// Article link: first alternate (or rel-less) link, then an http(s) entry id.
///
/// Enclosure, related and self links never stand in for the article.
fn entry_link(entry: &Entry) -> String {
    let alternate = entry.links.iter().find(|l| {
        !l.href.trim().is_empty()
            && l
                .rel
                .as_deref()
                .is_none_or(|r| r.is_empty() || r.eq_ignore_ascii_case("alternate"))
    });
    if let Some(link) = alternate {
        return link.href.trim().to_string();
    }
    let id = entry.id.trim();
    if id.starts_with("http://") || id.starts_with("https://") {
        return id.to_string();
    }
    String::new()
}
