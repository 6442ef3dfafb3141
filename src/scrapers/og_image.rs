//! Social-preview image lookup on the linked article page.
//!
//! Slower and more fragile than reading the feed, so it only runs when the
//! feed carries no image and `FETCH_OG_IMAGE` is enabled.

use crate::images::resolve_url;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Tried in order; the first with non-empty `content` wins.
const PREVIEW_SELECTORS: [&str; 3] = [
    r#"meta[property="og:image"]"#,
    r#"meta[name="og:image"]"#,
    r#"meta[name="twitter:image"]"#,
];

/// Fetch `page_url` and return its preview image, if any.
///
/// Every failure (network, HTTP status >= 400, missing tag) yields `None`.
#[instrument(level = "debug", skip_all, fields(%page_url))]
pub async fn fetch_og_image(client: &Client, page_url: &str) -> Option<String> {
    if page_url.is_empty() {
        return None;
    }
    let response = match client.get(page_url).send().await {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "og:image page fetch failed");
            return None;
        }
    };
    let status = response.status();
    if status.as_u16() >= 400 {
        debug!(%status, "og:image page returned an error status");
        return None;
    }
    let html = match response.text().await {
        Ok(t) => t,
        Err(e) => {
            debug!(error = %e, "og:image page body unreadable");
            return None;
        }
    };
    let image = og_image_from_html(&html, page_url);
    debug!(found = image.is_some(), "og:image lookup done");
    image
}

/// Preview image declared in an HTML document, resolved against `page_url`.
pub fn og_image_from_html(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    PREVIEW_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).unwrap();
        document
            .select(&selector)
            .filter_map(|meta| meta.value().attr("content"))
            .map(str::trim)
            .find(|c| !c.is_empty())
            .map(|c| resolve_url(page_url, c))
    })
}
