//! Representative image discovery from feed-native fields.
//!
//! Looks only at what the feed already carries; fetching the linked page for
//! its og:image is done separately in [`crate::scrapers::og_image`].
//!
//! # Lookup order
//!
//! 1. Media content typed `image/*` or with an image file extension
//! 2. Any media thumbnail
//! 3. Entry links typed `image/*`, or `rel="enclosure"` with an image extension
//! 4. The first `<img src>` in the summary (or content) HTML

use feed_rs::model::Entry;
use scraper::{Html, Selector};
use url::Url;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Best image URL for an entry, resolved against `base` when relative.
pub fn pick_image(entry: &Entry, base: &str) -> Option<String> {
    let found = media_content_image(entry)
        .or_else(|| media_thumbnail(entry))
        .or_else(|| link_image(entry))
        .or_else(|| {
            let summary = entry.summary.as_ref().map(|t| t.content.as_str());
            let body = entry.content.as_ref().and_then(|c| c.body.as_deref());
            summary
                .and_then(first_img_src)
                .or_else(|| body.and_then(first_img_src))
        })?;
    Some(resolve_url(base, &found))
}

fn media_content_image(entry: &Entry) -> Option<String> {
    entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| {
            let url = c.url.as_ref()?.as_str().trim();
            let typed_image = c
                .content_type
                .as_ref()
                .is_some_and(|m| is_image_type(m.as_ref()));
            (!url.is_empty() && (typed_image || has_image_extension(url))).then(|| url.to_string())
        })
}

fn media_thumbnail(entry: &Entry) -> Option<String> {
    entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.trim())
        .find(|u| !u.is_empty())
        .map(str::to_string)
}

fn link_image(entry: &Entry) -> Option<String> {
    entry.links.iter().find_map(|l| {
        let href = l.href.trim();
        let typed_image = l.media_type.as_deref().is_some_and(is_image_type);
        let enclosure = l
            .rel
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("enclosure"));
        (!href.is_empty() && (typed_image || (enclosure && has_image_extension(href))))
            .then(|| href.to_string())
    })
}

/// `src` of the first `<img>` in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    if !html.to_ascii_lowercase().contains("<img") {
        return None;
    }
    let fragment = Html::parse_fragment(html);
    let img_selector = Selector::parse("img[src]").unwrap();
    fragment
        .select(&img_selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string)
}

fn is_image_type(media_type: &str) -> bool {
    media_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Extension check on the path only; query and fragment are ignored.
pub fn has_image_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Resolve `raw` against `base`; left untouched when either cannot be parsed.
pub fn resolve_url(base: &str, raw: &str) -> String {
    if let Ok(abs) = Url::parse(raw) {
        return abs.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(raw))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| raw.to_string())
}
