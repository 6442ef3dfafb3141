//! Free-text cleaning for feed fields.
//!
//! Titles, summaries and feed names arrive as HTML fragments of arbitrary
//! length. [`clean_text`] turns them into a single line of plain text that
//! fits on a card.

use scraper::Html;

/// Default limit for titles and descriptions.
pub const MAX_FIELD_CHARS: usize = 220;
/// Limit for feed (source) names.
pub const MAX_SOURCE_CHARS: usize = 60;

const ELLIPSIS: char = '…';

/// Strip markup, collapse whitespace and cap the length at `max_len` characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("<p>Hello <b>world</b></p>", 220), "Hello world");
/// assert_eq!(clean_text("  \n ", 220), "");
/// ```
pub fn clean_text(s: &str, max_len: usize) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let text = collapse_whitespace(&strip_html(trimmed));
    truncate_with_ellipsis(&text, max_len)
}

/// Text content of an HTML fragment, text nodes joined by a space.
///
/// Entities are decoded by the parser; plain text passes through.
pub fn strip_html(s: &str) -> String {
    let fragment = Html::parse_fragment(s);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace every whitespace run with a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap `s` at `max_len` characters, the ellipsis included.
///
/// The cut moves back to the last whitespace in the window as long as that
/// keeps at least half of it; otherwise the last word is split.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let keep = max_len - 1;
    let window: String = s.chars().take(keep).collect();
    let breaks_cleanly = s.chars().nth(keep).is_some_and(char::is_whitespace);

    let cut = if breaks_cleanly {
        window.as_str()
    } else {
        match window.rfind(char::is_whitespace) {
            Some(i) if window[..i].chars().count() >= keep / 2 => &window[..i],
            _ => window.as_str(),
        }
    };
    let cut = cut.trim_end().trim_end_matches([',', ';', ':']).trim_end();
    format!("{cut}{ELLIPSIS}")
}
