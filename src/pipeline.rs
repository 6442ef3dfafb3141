//! Keyword filtering, deduplication and selection.
//!
//! Everything here is pure: items in, items out. Ranking is always by
//! timestamp, most recent first.

use crate::config::ModelRule;
use crate::models::FeedItem;
use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;

/// "Contains any of these keywords" over already lowercased text.
///
/// Keywords are lowercased and matched as literal substrings. The keyword
/// filter, the per-model selection and the topic rules all go through this
/// type, so they agree on what a match is.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    /// `None` when no non-empty keyword was given.
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();
        let pattern = if alternatives.is_empty() {
            None
        } else {
            Regex::new(&alternatives.join("|")).ok()
        };
        Self { pattern }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Whether `text` contains any keyword. Never true for an empty matcher.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Keep items whose title or description contains any keyword.
///
/// Matching is case-insensitive. An empty keyword list keeps everything.
pub fn keyword_filter(items: Vec<FeedItem>, keywords: &[String]) -> Vec<FeedItem> {
    let matcher = KeywordMatcher::new(keywords);
    if matcher.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| matcher.is_match(&item.match_text()))
        .collect()
}

/// Drop duplicate identities, keeping the most recent item of each, and sort
/// the survivors newest first.
///
/// When two items share both identity and timestamp the one seen first wins.
pub fn dedup_and_sort(mut items: Vec<FeedItem>) -> Vec<FeedItem> {
    // Stable: equal timestamps keep input order, so unique_by keeps the first seen
    items.sort_by(|a, b| b.ts.cmp(&a.ts));
    items.into_iter().unique_by(FeedItem::identity).collect()
}

/// The `max_items` most recent distinct items.
pub fn select_latest(items: Vec<FeedItem>, max_items: usize) -> Vec<FeedItem> {
    let mut ranked = dedup_and_sort(items);
    ranked.truncate(max_items);
    ranked
}

/// The most recent matching item for each model, in model order.
///
/// A model with no keywords matches every item; a model with no match is
/// left out. The same item may be picked by several models.
pub fn select_per_model(
    items: Vec<FeedItem>,
    models: &IndexMap<String, ModelRule>,
) -> Vec<(String, FeedItem)> {
    let ranked = dedup_and_sort(items);
    let texts: Vec<String> = ranked.iter().map(FeedItem::match_text).collect();

    models
        .iter()
        .filter_map(|(name, rule)| {
            let matcher = KeywordMatcher::new(&rule.keywords);
            ranked
                .iter()
                .zip(&texts)
                .find(|(_, text)| matcher.is_empty() || matcher.is_match(text))
                .map(|(item, _)| (name.clone(), item.clone()))
        })
        .collect()
}
