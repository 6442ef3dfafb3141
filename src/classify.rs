//! Topic classification for the all-items snapshot.
//!
//! Rules are tried in order and the first one matching the lowercased
//! `title + " " + description` wins. Keywords are plain substrings, some
//! padded with a space (`"ai "`, `" ia"`) to avoid matching inside words.

use crate::pipeline::KeywordMatcher;
use once_cell::sync::Lazy;

/// Label used when no rule matches.
pub const DEFAULT_CATEGORY: &str = "strumenti";

const RULES: &[(&str, &[&str])] = &[
    ("notion", &["notion"]),
    ("canva", &["canva"]),
    ("clickup", &["clickup"]),
    (
        "riunioni",
        &["meeting", "riunione", "riunioni", "calendar", "zoom", "teams"],
    ),
    (
        "ia",
        &[
            "ai ", " ia", "chatgpt", "openai", "gpt", "gemini", "claude", "copilot", "llm", "sora",
            "anthropic",
        ],
    ),
    (
        "automazioni",
        &[
            "automation",
            "automazione",
            "workflow",
            "zapier",
            "make.com",
            "integromat",
            "n8n",
            "ifttt",
        ],
    ),
    (
        "strumenti",
        &["tool", "strumento", "app", "software", "estensione", "plugin"],
    ),
    (
        "produttività",
        &[
            "productivity",
            "produttività",
            "organizzazione",
            "focus",
            "todo",
            "task",
            "time blocking",
            "pomodoro",
            "kanban",
        ],
    ),
];

static COMPILED: Lazy<Vec<(&'static str, KeywordMatcher)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(category, keywords)| (*category, KeywordMatcher::new(*keywords)))
        .collect()
});

/// Category for an already lowercased text.
pub fn classify(text: &str) -> &'static str {
    COMPILED
        .iter()
        .find(|(_, matcher)| matcher.is_match(text))
        .map(|(category, _)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rule_wins() {
        // "notion" precedes "ia" even though ChatGPT is mentioned too
        assert_eq!(classify("notion integra chatgpt"), "notion");
        assert_eq!(classify("zoom adds an ai assistant"), "riunioni");
    }

    #[test]
    fn test_ia_rule() {
        assert_eq!(classify("openai presenta un nuovo modello"), "ia");
        assert_eq!(classify("la nuova ia di google"), "ia");
        assert_eq!(classify("anthropic releases claude"), "ia");
    }

    #[test]
    fn test_padded_keywords_need_the_space() {
        // "ai" inside a word does not count, "ia" inside a word does not either
        assert_eq!(classify("said the maintainer"), DEFAULT_CATEGORY);
        assert_eq!(classify("mediaset cambia palinsesto"), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_literal_dot_in_keyword() {
        assert_eq!(classify("scenari con make.com"), "automazioni");
        assert_eq!(classify("make a com call"), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_produttivita() {
        assert_eq!(classify("metodo pomodoro per studiare"), "produttività");
        assert_eq!(classify("time blocking explained"), "produttività");
    }

    #[test]
    fn test_default_category() {
        assert_eq!(classify(""), DEFAULT_CATEGORY);
        assert_eq!(classify("notizie dal mondo"), DEFAULT_CATEGORY);
    }
}
