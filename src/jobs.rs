//! The two snapshot jobs.
//!
//! Both run the same pipeline and differ only in selection and tagging:
//!
//! | Job | Selection | Tag |
//! |-----|-----------|-----|
//! | [`run_articles`] | `max_items` most recent keyword matches | `categoria` |
//! | [`run_models`] | most recent match per model | `modello` |
//!
//! Translation runs after selection so only published items cost a request.

use crate::classify::classify;
use crate::config::{FeedSources, ModelSources};
use crate::models::{FeedItem, Snapshot};
use crate::pipeline::{keyword_filter, select_latest, select_per_model};
use crate::scrapers::feed::collect_feeds;
use crate::translate::{Translate, Translator};
use reqwest::Client;
use tracing::{info, instrument};

/// Build the all-items snapshot.
#[instrument(level = "info", skip_all)]
pub async fn run_articles<T: Translate>(
    client: &Client,
    translator: &mut Translator<T>,
    sources: &FeedSources,
    fetch_og: bool,
) -> Snapshot {
    let rows = collect_feeds(client, &sources.feeds, sources.max_entries_per_feed, fetch_og).await;
    let collected = rows.len();
    let rows = keyword_filter(rows, &sources.keywords);
    let matched = rows.len();
    let selected = select_latest(rows, sources.max_items);
    info!(collected, matched, selected = selected.len(), "Selected articles");

    let mut items = Vec::with_capacity(selected.len());
    for item in selected {
        let item = translated(translator, item).await;
        let categoria = classify(&item.match_text());
        let mut out = item.into_output();
        out.categoria = Some(categoria.to_string());
        items.push(out);
    }
    Snapshot::new(items)
}

/// Build the best-per-model snapshot.
#[instrument(level = "info", skip_all)]
pub async fn run_models<T: Translate>(
    client: &Client,
    translator: &mut Translator<T>,
    sources: &ModelSources,
    fetch_og: bool,
) -> Snapshot {
    let rows = collect_feeds(client, &sources.feeds, sources.max_entries_per_feed, fetch_og).await;
    let collected = rows.len();
    let picked = select_per_model(rows, &sources.models);
    info!(
        collected,
        models = sources.models.len(),
        picked = picked.len(),
        "Selected best item per model"
    );

    let mut items = Vec::with_capacity(picked.len());
    for (model, item) in picked {
        let mut out = translated(translator, item).await.into_output();
        out.modello = Some(model);
        items.push(out);
    }
    Snapshot::new(items)
}

async fn translated<T: Translate>(translator: &mut Translator<T>, mut item: FeedItem) -> FeedItem {
    let (title, description) = translator.maybe_translate(&item.title, &item.description).await;
    item.title = title;
    item.description = description;
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelRule, TranslateSettings};
    use crate::translate::LibreTranslate;
    use indexmap::IndexMap;
    use std::time::Duration;

    fn client() -> Client {
        crate::scrapers::build_client("TestBot/1.0", Duration::from_secs(5)).unwrap()
    }

    fn feed(entries: &[(&str, &str, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(title, link, date)| {
                format!("<item><title>{title}</title><link>{link}</link><pubDate>{date}</pubDate></item>")
            })
            .collect();
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Feed</title><link>https://f.example/</link><description>d</description>{items}</channel></rss>"#
        )
    }

    async fn serve(server: &mut mockito::Server, path: &str, body: String) -> mockito::Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_run_articles_filters_dedups_and_tags() {
        let mut server = mockito::Server::new_async().await;
        let _a = serve(
            &mut server,
            "/a",
            feed(&[
                ("Notion aggiunge database", "https://x/1", "Mon, 02 Jun 2025 10:00:00 GMT"),
                ("Previsioni meteo", "https://x/2", "Mon, 02 Jun 2025 11:00:00 GMT"),
                ("Nuovo tool per Zapier", "https://x/3", "Mon, 02 Jun 2025 09:00:00 GMT"),
            ]),
        )
        .await;
        let _b = serve(
            &mut server,
            "/b",
            feed(&[("Notion aggiunge database (aggiornato)", "https://x/1", "Mon, 02 Jun 2025 12:00:00 GMT")]),
        )
        .await;

        let sources = FeedSources {
            feeds: vec![format!("{}/a", server.url()), format!("{}/b", server.url())],
            keywords: vec!["notion".to_string(), "zapier".to_string()],
            max_items: 24,
            max_entries_per_feed: 60,
        };
        let mut translator: Translator<LibreTranslate> = Translator::disabled();
        let snapshot = run_articles(&client(), &mut translator, &sources, false).await;

        let got: Vec<(&str, &str, Option<&str>)> = snapshot
            .items
            .iter()
            .map(|i| (i.link.as_str(), i.titolo.as_str(), i.categoria.as_deref()))
            .collect();
        assert_eq!(
            got,
            [
                ("https://x/1", "Notion aggiunge database (aggiornato)", Some("notion")),
                ("https://x/3", "Nuovo tool per Zapier", Some("automazioni")),
            ]
        );
        assert_eq!(snapshot.items[0].data, "2025-06-02T12:00:00+00:00");
        assert!(snapshot.items.iter().all(|i| i.modello.is_none()));
    }

    #[tokio::test]
    async fn test_run_models_translates_selected_items() {
        let mut server = mockito::Server::new_async().await;
        let _feed = serve(
            &mut server,
            "/ia",
            feed(&[
                ("Claude learns to code", "https://y/1", "Mon, 02 Jun 2025 10:00:00 GMT"),
                ("Copilot arriva in Excel", "https://y/2", "Mon, 02 Jun 2025 08:00:00 GMT"),
            ]),
        )
        .await;
        let _detect_en = server
            .mock("POST", "/detect")
            .match_body(mockito::Matcher::UrlEncoded("q".into(), "Claude learns to code".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"language": "en", "confidence": 95.0}]"#)
            .create_async()
            .await;
        let _detect_it = server
            .mock("POST", "/detect")
            .match_body(mockito::Matcher::UrlEncoded("q".into(), "Copilot arriva in Excel".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"language": "it", "confidence": 80.0}]"#)
            .create_async()
            .await;
        let translate = server
            .mock("POST", "/translate")
            .match_body(mockito::Matcher::UrlEncoded("q".into(), "Claude learns to code".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"translatedText": "Claude impara a programmare"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut models = IndexMap::new();
        models.insert("claude".to_string(), ModelRule { keywords: vec!["claude".to_string()] });
        models.insert("gemini".to_string(), ModelRule { keywords: vec!["gemini".to_string()] });
        models.insert("copilot".to_string(), ModelRule { keywords: vec!["copilot".to_string()] });
        let sources = ModelSources {
            feeds: vec![format!("{}/ia", server.url())],
            models,
            max_entries_per_feed: 80,
        };
        let backend = LibreTranslate::new(
            client(),
            &TranslateSettings {
                translate_url: format!("{}/translate", server.url()),
                detect_url: format!("{}/detect", server.url()),
                api_key: None,
            },
        );
        let mut translator = Translator::new(backend);

        let snapshot = run_models(&client(), &mut translator, &sources, false).await;

        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].modello.as_deref(), Some("claude"));
        assert_eq!(snapshot.items[0].titolo, "Claude impara a programmare");
        assert_eq!(snapshot.items[1].modello.as_deref(), Some("copilot"));
        assert_eq!(snapshot.items[1].titolo, "Copilot arriva in Excel");
        assert!(snapshot.items.iter().all(|i| i.categoria.is_none()));
        translate.assert_async().await;
    }
}
