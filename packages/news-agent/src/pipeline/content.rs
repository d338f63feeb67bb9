//! Article extraction and acceptance.
//!
//! One entry point runs the full gate sequence for a candidate article
//! page: focus pre-filter, smart-model extraction, authoritative date
//! parsing, content validation, time-window check, topic relevance
//! quick-check. Every rejection is a normal outcome, logged and skipped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::AgentConfig;
use crate::dates;
use crate::events::{AgentEvent, Emitter};
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::ModelSet;
use crate::types::{ArticleContent, DateConfidence, DateMethod, Intent};
use crate::validate;

#[derive(Deserialize)]
struct ExtractResponse {
    title: String,
    #[serde(default)]
    text: String,
    /// Forum threads come back as individual posts in reading order
    #[serde(default)]
    posts: Vec<String>,
    #[serde(default)]
    publish_date: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    quality_score: Option<f32>,
}

impl ExtractResponse {
    fn body(&self) -> String {
        if !self.text.trim().is_empty() {
            return self.text.clone();
        }
        self.posts.join("\n\n")
    }
}

#[derive(Deserialize)]
struct RelevanceResponse {
    relevant: bool,
}

/// Extract an article from `html` and run every acceptance gate. Returns
/// `None` when any gate rejects; the reason is logged, not surfaced.
pub async fn extract_and_accept(
    models: &ModelSet,
    html: &str,
    url: &str,
    intent: &Intent,
    now: DateTime<Utc>,
    config: &AgentConfig,
    emitter: &Emitter,
) -> Option<ArticleContent> {
    let mut article = extract_article(models, html, url, now, config).await?;

    // The date parser is authoritative; the extraction's date is advisory
    // and only fills in when every parser strategy came up empty.
    let advisory = article.published_date;
    let parsed = dates::parse_publication_date(models.smart.as_ref(), html, url, now, config).await;
    article = match (parsed.date, advisory) {
        (Some(_), _) => article.with_date(parsed.date, parsed.confidence, parsed.method),
        (None, Some(_)) => article.with_date(advisory, DateConfidence::Low, DateMethod::Llm),
        (None, None) => article.with_date(None, DateConfidence::Low, DateMethod::None),
    };
    emitter.emit(AgentEvent::date_extracted(url, &article));

    let verdict = validate::validate_article(models.fast.as_ref(), &article, config).await;
    if !verdict.is_valid() {
        debug!(url = %url, reason = %verdict.reason(), "article rejected by validator");
        return None;
    }

    if !intent.within_window(article.published_date) {
        debug!(url = %url, date = ?article.published_date, "article outside time window");
        return None;
    }

    if !is_relevant(models, &article, intent, now).await {
        debug!(url = %url, "article rejected as off-topic");
        return None;
    }

    info!(url = %url, title = %article.title, words = article.word_count, "article accepted");
    Some(article)
}

/// Run the smart model over focused HTML to produce the raw article.
async fn extract_article(
    models: &ModelSet,
    html: &str,
    url: &str,
    now: DateTime<Utc>,
    config: &AgentConfig,
) -> Option<ArticleContent> {
    // The focus pass keeps the plausible main-content container, roughly
    // halving the tokens sent to the model on typical pages.
    let focused = crate::html::focus_content(html);
    let bounded = crate::html::truncate_chars(&focused, config.excerpt_chars * 2);

    let user = prompts::EXTRACT_PROMPT.replace("{url}", url).replace("{html}", &bounded);

    let raw = match models.smart.complete(prompts::EXTRACT_SYSTEM, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(url = %url, error = %e, "content extraction model call failed");
            return None;
        }
    };

    let response: ExtractResponse = match parse_llm_json(&raw) {
        Ok(response) => response,
        Err(e) => {
            debug!(url = %url, error = %e, "content extraction unparseable");
            return None;
        }
    };

    let body = response.body();
    if body.trim().is_empty() {
        return None;
    }

    let mut article = ArticleContent::new(url, response.title.clone(), body, now)
        .with_quality(response.quality_score.unwrap_or(0.5));
    if let Some(language) = response.language {
        article = article.with_language(language);
    }
    if let Some(date) = response.publish_date.as_deref().and_then(dates::parse_iso_like) {
        // advisory only; replaced by the date parser unless it finds nothing
        article = article.with_date(Some(date), DateConfidence::Low, DateMethod::Llm);
    }
    Some(article)
}

/// Topic-fit quick-check on the fast model. Date filtering already
/// happened; the model is told so and judges topic only. An unparseable
/// answer accepts: relevance is a filter, not a gatekeeper of last resort.
async fn is_relevant(models: &ModelSet, article: &ArticleContent, intent: &Intent, now: DateTime<Utc>) -> bool {
    let user = prompts::RELEVANCE_PROMPT
        .replace("{today}", &now.format("%Y-%m-%d").to_string())
        .replace("{topic}", &intent.topic)
        .replace("{section}", intent.target_section.as_deref().unwrap_or("(none)"))
        .replace("{title}", &article.title)
        .replace("{lead}", &article.lead(60));

    match models.fast.complete(prompts::RELEVANCE_SYSTEM, &user).await {
        Ok(raw) => parse_llm_json::<RelevanceResponse>(&raw)
            .map(|r| r.relevant)
            .unwrap_or(true),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{article_page, MockModel};

    fn long_text(words: usize) -> String {
        std::iter::repeat("quarterly results and segment commentary from management")
            .take(words / 8 + 1)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn extraction_json(words: usize) -> String {
        format!(
            r#"{{"title": "Quarterly Results", "text": "{}", "publish_date": null, "language": "en", "quality_score": 0.8}}"#,
            long_text(words)
        )
    }

    fn accepting_model(words: usize) -> Arc<MockModel> {
        Arc::new(
            MockModel::new()
                .on(&["Extract the article"], &extraction_json(words))
                .on(&["publication date"], r#"{"date": "unknown", "confidence": "low"}"#)
                .on(&["paywall"], r#"{"paywalled": false}"#)
                .on(&["Judge topic fit"], r#"{"relevant": true}"#),
        )
    }

    #[tokio::test]
    async fn accepts_valid_on_topic_article() {
        let now = Utc::now();
        let models = ModelSet::single(accepting_model(200));
        let intent = Intent::new("marico", 7, 10, now);
        let recent = (now - chrono::Duration::days(2)).format("%Y-%m-%dT00:00:00Z").to_string();
        let html = article_page("Quarterly Results", &recent, 200);

        let article = extract_and_accept(
            &models,
            &html,
            "https://example.com/news/q2",
            &intent,
            now,
            &AgentConfig::default(),
            &Emitter::disabled(),
        )
        .await
        .expect("article should be accepted");

        // date parser fell through to metadata: JSON-LD datePublished
        assert_eq!(article.date_method, DateMethod::Metadata);
        assert_eq!(article.date_confidence, DateConfidence::High);
        assert!(article.word_count >= 150);
    }

    #[tokio::test]
    async fn rejects_article_outside_window() {
        let now = Utc::now();
        let models = ModelSet::single(accepting_model(200));
        let intent = Intent::new("marico", 5, 10, now);
        let stale = (now - chrono::Duration::days(30)).format("%Y-%m-%dT00:00:00Z").to_string();
        let html = article_page("Old News", &stale, 200);

        let result = extract_and_accept(
            &models,
            &html,
            "https://example.com/news/old",
            &intent,
            now,
            &AgentConfig::default(),
            &Emitter::disabled(),
        )
        .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn rejects_off_topic_article() {
        let now = Utc::now();
        let model = Arc::new(
            MockModel::new()
                .on(&["Extract the article"], &extraction_json(200))
                .on(&["publication date"], r#"{"date": "unknown", "confidence": "low"}"#)
                .on(&["paywall"], r#"{"paywalled": false}"#)
                .on(&["Judge topic fit"], r#"{"relevant": false}"#),
        );
        let models = ModelSet::single(model);
        let intent = Intent::new("marico", 7, 10, now);
        let recent = (now - chrono::Duration::days(1)).format("%Y-%m-%dT00:00:00Z").to_string();
        let html = article_page("Unrelated", &recent, 200);

        let result = extract_and_accept(
            &models,
            &html,
            "https://example.com/news/offtopic",
            &intent,
            now,
            &AgentConfig::default(),
            &Emitter::disabled(),
        )
        .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn forum_posts_become_the_body() {
        let now = Utc::now();
        let posts: Vec<String> = (0..30)
            .map(|i| format!("\"post number {i} with some discussion about the quarterly numbers\""))
            .collect();
        let response = format!(
            r#"{{"title": "Thread", "text": "", "posts": [{}], "language": "en", "quality_score": 0.7}}"#,
            posts.join(", ")
        );
        let model = Arc::new(
            MockModel::new()
                .on(&["Extract the article"], &response)
                .on(&["publication date"], r#"{"date": "unknown", "confidence": "low"}"#)
                .on(&["paywall"], r#"{"paywalled": false}"#)
                .on(&["Judge topic fit"], r#"{"relevant": true}"#),
        );
        let models = ModelSet::single(model);
        let intent = Intent::new("marico", 7, 10, now);

        let article = extract_and_accept(
            &models,
            "<html><body><p>thread page</p></body></html>",
            "https://example.com/forum/thread-9",
            &intent,
            now,
            &AgentConfig::default(),
            &Emitter::disabled(),
        )
        .await
        .expect("thread should be accepted");

        assert!(article.text.contains("post number 0"));
        assert!(article.word_count >= 150);
    }

    #[tokio::test]
    async fn unparseable_extraction_yields_none() {
        let now = Utc::now();
        let model = Arc::new(MockModel::new().on(&["Extract the article"], "not json"));
        let models = ModelSet::single(model);
        let intent = Intent::new("marico", 7, 10, now);

        let result = extract_and_accept(
            &models,
            "<html><body><p>x</p></body></html>",
            "https://example.com/x",
            &intent,
            now,
            &AgentConfig::default(),
            &Emitter::disabled(),
        )
        .await;
        assert!(result.is_none());
    }
}
