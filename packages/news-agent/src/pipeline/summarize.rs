//! Final summary rendering.
//!
//! The smart model writes the briefing; the code owns the citations.
//! Articles are presented numbered, the model cites by number, and
//! post-processing guarantees closure: every `[n]` in the output resolves
//! to the n-th collected article, and every bullet carries at least one
//! marker. A failed model call degrades to a mechanical summary rather
//! than failing the run.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::events::{AgentEvent, Emitter};
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::{ArticleContent, Citation, Intent, OutputFormat, SummaryResult};

/// Characters of article text shown to the model per article.
const TEXT_BUDGET_PER_ARTICLE: usize = 1500;

#[derive(Deserialize)]
struct SummarizeResponse {
    summary_markdown: String,
    #[serde(default)]
    bullets: Vec<BulletItem>,
}

#[derive(Deserialize)]
struct BulletItem {
    text: String,
    #[serde(default)]
    sources: Vec<usize>,
}

/// Render the terminal summary for the run.
pub async fn summarize(
    smart: &dyn LanguageModel,
    intent: &Intent,
    articles: &[ArticleContent],
    now: DateTime<Utc>,
    emitter: &Emitter,
) -> SummaryResult {
    emitter.emit(AgentEvent::SummarizeStart { items_count: articles.len() });

    if articles.is_empty() {
        return SummaryResult::empty(
            format!(
                "No articles about \"{}\" could be collected from the provided sources \
                 within the last {} days. The pages may be paywalled, off-topic, or \
                 outside the time window.",
                intent.topic, intent.time_range_days
            ),
            smart.name(),
        );
    }

    let citations: Vec<Citation> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| Citation::for_article(i + 1, article, now))
        .collect();

    let digest: String = articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let date = article
                .published_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "date unknown".to_string());
            format!(
                "[{}] {} ({})\n{}\n\n",
                i + 1,
                article.title,
                date,
                crate::html::truncate_chars(&article.text, TEXT_BUDGET_PER_ARTICLE)
            )
        })
        .collect();

    let user = prompts::SUMMARIZE_PROMPT
        .replace("{topic}", &intent.topic)
        .replace("{format_instructions}", format_instructions(intent.output_format))
        .replace("{articles}", &digest);

    let response = match smart.complete(prompts::SUMMARIZE_SYSTEM, &user).await {
        Ok(raw) => match parse_llm_json::<SummarizeResponse>(&raw) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!(error = %e, "summary unparseable, rendering mechanical summary");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "summary model call failed, rendering mechanical summary");
            None
        }
    };

    let Some(response) = response else {
        return mechanical_summary(intent, articles, citations, smart.name());
    };

    let bullet_points = render_bullets(response.bullets, articles.len());
    let summary_markdown = scrub_markers(&response.summary_markdown, articles.len());

    if bullet_points.is_empty() {
        return mechanical_summary(intent, articles, citations, smart.name());
    }

    SummaryResult {
        summary_markdown,
        bullet_points,
        citations,
        model: smart.name().to_string(),
    }
}

fn format_instructions(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::ExecutiveSummary => prompts::FORMAT_EXECUTIVE,
        OutputFormat::CategorizedBullets => prompts::FORMAT_CATEGORIZED,
        OutputFormat::ConciseBullets => prompts::FORMAT_CONCISE,
        OutputFormat::Detailed => prompts::FORMAT_DETAILED,
    }
}

/// Render bullets with code-owned markers. Sources outside `1..=count` are
/// dropped; a bullet left sourceless is dropped entirely, keeping the
/// closure property unconditional.
fn render_bullets(bullets: Vec<BulletItem>, count: usize) -> Vec<String> {
    bullets
        .into_iter()
        .filter_map(|bullet| {
            let mut seen = std::collections::HashSet::new();
            let sources: Vec<usize> = bullet
                .sources
                .into_iter()
                .filter(|n| (1..=count).contains(n))
                .filter(|n| seen.insert(*n))
                .collect();
            if sources.is_empty() {
                return None;
            }
            let markers: String = sources.iter().map(|n| format!("[{n}]")).collect();
            let text = scrub_markers(&bullet.text, 0);
            Some(format!("{} {}", text.trim(), markers))
        })
        .collect()
}

/// Remove `[n]` markers that do not resolve to a collected article. With
/// `count == 0` every marker is removed (used on bullet text before the
/// code re-attaches markers).
fn scrub_markers(text: &str, count: usize) -> String {
    let marker = Regex::new(r"\[(\d+)\]").expect("static regex");
    let scrubbed = marker.replace_all(text, |caps: &regex::Captures<'_>| {
        match caps[1].parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => caps[0].to_string(),
            _ => String::new(),
        }
    });
    scrubbed.into_owned()
}

/// Title-level summary used when the model cannot produce one. Partial
/// output beats none; every bullet still cites its article.
fn mechanical_summary(
    intent: &Intent,
    articles: &[ArticleContent],
    citations: Vec<Citation>,
    model: &str,
) -> SummaryResult {
    let bullet_points: Vec<String> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| format!("{} [{}]", article.title, i + 1))
        .collect();

    let mut markdown = format!("## {} briefing\n\n", intent.topic);
    for bullet in &bullet_points {
        markdown.push_str(&format!("- {bullet}\n"));
    }

    SummaryResult {
        summary_markdown: markdown,
        bullet_points,
        citations,
        model: model.to_string(),
    }
}
