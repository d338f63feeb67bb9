//! Link extraction from listing pages.
//!
//! Two stages. The fast model classifies anchors in batches (concurrent,
//! bounded fan-out); the smart model then ranks the article-shaped
//! candidates by relevance to the intent. Output is capped at 20 per page;
//! the navigator caps again at the intent's article budget.

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::dates;
use crate::html::PageLink;
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::ModelSet;
use crate::types::{Intent, LinkCandidate};

#[derive(Deserialize)]
struct ClassifyResponse {
    classifications: Vec<Classification>,
}

#[derive(Deserialize)]
struct Classification {
    index: usize,
    kind: String,
}

#[derive(Deserialize)]
struct RankResponse {
    ranked: Vec<Ranked>,
}

#[derive(Deserialize)]
struct Ranked {
    index: usize,
    relevance: f32,
    #[serde(default)]
    date: Option<String>,
}

/// Select and rank article links from a listing page.
pub async fn select_article_links(
    models: &ModelSet,
    links: &[PageLink],
    intent: &Intent,
    config: &AgentConfig,
) -> Vec<LinkCandidate> {
    if links.is_empty() {
        return Vec::new();
    }

    let article_links = classify_batches(models, links, config).await;
    if article_links.is_empty() {
        debug!("no article-shaped links survived classification");
        return Vec::new();
    }

    rank_links(models, &article_links, intent, config).await
}

/// Classify anchors in concurrent batches; keep the article-shaped ones in
/// page order.
async fn classify_batches(models: &ModelSet, links: &[PageLink], config: &AgentConfig) -> Vec<PageLink> {
    let batches: Vec<(usize, &[PageLink])> = links
        .chunks(config.classify_batch_size)
        .enumerate()
        .map(|(i, chunk)| (i * config.classify_batch_size, chunk))
        .collect();

    let mut results: Vec<(usize, Vec<PageLink>)> = stream::iter(batches)
        .map(|(offset, chunk)| {
            let fast = models.fast.clone();
            async move {
                let listing: String = chunk
                    .iter()
                    .enumerate()
                    .map(|(i, link)| format!("{}. \"{}\" -> {}\n", i + 1, link.text, link.url))
                    .collect();
                let user = prompts::CLASSIFY_LINKS_PROMPT.replace("{links}", &listing);

                let kept = match fast.complete(prompts::CLASSIFY_LINKS_SYSTEM, &user).await {
                    Ok(raw) => match parse_llm_json::<ClassifyResponse>(&raw) {
                        Ok(response) => response
                            .classifications
                            .into_iter()
                            .filter(|c| c.kind == "article")
                            .filter_map(|c| c.index.checked_sub(1))
                            .filter_map(|i| chunk.get(i).cloned())
                            .collect(),
                        Err(e) => {
                            warn!(error = %e, "classification batch unparseable, dropping batch");
                            Vec::new()
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "classification batch failed, dropping batch");
                        Vec::new()
                    }
                };
                (offset, kept)
            }
        })
        .buffer_unordered(config.llm_fan_out)
        .collect()
        .await;

    results.sort_by_key(|(offset, _)| *offset);
    results.into_iter().flat_map(|(_, kept)| kept).collect()
}

/// Rank classified candidates by relevance; keep the top `links_per_page`.
async fn rank_links(
    models: &ModelSet,
    candidates: &[PageLink],
    intent: &Intent,
    config: &AgentConfig,
) -> Vec<LinkCandidate> {
    let listing: String = candidates
        .iter()
        .enumerate()
        .map(|(i, link)| format!("{}. \"{}\" -> {}\n", i + 1, link.text, link.url))
        .collect();

    let user = prompts::RANK_LINKS_PROMPT
        .replace("{topic}", &intent.topic)
        .replace("{section}", intent.target_section.as_deref().unwrap_or("(none)"))
        .replace("{links}", &listing);

    let raw = match models.smart.complete(prompts::RANK_LINKS_SYSTEM, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "ranking model call failed, returning no links");
            return Vec::new();
        }
    };

    let response: RankResponse = match parse_llm_json(&raw) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "ranking response unparseable, returning no links");
            return Vec::new();
        }
    };

    let mut out: Vec<LinkCandidate> = response
        .ranked
        .into_iter()
        .filter_map(|ranked| {
            let link = candidates.get(ranked.index.checked_sub(1)?)?;
            let mut candidate = LinkCandidate::new(&link.url, &link.text, ranked.relevance);
            if let Some(date) = ranked.date.as_deref().and_then(dates::parse_listing_date) {
                candidate = candidate.with_date(date);
            }
            Some(candidate)
        })
        .collect();

    out.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));
    out.truncate(config.links_per_page);
    out
}
