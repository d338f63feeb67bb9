//! Deduplication of collected articles.
//!
//! Exact phase first: normalized-URL equality and content-hash equality.
//! Then a semantic phase: the fast model judges near-identical titles and
//! leads (syndicated reprints) in one small-cluster call. The
//! earliest-fetched member of every equivalence class survives, preserving
//! collection order. An unparseable semantic verdict keeps everything.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::events::{AgentEvent, Emitter};
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::ArticleContent;

#[derive(Deserialize)]
struct DedupResponse {
    groups: Vec<Vec<usize>>,
}

/// Collapse syntactic and semantic duplicates.
pub async fn deduplicate(
    fast: &dyn LanguageModel,
    articles: Vec<ArticleContent>,
    emitter: &Emitter,
) -> Vec<ArticleContent> {
    emitter.emit(AgentEvent::DedupStart { count: articles.len() });

    let exact = exact_phase(articles);
    let unique = if exact.len() >= 2 {
        semantic_phase(fast, exact).await
    } else {
        exact
    };

    emitter.emit(AgentEvent::DedupComplete { unique_count: unique.len() });
    unique
}

/// Drop later articles whose normalized URL or content hash was already
/// seen.
fn exact_phase(articles: Vec<ArticleContent>) -> Vec<ArticleContent> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_hashes: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(articles.len());

    for article in articles {
        let is_new_url = seen_urls.insert(article.url.clone());
        let is_new_hash = seen_hashes.insert(article.content_hash());
        if is_new_url && is_new_hash {
            out.push(article);
        } else {
            debug!(url = %article.url, "exact duplicate dropped");
        }
    }
    out
}

/// One fast-model call over numbered titles and leads. The model's
/// duplicate verdict is final; no numeric similarity cutoff is applied.
async fn semantic_phase(fast: &dyn LanguageModel, articles: Vec<ArticleContent>) -> Vec<ArticleContent> {
    let listing: String = articles
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {} - {}\n", i + 1, a.title, a.lead(40)))
        .collect();

    let user = prompts::DEDUP_PROMPT.replace("{articles}", &listing);

    let raw = match fast.complete(prompts::DEDUP_SYSTEM, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "semantic dedup model call failed, keeping all articles");
            return articles;
        }
    };

    let response: DedupResponse = match parse_llm_json(&raw) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "semantic dedup verdict unparseable, keeping all articles");
            return articles;
        }
    };

    // keep the earliest (lowest index) member of each group
    let mut drop: HashSet<usize> = HashSet::new();
    for group in &response.groups {
        let mut members: Vec<usize> = group
            .iter()
            .filter_map(|n| n.checked_sub(1))
            .filter(|i| *i < articles.len())
            .collect();
        members.sort_unstable();
        members.dedup();
        for later in members.iter().skip(1) {
            drop.insert(*later);
        }
    }

    articles
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !drop.contains(i))
        .map(|(_, a)| a)
        .collect()
}
