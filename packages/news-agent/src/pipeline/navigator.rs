//! Recursive navigation from seed to articles.
//!
//! The navigator owns all per-run mutable state. Entry checks run in a
//! fixed order (ceiling, budget, cancellation, visited), then one page is
//! fetched, one decision made, and dispatch is an exhaustive match. The
//! recursion is sequential; concurrency lives below it at the LLM batch
//! boundary.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{AgentConfig, HARD_DEPTH_CEILING};
use crate::events::{AgentEvent, Emitter};
use crate::pipeline::{content, decision, links};
use crate::traits::{ModelSet, PageFetcher};
use crate::types::{ArticleContent, Intent, PageAction, Plan, SeedLink};
use crate::urls;

/// Transient per-run state. Created at run start, destroyed at
/// summarization or error; nothing survives across runs.
pub struct NavigationState {
    /// Normalized URLs already fetched
    pub visited: HashSet<String>,

    /// Accepted articles in fetch-completion order
    pub collected: Vec<ArticleContent>,

    /// Raw HTML of fetched seed pages, kept for the seed-as-article
    /// fallback so no URL is ever fetched twice
    seed_html: HashMap<String, String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
            collected: Vec::new(),
            seed_html: HashMap::new(),
        }
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

/// The recursive page walker for one run.
pub struct Navigator<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub models: &'a ModelSet,
    pub intent: &'a Intent,
    pub plan: &'a Plan,
    pub config: &'a AgentConfig,
    pub emitter: Emitter,
    pub cancel: CancellationToken,
    pub now: DateTime<Utc>,
}

impl<'a> Navigator<'a> {
    /// Walk one seed. When the walk collects nothing, retry the seed
    /// itself as an article before giving up.
    pub async fn run_seed(&self, seed: &SeedLink, state: &mut NavigationState) {
        let before = state.collected.len();
        let depth = seed.depth_override.unwrap_or(0);
        self.navigate(seed.url.clone(), depth, state).await;

        if state.collected.len() == before && !self.cancel.is_cancelled() {
            self.seed_fallback(seed, state).await;
        }
    }

    /// Recursive descent. Boxed because async recursion needs a nameable
    /// future type.
    fn navigate<'s>(&'s self, url: String, depth: usize, state: &'s mut NavigationState) -> LocalBoxFuture<'s, ()> {
        Box::pin(self.navigate_inner(url, depth, state))
    }

    async fn navigate_inner<'s>(&'s self, url: String, depth: usize, state: &'s mut NavigationState) {
        {
            if depth >= HARD_DEPTH_CEILING {
                warn!(url = %url, depth, "hard depth ceiling reached");
                return;
            }
            if state.collected.len() >= self.intent.max_articles {
                return;
            }
            if self.cancel.is_cancelled() {
                return;
            }

            let normalized = urls::normalize(&url);
            if !state.visited.insert(normalized.clone()) {
                debug!(url = %url, "already visited, skipping");
                return;
            }

            self.emitter.emit(AgentEvent::NavAnalyzing { url: url.clone(), depth });

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!(url = %url, error = %e, "page fetch failed, branch abandoned");
                    return;
                }
            };
            if depth == 0 {
                state.seed_html.insert(normalized, html.clone());
            }

            let Ok(base) = Url::parse(&url) else {
                return;
            };
            let page_links = crate::html::extract_links(&base, &html);
            let excerpt = crate::html::clean_excerpt(&html, self.config.excerpt_chars);

            let decision = decision::decide_page(
                self.models.smart.as_ref(),
                &url,
                depth,
                self.intent,
                self.plan,
                &page_links,
                &excerpt,
                self.config,
            )
            .await;

            self.emitter.emit(AgentEvent::NavDecision {
                url: url.clone(),
                action: decision.action,
                reasoning: decision.reasoning.clone(),
                confidence: decision.confidence,
            });

            match decision.action {
                PageAction::ExtractContent => {
                    if depth == 0 && decision.ready_to_extract {
                        // the seed IS the article: no listing or link logic
                        self.emitter.emit(AgentEvent::NavDirectExtraction {
                            url: url.clone(),
                            reason: decision.reasoning.clone(),
                        });
                    }
                    let accepted = content::extract_and_accept(
                        self.models,
                        &html,
                        &url,
                        self.intent,
                        self.now,
                        self.config,
                        &self.emitter,
                    )
                    .await;
                    if let Some(article) = accepted {
                        if state.collected.len() < self.intent.max_articles {
                            state.collected.push(article);
                            self.emitter.emit(AgentEvent::NavExtractionSuccess { found: 1 });
                        }
                    }
                }

                PageAction::ExtractLinks => {
                    self.emitter.emit(AgentEvent::NavExtractingLinks { url: url.clone() });
                    let candidates =
                        links::select_article_links(self.models, &page_links, self.intent, self.config).await;

                    let before = state.collected.len();
                    self.emitter.emit(AgentEvent::FetchPhaseStart { total_urls: candidates.len() });

                    for candidate in candidates.iter().take(self.config.links_per_page) {
                        if state.collected.len() >= self.intent.max_articles {
                            break;
                        }
                        if self.cancel.is_cancelled() {
                            break;
                        }
                        self.navigate(candidate.url.clone(), depth + 1, state).await;
                    }

                    let found = state.collected.len() - before;
                    self.emitter.emit(AgentEvent::NavExtractionSuccess { found });
                }

                PageAction::NavigateTo => {
                    // membership in the page's link set was enforced with
                    // the decision; an invalid target never reaches here
                    if let Some(target) = decision.target_url {
                        self.navigate(target, depth + 1, state).await;
                    }
                }

                PageAction::Stop => {
                    info!(url = %url, reasoning = %decision.reasoning, "navigation stopped");
                }
            }
        }
    }

    /// Treat an exhausted seed as an article, reusing the HTML captured
    /// during navigation so the URL is not fetched twice.
    async fn seed_fallback(&self, seed: &SeedLink, state: &mut NavigationState) {
        let normalized = urls::normalize(&seed.url);
        let Some(html) = state.seed_html.get(&normalized).cloned() else {
            debug!(url = %seed.url, "no seed HTML captured, fallback skipped");
            return;
        };

        self.emitter.emit(AgentEvent::FetchFallbackStart { url: seed.url.clone() });

        let accepted = content::extract_and_accept(
            self.models,
            &html,
            &seed.url,
            self.intent,
            self.now,
            self.config,
            &self.emitter,
        )
        .await;

        if let Some(article) = accepted {
            if state.collected.len() < self.intent.max_articles {
                state.collected.push(article);
                self.emitter.emit(AgentEvent::FetchFallbackSuccess { url: seed.url.clone() });
            }
        }
    }
}
