//! Run orchestration.
//!
//! `Agent::run` is the only method the host calls. Control flow:
//! intent -> plan -> navigate each seed (recursive) -> dedup -> reflect ->
//! summarize, with events at every boundary. The collection phase runs
//! under the wall-clock budget; exceeding it yields a partial summary from
//! whatever was collected. Only invalid input, cancellation, and an
//! unreachable model at the intent stage escape as errors.

pub mod content;
pub mod decision;
pub mod dedup;
pub mod intent;
pub mod links;
pub mod navigator;
pub mod planner;
pub mod prompts;
pub mod reflect;
pub mod summarize;

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::events::{AgentEvent, Emitter, EventSink};
use crate::fetch::RetryFetcher;
use crate::traits::{ModelSet, PageFetcher};
use crate::types::{SeedLink, SummaryResult};

pub use navigator::{NavigationState, Navigator};

/// One extraction request.
pub struct RunRequest {
    pub prompt: String,
    pub seed_links: Vec<String>,
    pub max_articles: Option<usize>,
    pub sink: Option<Arc<dyn EventSink>>,
    pub cancel: Option<CancellationToken>,
}

impl RunRequest {
    pub fn new(prompt: impl Into<String>, seed_links: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            seed_links,
            max_articles: None,
            sink: None,
            cancel: None,
        }
    }

    /// Override the intent's article budget.
    pub fn with_max_articles(mut self, max: usize) -> Self {
        self.max_articles = Some(max);
        self
    }

    /// Subscribe to the run's event stream.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// The autonomous news-extraction agent.
pub struct Agent {
    fetcher: Arc<dyn PageFetcher>,
    models: ModelSet,
    config: AgentConfig,
}

impl Agent {
    pub fn new(fetcher: Arc<dyn PageFetcher>, models: ModelSet) -> Self {
        Self {
            fetcher,
            models,
            config: AgentConfig::default(),
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute one run. Always produces a well-formed [`SummaryResult`]
    /// unless the input is invalid, the run is cancelled, or the model is
    /// unreachable before navigation starts.
    pub async fn run(&self, request: RunRequest) -> Result<SummaryResult, AgentError> {
        let run_id = Uuid::now_v7();
        info!(run_id = %run_id, seed_count = request.seed_links.len(), "run started");

        let seeds = validate_request(&request)?;
        let emitter = match &request.sink {
            Some(sink) => Emitter::new(sink.clone()),
            None => Emitter::disabled(),
        };
        let cancel = request.cancel.clone().unwrap_or_default();
        let now = Utc::now();

        emitter.emit(AgentEvent::Init {
            prompt: request.prompt.clone(),
            seed_count: seeds.len(),
        });

        let mut parsed_intent =
            match intent::extract_intent(self.models.smart.as_ref(), &request.prompt, now, &self.config).await {
                Ok(parsed) => parsed,
                Err(error) => {
                    emitter.emit(AgentEvent::Error { error: error.to_string() });
                    return Err(error);
                }
            };
        if let Some(max) = request.max_articles {
            parsed_intent.max_articles = max.max(1);
        }
        emitter.emit(AgentEvent::IntentExtracted { intent: parsed_intent.clone() });

        let plan = planner::build_plan(self.models.fast.as_ref(), &parsed_intent, &seeds).await;
        emitter.emit(AgentEvent::PlanCreated { plan: plan.clone() });

        let retry_fetcher = RetryFetcher::new(self.fetcher.clone(), self.config.fetch_attempts, emitter.clone());
        let navigator = Navigator {
            fetcher: &retry_fetcher,
            models: &self.models,
            intent: &parsed_intent,
            plan: &plan,
            config: &self.config,
            emitter: emitter.clone(),
            cancel: cancel.clone(),
            now,
        };

        let mut state = NavigationState::new();
        let collection = async {
            for seed in &seeds {
                if cancel.is_cancelled() || state.collected.len() >= parsed_intent.max_articles {
                    break;
                }
                navigator.run_seed(seed, &mut state).await;
            }
        };
        if tokio::time::timeout(self.config.run_timeout, collection).await.is_err() {
            warn!(collected = state.collected.len(), "run timeout elapsed, summarizing partial collection");
        }

        if cancel.is_cancelled() {
            emitter.emit(AgentEvent::Error { error: "cancelled".to_string() });
            return Err(AgentError::Cancelled);
        }

        let unique = dedup::deduplicate(self.models.fast.as_ref(), state.collected, &emitter).await;

        let reflection = reflect::reflect(self.models.fast.as_ref(), &parsed_intent, &unique, &emitter).await;
        info!(
            quality = reflection.quality_score,
            coverage = reflection.coverage_of_intent,
            "reflection recorded"
        );

        let summary =
            summarize::summarize(self.models.smart.as_ref(), &parsed_intent, &unique, now, &emitter).await;

        if unique.is_empty() {
            emitter.emit(AgentEvent::Error {
                error: "no articles collected from any seed".to_string(),
            });
        }
        emitter.emit(AgentEvent::Complete { data: summary.clone() });

        Ok(summary)
    }
}

/// Reject empty prompts, empty seed lists, and unparseable seeds.
fn validate_request(request: &RunRequest) -> Result<Vec<SeedLink>, AgentError> {
    if request.prompt.trim().is_empty() {
        return Err(AgentError::InvalidInput { reason: "empty prompt".to_string() });
    }
    if request.seed_links.is_empty() {
        return Err(AgentError::InvalidInput { reason: "no seed links".to_string() });
    }

    let mut seeds = Vec::with_capacity(request.seed_links.len());
    for raw in &request.seed_links {
        if Url::parse(raw.trim()).is_err() {
            return Err(AgentError::InvalidInput {
                reason: format!("unparseable seed URL: {raw}"),
            });
        }
        seeds.push(SeedLink::new(raw));
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_prompt_and_missing_seeds() {
        let empty_prompt = RunRequest::new("   ", vec!["https://example.com".to_string()]);
        assert!(matches!(validate_request(&empty_prompt), Err(AgentError::InvalidInput { .. })));

        let no_seeds = RunRequest::new("news please", vec![]);
        assert!(matches!(validate_request(&no_seeds), Err(AgentError::InvalidInput { .. })));

        let bad_seed = RunRequest::new("news please", vec!["not a url".to_string()]);
        assert!(matches!(validate_request(&bad_seed), Err(AgentError::InvalidInput { .. })));
    }

    #[test]
    fn seeds_normalized_on_validation() {
        let request = RunRequest::new(
            "news please",
            vec!["https://Example.com/tag/x/?utm_source=a".to_string()],
        );
        let seeds = validate_request(&request).unwrap();
        assert_eq!(seeds[0].url, "https://example.com/tag/x");
    }
}
