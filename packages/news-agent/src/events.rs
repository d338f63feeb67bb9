//! Lifecycle events for streaming progress.
//!
//! Every major step emits an [`AgentEvent`] through an [`Emitter`]. The
//! subscriber is optional; a headless run emits into the void. Events are
//! emitted synchronously in causal order: `init` first, then pipeline
//! events, and exactly one of `complete` or a terminal `error`.
//!
//! Serialized form is `{"event": "<stable name>", ...payload}`; the names
//! are part of the wire contract and never change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::types::{ArticleContent, DateConfidence, DateMethod, Intent, PageAction, Plan, SummaryResult};

/// Events produced during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AgentEvent {
    #[serde(rename = "init")]
    Init { prompt: String, seed_count: usize },

    #[serde(rename = "intent:extracted")]
    IntentExtracted { intent: Intent },

    #[serde(rename = "plan:created")]
    PlanCreated { plan: Plan },

    #[serde(rename = "nav:analyzing")]
    NavAnalyzing { url: String, depth: usize },

    #[serde(rename = "nav:decision")]
    NavDecision {
        url: String,
        action: PageAction,
        reasoning: String,
        confidence: f32,
    },

    #[serde(rename = "nav:direct_extraction")]
    NavDirectExtraction { url: String, reason: String },

    #[serde(rename = "nav:extracting_links")]
    NavExtractingLinks { url: String },

    #[serde(rename = "nav:extraction_success")]
    NavExtractionSuccess { found: usize },

    #[serde(rename = "fetch:phase_start")]
    FetchPhaseStart { total_urls: usize },

    #[serde(rename = "fetch:start")]
    FetchStart { url: String },

    #[serde(rename = "fetch:retry")]
    FetchRetry {
        url: String,
        attempt: u32,
        backoff_seconds: u64,
    },

    #[serde(rename = "fetch:error")]
    FetchError { url: String, reason: String },

    #[serde(rename = "fetch:fallback_start")]
    FetchFallbackStart { url: String },

    #[serde(rename = "fetch:fallback_success")]
    FetchFallbackSuccess { url: String },

    #[serde(rename = "date:extracted")]
    DateExtracted {
        url: String,
        date: Option<DateTime<Utc>>,
        confidence: DateConfidence,
        method: DateMethod,
    },

    #[serde(rename = "dedup:start")]
    DedupStart { count: usize },

    #[serde(rename = "dedup:complete")]
    DedupComplete { unique_count: usize },

    #[serde(rename = "reflect:complete")]
    ReflectComplete { quality_score: f32 },

    #[serde(rename = "summarize:start")]
    SummarizeStart { items_count: usize },

    #[serde(rename = "complete")]
    Complete { data: SummaryResult },

    #[serde(rename = "error")]
    Error { error: String },
}

impl AgentEvent {
    /// The stable wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            AgentEvent::Init { .. } => "init",
            AgentEvent::IntentExtracted { .. } => "intent:extracted",
            AgentEvent::PlanCreated { .. } => "plan:created",
            AgentEvent::NavAnalyzing { .. } => "nav:analyzing",
            AgentEvent::NavDecision { .. } => "nav:decision",
            AgentEvent::NavDirectExtraction { .. } => "nav:direct_extraction",
            AgentEvent::NavExtractingLinks { .. } => "nav:extracting_links",
            AgentEvent::NavExtractionSuccess { .. } => "nav:extraction_success",
            AgentEvent::FetchPhaseStart { .. } => "fetch:phase_start",
            AgentEvent::FetchStart { .. } => "fetch:start",
            AgentEvent::FetchRetry { .. } => "fetch:retry",
            AgentEvent::FetchError { .. } => "fetch:error",
            AgentEvent::FetchFallbackStart { .. } => "fetch:fallback_start",
            AgentEvent::FetchFallbackSuccess { .. } => "fetch:fallback_success",
            AgentEvent::DateExtracted { .. } => "date:extracted",
            AgentEvent::DedupStart { .. } => "dedup:start",
            AgentEvent::DedupComplete { .. } => "dedup:complete",
            AgentEvent::ReflectComplete { .. } => "reflect:complete",
            AgentEvent::SummarizeStart { .. } => "summarize:start",
            AgentEvent::Complete { .. } => "complete",
            AgentEvent::Error { .. } => "error",
        }
    }

    /// Convenience constructor for the date event.
    pub fn date_extracted(url: &str, article: &ArticleContent) -> Self {
        AgentEvent::DateExtracted {
            url: url.to_string(),
            date: article.published_date,
            confidence: article.date_confidence,
            method: article.date_method,
        }
    }
}

/// Receives events as they happen. Implementations must be cheap: emission
/// is synchronous on the run's task.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AgentEvent);
}

/// Sink that forwards events into a tokio channel. A dropped receiver is
/// tolerated; the run keeps going.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl ChannelSink {
    /// Create a sink plus the receiving half for the subscriber.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &AgentEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Cheap-clone handle the pipeline components emit through. Absence of a
/// sink is not an error; the agent runs correctly headless.
#[derive(Clone, Default)]
pub struct Emitter {
    sink: Option<Arc<dyn EventSink>>,
}

impl Emitter {
    /// Emitter backed by a subscriber.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Emitter for headless runs.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Emit one event.
    pub fn emit(&self, event: AgentEvent) {
        tracing::debug!(event = event.name(), "agent event");
        if let Some(sink) = &self.sink {
            sink.emit(&event);
        }
    }
}
