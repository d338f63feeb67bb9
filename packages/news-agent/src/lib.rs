//! # News Agent
//!
//! A goal-directed, LLM-driven news-extraction core. Given a user prompt
//! and seed URLs it discovers relevant articles, fetches their content
//! through an unblocking proxy, validates quality, deduplicates, and
//! produces a structured summary with numbered citations, streaming
//! lifecycle events along the way.
//!
//! ## Pipeline
//!
//! ```text
//! Intent -> Plan -> for each seed { Navigate (recursive) }
//!        -> Deduplicate -> Reflect -> Summarize
//! ```
//!
//! The navigator fetches a page, shows the model the page's actual link
//! set, and dispatches on one of four actions: extract the content,
//! harvest listing links, hop to one link, or stop. Safety bounds (depth,
//! article budget, visited set) are enforced in code regardless of what
//! the model answers.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use news_agent::{Agent, ModelSet, OpenAiModel, RunRequest, UnlockerFetcher};
//!
//! let fetcher = Arc::new(UnlockerFetcher::new("https://unlocker.internal/fetch"));
//! let models = ModelSet::new(
//!     Arc::new(OpenAiModel::from_env("gpt-4o")?),
//!     Arc::new(OpenAiModel::from_env("gpt-4o-mini")?),
//! );
//! let agent = Agent::new(fetcher, models);
//!
//! let summary = agent
//!     .run(RunRequest::new(
//!         "Marico news from the last 5 days",
//!         vec!["https://example.com/tag/marico".to_string()],
//!     ))
//!     .await?;
//!
//! for citation in &summary.citations {
//!     println!("{} {}", citation.label, citation.url);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`] - run orchestration and the stage implementations
//! - [`types`] - intents, decisions, articles, plans, summaries
//! - [`traits`] - the [`LanguageModel`] and [`PageFetcher`] seams
//! - [`model`] - OpenAI-compatible chat client
//! - [`fetch`] - proxy-unlocker fetcher and retry policy
//! - [`events`] - the lifecycle event stream
//! - [`testing`] - scripted mocks and HTML fixtures

pub mod config;
pub mod dates;
pub mod error;
pub mod events;
pub mod fetch;
pub mod html;
pub mod json;
pub mod model;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;
pub mod urls;
pub mod validate;

pub(crate) use pipeline::prompts;

// Re-export the public surface at crate root
pub use config::{AgentConfig, HARD_DEPTH_CEILING};
pub use error::{AgentError, FetchError, ModelError};
pub use events::{AgentEvent, ChannelSink, Emitter, EventSink};
pub use fetch::{RetryFetcher, UnlockerFetcher};
pub use model::OpenAiModel;
pub use pipeline::{Agent, NavigationState, Navigator, RunRequest};
pub use traits::{LanguageModel, ModelSet, PageFetcher};
pub use types::{
    ArticleContent, Citation, DateConfidence, DateMethod, FocusArea, Intent, LinkCandidate,
    OutputFormat, PageAction, PageDecision, PageType, Plan, Reflection, SeedLink, SummaryResult,
};
