//! Language-model seam.
//!
//! The agent speaks to two logical model tiers: a *smart* model for
//! decisions, extraction, and long-form output, and a *fast* model for
//! classification and small judgments. Implementations wrap a specific
//! provider and handle its transport; all prompting and response parsing
//! stays on the agent side.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ModelResult;

/// A chat-style language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion. JSON-shaped answers are requested in the prompt
    /// and parsed defensively by the caller.
    async fn complete(&self, system: &str, user: &str) -> ModelResult<String>;

    /// Provider-visible model name, recorded on the summary.
    fn name(&self) -> &str;
}

/// The smart/fast pair a run is wired with.
#[derive(Clone)]
pub struct ModelSet {
    /// Reasoning, extraction, summarization
    pub smart: Arc<dyn LanguageModel>,

    /// Classification, relevance checks, validation
    pub fast: Arc<dyn LanguageModel>,
}

impl ModelSet {
    pub fn new(smart: Arc<dyn LanguageModel>, fast: Arc<dyn LanguageModel>) -> Self {
        Self { smart, fast }
    }

    /// Use one model for both tiers.
    pub fn single(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            smart: model.clone(),
            fast: model,
        }
    }
}
