//! Run configuration.
//!
//! An immutable [`AgentConfig`] is handed to the agent at construction;
//! nothing inside a run mutates it. Every numeric safety bound lives here,
//! except the hard recursion ceiling which is deliberately not configurable.

use std::time::Duration;

/// Recursion depth no decision can push past, regardless of configuration.
pub const HARD_DEPTH_CEILING: usize = 3;

/// Configuration for the extraction agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum navigation depth under normal operation (seed = 0).
    pub max_depth: usize,

    /// Fetch attempts per URL, including the first.
    pub fetch_attempts: u32,

    /// Timeout for a single fetch attempt.
    pub fetch_timeout: Duration,

    /// Timeout for a single model call.
    pub model_timeout: Duration,

    /// Wall-clock budget for the collection phase. Exceeding it yields a
    /// partial summary from whatever was collected.
    pub run_timeout: Duration,

    /// Concurrent model calls for link-classification batches.
    pub llm_fan_out: usize,

    /// Hard cap on links followed from one listing page.
    pub links_per_page: usize,

    /// Anchors per classification batch.
    pub classify_batch_size: usize,

    /// Minimum words for extracted text to count as an article.
    pub min_word_count: usize,

    /// Maximum proportion of non-alphabetic characters before text is
    /// rejected as noise.
    pub max_noise_ratio: f32,

    /// Character budget for cleaned HTML excerpts sent to the model.
    pub excerpt_chars: usize,

    /// Time window applied when the prompt names none.
    pub default_time_range_days: i64,

    /// Article cap applied when the prompt names none.
    pub default_max_articles: usize,

    /// Article cap applied when the prompt has temporal phrasing but no
    /// explicit count.
    pub boosted_max_articles: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            fetch_attempts: 5,
            fetch_timeout: Duration::from_secs(60),
            model_timeout: Duration::from_secs(60),
            run_timeout: Duration::from_secs(90),
            llm_fan_out: 5,
            links_per_page: 20,
            classify_batch_size: 40,
            min_word_count: 150,
            max_noise_ratio: 0.4,
            excerpt_chars: 6000,
            default_time_range_days: 7,
            default_max_articles: 10,
            boosted_max_articles: 20,
        }
    }
}

impl AgentConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the normal-operation depth bound. Clamped to the hard ceiling.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.min(HARD_DEPTH_CEILING - 1);
        self
    }

    /// Set fetch attempts per URL.
    pub fn with_fetch_attempts(mut self, attempts: u32) -> Self {
        self.fetch_attempts = attempts.max(1);
        self
    }

    /// Set the per-attempt fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the collection-phase wall-clock budget.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Set the per-listing link cap.
    pub fn with_links_per_page(mut self, cap: usize) -> Self {
        self.links_per_page = cap.max(1);
        self
    }

    /// Set the minimum article word count.
    pub fn with_min_word_count(mut self, words: usize) -> Self {
        self.min_word_count = words;
        self
    }

    /// Set the excerpt character budget.
    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }
}
