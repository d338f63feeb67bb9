//! Article content and seed links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::urls;

/// Confidence in an extracted publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateConfidence {
    High,
    Medium,
    Low,
}

/// Which strategy produced the publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMethod {
    Llm,
    Metadata,
    Pattern,
    None,
}

/// One user-supplied entry point, held in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedLink {
    /// Normalized URL
    pub url: String,

    /// Start navigation at this depth instead of 0 (treat the seed as a
    /// listing reached by one hop). Never relaxes the safety bounds.
    pub depth_override: Option<usize>,
}

impl SeedLink {
    /// Create a seed, normalizing the URL.
    pub fn new(url: &str) -> Self {
        Self {
            url: urls::normalize(url),
            depth_override: None,
        }
    }

    /// Set the starting depth.
    pub fn with_depth_override(mut self, depth: usize) -> Self {
        self.depth_override = Some(depth);
        self
    }
}

/// An accepted article. Owned by the navigator that produced it until it
/// is moved into the run's collected set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    /// Normalized URL the article was fetched from
    pub url: String,

    /// Extracted title
    pub title: String,

    /// Main readable text
    pub text: String,

    /// Publication date when one could be determined
    pub published_date: Option<DateTime<Utc>>,

    /// Confidence in `published_date`
    pub date_confidence: DateConfidence,

    /// Strategy that produced `published_date`
    pub date_method: DateMethod,

    /// When the article was fetched
    pub fetched_at: DateTime<Utc>,

    /// Model-assessed quality in [0, 1]
    pub quality_score: f32,

    /// Whether the text reads as a paywall teaser
    pub is_paywalled: bool,

    /// Word count of `text`
    pub word_count: usize,

    /// Detected language code when the model reported one. Non-English
    /// content is flagged here, never rejected.
    pub language: Option<String>,
}

impl ArticleContent {
    /// Build an article from extracted parts; derives the word count and
    /// stamps the fetch time.
    pub fn new(url: &str, title: impl Into<String>, text: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            url: urls::normalize(url),
            title: title.into(),
            text,
            published_date: None,
            date_confidence: DateConfidence::Low,
            date_method: DateMethod::None,
            fetched_at,
            quality_score: 0.0,
            is_paywalled: false,
            word_count,
            language: None,
        }
    }

    /// Set the publication date with its provenance.
    pub fn with_date(mut self, date: Option<DateTime<Utc>>, confidence: DateConfidence, method: DateMethod) -> Self {
        self.published_date = date;
        self.date_confidence = confidence;
        self.date_method = method;
        self
    }

    /// Set the quality score.
    pub fn with_quality(mut self, score: f32) -> Self {
        self.quality_score = score.clamp(0.0, 1.0);
        self
    }

    /// Set the detected language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Age in whole days at `now`, when the publication date is known.
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.published_date.map(|d| (now - d).num_days())
    }

    /// SHA-256 over whitespace-normalized text. Backs exact dedup.
    pub fn content_hash(&self) -> String {
        let normalized: String = self
            .text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// The first `n` words of the text, for dedup prompts and logging.
    pub fn lead(&self, n: usize) -> String {
        self.text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
    }
}
