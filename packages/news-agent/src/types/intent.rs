//! Parsed user intent.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How the final summary is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    ExecutiveSummary,
    CategorizedBullets,
    ConciseBullets,
    Detailed,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::CategorizedBullets
    }
}

/// Semantic filters the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Financial,
    Product,
    Leadership,
    Legal,
    Market,
    Technology,
    Opinion,
    Community,
}

impl FocusArea {
    /// Map a model-reported tag onto a known area. Unknown tags are dropped.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "financial" | "finance" | "earnings" => Some(Self::Financial),
            "product" | "products" => Some(Self::Product),
            "leadership" | "management" | "people" => Some(Self::Leadership),
            "legal" | "regulatory" => Some(Self::Legal),
            "market" | "markets" | "industry" => Some(Self::Market),
            "technology" | "tech" => Some(Self::Technology),
            "opinion" | "analysis" => Some(Self::Opinion),
            "community" | "forum" | "discussion" => Some(Self::Community),
            _ => None,
        }
    }
}

/// The parsed user request. Immutable for the life of a run; the cutoff
/// time is computed once here and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Free-form subject of the request
    pub topic: String,

    /// Sub-area the user named ("forum", "news"); never guessed
    pub target_section: Option<String>,

    /// Articles older than `cutoff_time` are excluded when dated
    pub time_range_days: i64,

    /// Summary rendering style
    pub output_format: OutputFormat,

    /// Semantic filters, possibly empty
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,

    /// Collection bound for the run
    pub max_articles: usize,

    /// Parser confidence in this interpretation
    pub confidence: f32,

    /// `now - time_range_days`, frozen at intent creation
    pub cutoff_time: DateTime<Utc>,
}

impl Intent {
    /// Build an intent, clamping `time_range_days` and `max_articles` to at
    /// least 1 and freezing the cutoff against `now`.
    pub fn new(topic: impl Into<String>, time_range_days: i64, max_articles: usize, now: DateTime<Utc>) -> Self {
        let time_range_days = time_range_days.max(1);
        Self {
            topic: topic.into(),
            target_section: None,
            time_range_days,
            output_format: OutputFormat::default(),
            focus_areas: Vec::new(),
            max_articles: max_articles.max(1),
            confidence: 1.0,
            cutoff_time: now - Duration::days(time_range_days),
        }
    }

    /// Set the target section.
    pub fn with_target_section(mut self, section: impl Into<String>) -> Self {
        self.target_section = Some(section.into());
        self
    }

    /// Set the output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set parser confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Whether a publication date falls inside the window. Unknown dates
    /// pass; the window only binds when a date is known.
    pub fn within_window(&self, published: Option<DateTime<Utc>>) -> bool {
        match published {
            Some(date) => date >= self.cutoff_time,
            None => true,
        }
    }
}
