//! Page decisions and link candidates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What to do with a fetched page. Dispatch on this is exhaustive; there is
/// no fallthrough action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageAction {
    ExtractContent,
    ExtractLinks,
    NavigateTo,
    Stop,
}

/// Model-assessed shape of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Article,
    ForumThread,
    ForumListing,
    NewsListing,
    CompanyProfile,
    BlogListing,
    Other,
}

impl PageType {
    /// Whether this page type is primarily a collection of links.
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::ForumListing | Self::NewsListing | Self::BlogListing)
    }
}

/// A model decision for one page, after code-side enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDecision {
    pub action: PageAction,
    pub reasoning: String,
    pub confidence: f32,
    pub page_type: PageType,

    /// Only meaningful when `action == NavigateTo`, and only honored when
    /// the URL appears in the page's actual link set.
    pub target_url: Option<String>,

    /// Depth-0 short-circuit: the seed itself is the article.
    #[serde(default)]
    pub ready_to_extract: bool,
}

impl PageDecision {
    /// A terminal decision with the given reasoning.
    pub fn stop(reasoning: impl Into<String>) -> Self {
        Self {
            action: PageAction::Stop,
            reasoning: reasoning.into(),
            confidence: 1.0,
            page_type: PageType::Other,
            target_url: None,
            ready_to_extract: false,
        }
    }
}

/// A URL pulled off a listing page, with the model's relevance judgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCandidate {
    /// Absolute URL
    pub url: String,

    /// Anchor text as it appeared on the listing
    pub anchor_text: String,

    /// Date visible next to the link, when the listing showed one
    pub detected_date: Option<NaiveDate>,

    /// Relevance to the intent, in [0, 1]
    pub relevance: f32,
}

impl LinkCandidate {
    pub fn new(url: impl Into<String>, anchor_text: impl Into<String>, relevance: f32) -> Self {
        Self {
            url: url.into(),
            anchor_text: anchor_text.into(),
            detected_date: None,
            relevance: relevance.clamp(0.0, 1.0),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.detected_date = Some(date);
        self
    }
}
