//! Terminal run output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::ArticleContent;

/// One entry in the citations list. Citations are 1-indexed in order of
/// first appearance in the final collected set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,

    /// The `[n]` marker as it appears in prose
    pub label: String,

    pub title: String,

    pub date: Option<DateTime<Utc>>,

    pub age_days: Option<i64>,
}

impl Citation {
    /// Build the citation for the `index`-th (1-based) collected article.
    pub fn for_article(index: usize, article: &ArticleContent, now: DateTime<Utc>) -> Self {
        Self {
            url: article.url.clone(),
            label: format!("[{index}]"),
            title: article.title.clone(),
            date: article.published_date,
            age_days: article.age_days(now),
        }
    }
}

/// The run's terminal output. Always well-formed: a failed run carries an
/// explanatory summary and an empty citations list rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Rendered markdown in the intent's output format
    pub summary_markdown: String,

    /// Bullets, each carrying at least one resolvable `[n]` marker
    pub bullet_points: Vec<String>,

    /// 1-indexed citations in collected order
    pub citations: Vec<Citation>,

    /// Name of the model that produced the summary
    pub model: String,
}

impl SummaryResult {
    /// A well-formed empty result explaining why nothing was collected.
    pub fn empty(reason: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            summary_markdown: reason.into(),
            bullet_points: Vec::new(),
            citations: Vec::new(),
            model: model.into(),
        }
    }

    /// Every `[n]` marker appearing in the bullets and the markdown,
    /// in order of appearance.
    pub fn citation_markers(&self) -> Vec<usize> {
        let mut markers = Vec::new();
        for text in self.bullet_points.iter().map(String::as_str).chain(std::iter::once(self.summary_markdown.as_str())) {
            let mut rest = text;
            while let Some(open) = rest.find('[') {
                rest = &rest[open + 1..];
                if let Some(close) = rest.find(']') {
                    if let Ok(n) = rest[..close].parse::<usize>() {
                        markers.push(n);
                    }
                    rest = &rest[close + 1..];
                } else {
                    break;
                }
            }
        }
        markers
    }
}
