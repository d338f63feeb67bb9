//! Intent extraction.
//!
//! The smart model parses the prompt; post-processing applies the rules a
//! model cannot be trusted with: unit conversion, the temporal-phrase
//! boost, defaults, and the clamps. The cutoff time is computed here once
//! and frozen for the run.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::{FocusArea, Intent, OutputFormat};

#[derive(Deserialize)]
struct IntentResponse {
    topic: String,
    #[serde(default)]
    target_section: Option<String>,
    #[serde(default)]
    time_value: Option<i64>,
    #[serde(default)]
    time_unit: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
    #[serde(default)]
    focus_areas: Vec<String>,
    #[serde(default)]
    max_articles: Option<usize>,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Parse a user prompt into an [`Intent`].
///
/// Fails only when the model is unreachable or answers with nothing
/// JSON-shaped twice; nothing downstream is meaningful without an intent.
pub async fn extract_intent(
    smart: &dyn LanguageModel,
    prompt: &str,
    now: DateTime<Utc>,
    config: &AgentConfig,
) -> Result<Intent, AgentError> {
    let user = prompts::INTENT_PROMPT.replace("{prompt}", prompt);
    let raw = smart
        .complete(prompts::INTENT_SYSTEM, &user)
        .await
        .map_err(AgentError::LlmUnavailable)?;

    let response: IntentResponse = parse_llm_json(&raw).map_err(AgentError::LlmUnavailable)?;

    let time_range_days = match (response.time_value, response.time_unit.as_deref()) {
        (Some(value), Some("weeks")) => value * 7,
        (Some(value), Some("months")) => value * 30,
        (Some(value), _) => value,
        (None, _) => config.default_time_range_days,
    }
    .max(1);

    let explicit_count = response.max_articles;
    let max_articles = match explicit_count {
        Some(count) => count.max(1),
        None if has_temporal_phrasing(prompt) => config.boosted_max_articles,
        None => config.default_max_articles,
    };

    let output_format = match response.output_format.as_deref() {
        Some("executive_summary") => OutputFormat::ExecutiveSummary,
        Some("concise_bullets") => OutputFormat::ConciseBullets,
        Some("detailed") => OutputFormat::Detailed,
        _ => OutputFormat::CategorizedBullets,
    };

    let focus_areas: Vec<FocusArea> = response
        .focus_areas
        .iter()
        .filter_map(|tag| FocusArea::from_tag(tag))
        .collect();

    let target_section = response
        .target_section
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "null");

    let intent = Intent {
        topic: response.topic.trim().to_string(),
        target_section,
        time_range_days,
        output_format,
        focus_areas,
        max_articles,
        confidence: response.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        cutoff_time: now - Duration::days(time_range_days),
    };

    info!(
        topic = %intent.topic,
        time_range_days = intent.time_range_days,
        max_articles = intent.max_articles,
        "intent extracted"
    );

    Ok(intent)
}

/// Whether the prompt phrases a time window without necessarily naming a
/// count ("last 5 days", "recent", "lately", "latest").
pub fn has_temporal_phrasing(prompt: &str) -> bool {
    let pattern = Regex::new(
        r"(?i)\b(last|past)\s+(\d+\s+)?(day|week|month)s?\b|\brecent(ly)?\b|\blately\b|\blatest\b|\bthis\s+(week|month)\b",
    )
    .expect("static regex");
    pattern.is_match(prompt)
}
