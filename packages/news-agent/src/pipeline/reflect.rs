//! Post-collection reflection.
//!
//! A fast-model judgment of how well the collected set serves the intent.
//! Purely observational: it never re-runs the pipeline, and a failed
//! reflection degrades to a neutral default.

use serde::Deserialize;
use tracing::warn;

use crate::events::{AgentEvent, Emitter};
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::{ArticleContent, Intent, Reflection};

#[derive(Deserialize)]
struct ReflectResponse {
    quality_score: f32,
    coverage_of_intent: f32,
    #[serde(default)]
    notes: Option<String>,
}

/// Evaluate the collected set against the intent.
pub async fn reflect(
    fast: &dyn LanguageModel,
    intent: &Intent,
    articles: &[ArticleContent],
    emitter: &Emitter,
) -> Reflection {
    let listing: String = articles
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {} ({} words)\n", i + 1, a.title, a.word_count))
        .collect();

    let user = prompts::REFLECT_PROMPT
        .replace("{topic}", &intent.topic)
        .replace("{days}", &intent.time_range_days.to_string())
        .replace("{max_articles}", &intent.max_articles.to_string())
        .replace("{articles}", if listing.is_empty() { "(nothing collected)" } else { &listing });

    let reflection = match fast.complete(prompts::REFLECT_SYSTEM, &user).await {
        Ok(raw) => match parse_llm_json::<ReflectResponse>(&raw) {
            Ok(response) => Reflection {
                quality_score: response.quality_score.clamp(0.0, 1.0),
                coverage_of_intent: response.coverage_of_intent.clamp(0.0, 1.0),
                notes: response.notes.unwrap_or_default(),
            },
            Err(e) => {
                warn!(error = %e, "reflection unparseable, recording neutral reflection");
                Reflection::unavailable()
            }
        },
        Err(e) => {
            warn!(error = %e, "reflection model call failed, recording neutral reflection");
            Reflection::unavailable()
        }
    };

    emitter.emit(AgentEvent::ReflectComplete {
        quality_score: reflection.quality_score,
    });
    reflection
}
