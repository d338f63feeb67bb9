//! Strategic planning.
//!
//! A fast-model task: predict what the seeds are and whether reaching the
//! articles needs a navigation hop. The plan is advisory; the navigator
//! consults it but the safety bounds never move.

use serde::Deserialize;
use tracing::warn;

use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::{Intent, PageType, Plan, SeedLink};

#[derive(Deserialize)]
struct PlanResponse {
    #[serde(default)]
    listing_type: Option<PageType>,
    #[serde(default)]
    estimated_depth: Option<usize>,
    #[serde(default)]
    success_criteria: Option<String>,
    #[serde(default)]
    fallback_strategies: Vec<String>,
}

/// Build a plan for the run. Never fails: an unreachable or incoherent
/// model yields the conservative default.
pub async fn build_plan(fast: &dyn LanguageModel, intent: &Intent, seeds: &[SeedLink]) -> Plan {
    let seed_list: String = seeds.iter().map(|s| format!("- {}\n", s.url)).collect();
    let user = prompts::PLAN_PROMPT
        .replace("{topic}", &intent.topic)
        .replace("{section}", intent.target_section.as_deref().unwrap_or("(none)"))
        .replace("{seeds}", &seed_list);

    let raw = match fast.complete(prompts::PLAN_SYSTEM, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "planner model unavailable, using conservative plan");
            return Plan::conservative();
        }
    };

    let response: PlanResponse = match parse_llm_json(&raw) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "plan response unparseable, using conservative plan");
            return Plan::conservative();
        }
    };

    Plan {
        listing_type: response.listing_type.unwrap_or(PageType::Other),
        // never exceeds the system-level depth ceiling
        estimated_depth: response.estimated_depth.unwrap_or(1).clamp(1, 2),
        success_criteria: response
            .success_criteria
            .unwrap_or_else(|| Plan::conservative().success_criteria),
        fallback_strategies: response.fallback_strategies,
    }
}
