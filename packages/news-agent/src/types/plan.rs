//! Strategic plan and post-collection reflection.

use serde::{Deserialize, Serialize};

use super::decision::PageType;

/// Advisory guidance from the planner. The navigator may consult it; it
/// never overrides the safety bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Predicted shape of the seed pages
    pub listing_type: PageType,

    /// 1 when the seed is already a listing, 2 when one navigation hop is
    /// predicted necessary
    pub estimated_depth: usize,

    /// What a successful collection looks like
    pub success_criteria: String,

    /// What to try when the primary route yields nothing
    #[serde(default)]
    pub fallback_strategies: Vec<String>,
}

impl Plan {
    /// Conservative default used when the planner model is unavailable.
    pub fn conservative() -> Self {
        Self {
            listing_type: PageType::Other,
            estimated_depth: 1,
            success_criteria: "collect recent on-topic articles from the seed pages".to_string(),
            fallback_strategies: vec!["treat the seed itself as an article".to_string()],
        }
    }
}

/// Post-collection evaluation. Observational only; never re-runs the
/// pipeline or blocks the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reflection {
    /// Overall quality of the collected set, in [0, 1]
    pub quality_score: f32,

    /// How well the set covers the stated intent, in [0, 1]
    pub coverage_of_intent: f32,

    /// Free-form observations
    pub notes: String,
}

impl Reflection {
    /// Neutral reflection used when the reflector model is unavailable.
    pub fn unavailable() -> Self {
        Self {
            quality_score: 0.5,
            coverage_of_intent: 0.5,
            notes: "reflection unavailable".to_string(),
        }
    }
}
