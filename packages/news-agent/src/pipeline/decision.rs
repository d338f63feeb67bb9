//! Page-decision engine.
//!
//! The model sees the URL, the depth, the intent, the page's actual link
//! set, and a cleaned excerpt, and picks exactly one action. The rules it
//! was told about are then enforced in code: a NAVIGATE_TO target outside
//! the link set downgrades to STOP, and at depth 2+ everything except
//! content extraction is coerced to STOP. Both layers are necessary.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::AgentConfig;
use crate::html::PageLink;
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::{Intent, PageAction, PageDecision, PageType, Plan};
use crate::urls;

/// Links shown to the model per page. Beyond this the prompt stops paying
/// for itself.
const MAX_LINKS_IN_PROMPT: usize = 60;

/// URL path segments that suggest a listing-shaped page.
const LISTING_PATH_HINTS: &[&str] = &["/tag/", "/category/", "/topics/", "/news", "/blog", "/forum", "/stories"];

#[derive(Deserialize)]
struct DecisionResponse {
    action: PageAction,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    page_type: Option<PageType>,
    #[serde(default)]
    target_url: Option<String>,
    #[serde(default)]
    ready_to_extract: bool,
}

/// Decide what to do with a fetched page.
pub async fn decide_page(
    smart: &dyn LanguageModel,
    url: &str,
    depth: usize,
    intent: &Intent,
    plan: &Plan,
    links: &[PageLink],
    excerpt: &str,
    config: &AgentConfig,
) -> PageDecision {
    let link_list: String = links
        .iter()
        .take(MAX_LINKS_IN_PROMPT)
        .enumerate()
        .map(|(i, link)| format!("{}. \"{}\" -> {}\n", i + 1, link.text, link.url))
        .collect();

    let listing_hint = if depth == 0 && looks_like_listing(url, plan) {
        prompts::LISTING_HINT
    } else {
        ""
    };

    let user = prompts::DECISION_PROMPT
        .replace("{url}", url)
        .replace("{depth}", &depth.to_string())
        .replace("{topic}", &intent.topic)
        .replace("{section}", intent.target_section.as_deref().unwrap_or("(none)"))
        .replace("{days}", &intent.time_range_days.to_string())
        .replace("{listing_hint}", listing_hint)
        .replace("{links}", if link_list.is_empty() { "(no links)" } else { &link_list })
        .replace("{excerpt}", &crate::html::truncate_chars(excerpt, config.excerpt_chars));

    let raw = match smart.complete(prompts::DECISION_SYSTEM, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(url = %url, error = %e, "decision model call failed");
            return PageDecision::stop("model unavailable for this page");
        }
    };

    let response: DecisionResponse = match parse_llm_json(&raw) {
        Ok(response) => response,
        Err(e) => {
            warn!(url = %url, error = %e, "decision unparseable after repair");
            return PageDecision::stop("decision response unparseable");
        }
    };

    let decision = PageDecision {
        action: response.action,
        reasoning: response.reasoning.unwrap_or_default(),
        confidence: response.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        page_type: response.page_type.unwrap_or(PageType::Other),
        target_url: response.target_url,
        ready_to_extract: response.ready_to_extract && depth == 0,
    };

    enforce(decision, depth, links, config)
}

/// Code-side enforcement of the depth table and the URL-membership rule,
/// applied regardless of what the model answered.
pub fn enforce(mut decision: PageDecision, depth: usize, links: &[PageLink], config: &AgentConfig) -> PageDecision {
    if decision.action == PageAction::NavigateTo {
        let valid = decision
            .target_url
            .as_deref()
            .map(|target| {
                let normalized = urls::normalize(target);
                links.iter().any(|link| urls::normalize(&link.url) == normalized)
            })
            .unwrap_or(false);

        if !valid {
            debug!(target = ?decision.target_url, "navigation target not in page link set");
            return PageDecision {
                reasoning: format!("navigation target rejected: {}", decision.reasoning),
                ..PageDecision::stop("")
            };
        }
    }

    if depth >= config.max_depth
        && matches!(decision.action, PageAction::ExtractLinks | PageAction::NavigateTo)
    {
        decision = PageDecision {
            reasoning: format!("depth limit reached: {}", decision.reasoning),
            ..PageDecision::stop("")
        };
    }

    decision
}

fn looks_like_listing(url: &str, plan: &Plan) -> bool {
    plan.listing_type.is_listing()
        || LISTING_PATH_HINTS
            .iter()
            .any(|hint| url.to_ascii_lowercase().contains(hint))
}
