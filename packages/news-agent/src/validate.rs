//! Content validation.
//!
//! Decides whether extracted text is a real article. Checks run in order
//! and the first failure wins: paywall (model-primary with keyword
//! fallback), minimum length, noise ratio. Non-English text passes; it is
//! flagged on the article, not rejected.

use serde::Deserialize;
use tracing::debug;

use crate::config::AgentConfig;
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::ArticleContent;

/// Phrases that mark subscription teasers when the model is unavailable.
const PAYWALL_MARKERS: &[&str] = &[
    "subscribe to continue",
    "subscription required",
    "subscribe to read",
    "premium content",
    "sign in to read",
    "to continue reading",
    "already a subscriber",
    "become a member to read",
];

/// Outcome of validation. `reason` strings are stable enough to log and
/// count against a failure budget.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Valid,
    Paywalled,
    TooShort { words: usize },
    TooNoisy,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn reason(&self) -> String {
        match self {
            Verdict::Valid => "valid".to_string(),
            Verdict::Paywalled => "paywalled or teaser content".to_string(),
            Verdict::TooShort { words } => format!("too short: {words} words"),
            Verdict::TooNoisy => "excessive non-text noise".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct PaywallResponse {
    paywalled: bool,
}

/// Validate extracted article text.
pub async fn validate_article(fast: &dyn LanguageModel, article: &ArticleContent, config: &AgentConfig) -> Verdict {
    if is_paywalled(fast, &article.text).await {
        return Verdict::Paywalled;
    }

    if article.word_count < config.min_word_count {
        return Verdict::TooShort { words: article.word_count };
    }

    if noise_ratio(&article.text) > config.max_noise_ratio {
        return Verdict::TooNoisy;
    }

    Verdict::Valid
}

async fn is_paywalled(fast: &dyn LanguageModel, text: &str) -> bool {
    let sample = crate::html::truncate_chars(text, 1500);
    let user = prompts::PAYWALL_PROMPT.replace("{text}", &sample);

    match fast.complete(prompts::PAYWALL_SYSTEM, &user).await {
        Ok(raw) => match parse_llm_json::<PaywallResponse>(&raw) {
            Ok(response) => response.paywalled,
            Err(e) => {
                debug!(error = %e, "paywall response unparseable, using keyword heuristics");
                keyword_paywall(text)
            }
        },
        Err(e) => {
            debug!(error = %e, "paywall model call failed, using keyword heuristics");
            keyword_paywall(text)
        }
    }
}

/// Keyword fallback for paywall detection.
pub fn keyword_paywall(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PAYWALL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Proportion of non-alphabetic, non-whitespace characters.
pub fn noise_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut noise = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if !c.is_alphabetic() {
            noise += 1;
        }
    }
    if total == 0 {
        return 1.0;
    }
    noise as f32 / total as f32
}
