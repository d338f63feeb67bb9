//! Publication-date parsing.
//!
//! Strategy ladder, first success wins: the smart model reads a cleaned
//! excerpt (today's date supplied so it never does calendar arithmetic),
//! then structured metadata (JSON-LD, OpenGraph, `<time>`, `<meta>`), then
//! regex patterns over the visible text. An article with no determinable
//! date keeps `None` at low confidence; it is never dropped here.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use crate::config::AgentConfig;
use crate::json::parse_llm_json;
use crate::prompts;
use crate::traits::LanguageModel;
use crate::types::{DateConfidence, DateMethod};

/// A resolved publication date with provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedDate {
    pub date: Option<DateTime<Utc>>,
    pub confidence: DateConfidence,
    pub method: DateMethod,
}

impl ParsedDate {
    fn unknown() -> Self {
        Self {
            date: None,
            confidence: DateConfidence::Low,
            method: DateMethod::None,
        }
    }
}

#[derive(Deserialize)]
struct DateResponse {
    date: Option<String>,
    #[serde(default)]
    confidence: Option<String>,
}

/// Determine the publication date of an article page.
pub async fn parse_publication_date(
    model: &dyn LanguageModel,
    html: &str,
    url: &str,
    now: DateTime<Utc>,
    config: &AgentConfig,
) -> ParsedDate {
    if let Some(parsed) = llm_date(model, html, url, now, config).await {
        return parsed;
    }
    if let Some(parsed) = metadata_date(html) {
        return parsed;
    }
    if let Some(parsed) = pattern_date(html, now) {
        return parsed;
    }
    ParsedDate::unknown()
}

async fn llm_date(
    model: &dyn LanguageModel,
    html: &str,
    url: &str,
    now: DateTime<Utc>,
    config: &AgentConfig,
) -> Option<ParsedDate> {
    let excerpt = crate::html::clean_excerpt(html, config.excerpt_chars.min(3000));
    let user = prompts::DATE_PROMPT
        .replace("{today}", &now.format("%Y-%m-%d").to_string())
        .replace("{url}", url)
        .replace("{excerpt}", &excerpt);

    let raw = match model.complete(prompts::DATE_SYSTEM, &user).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(url = %url, error = %e, "date model call failed, falling through");
            return None;
        }
    };

    let response: DateResponse = parse_llm_json(&raw).ok()?;
    let text = response.date?;
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }

    let date = parse_iso_like(trimmed)?;
    let confidence = match response.confidence.as_deref() {
        Some("high") => DateConfidence::High,
        Some("low") => DateConfidence::Low,
        _ => DateConfidence::Medium,
    };
    Some(ParsedDate {
        date: Some(date),
        confidence,
        method: DateMethod::Llm,
    })
}

/// JSON-LD `datePublished`, `og:article:published_time`, `<time datetime>`,
/// `<meta name="date">`.
pub fn metadata_date(html: &str) -> Option<ParsedDate> {
    let doc = Html::parse_document(html);

    let jsonld_sel = Selector::parse("script[type=\"application/ld+json\"]").expect("static selector");
    for script in doc.select(&jsonld_sel) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&script.inner_html()) {
            if let Some(date) = find_date_published(&value).and_then(|s| parse_iso_like(&s)) {
                return Some(high_metadata(date));
            }
        }
    }

    let og_sel = Selector::parse("meta[property=\"article:published_time\"]").expect("static selector");
    if let Some(date) = doc
        .select(&og_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .and_then(parse_iso_like)
    {
        return Some(high_metadata(date));
    }

    let time_sel = Selector::parse("time[datetime]").expect("static selector");
    if let Some(date) = doc
        .select(&time_sel)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(parse_iso_like)
    {
        return Some(high_metadata(date));
    }

    let meta_sel = Selector::parse("meta[name=\"date\"]").expect("static selector");
    if let Some(date) = doc
        .select(&meta_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .and_then(parse_iso_like)
    {
        return Some(high_metadata(date));
    }

    None
}

fn high_metadata(date: DateTime<Utc>) -> ParsedDate {
    ParsedDate {
        date: Some(date),
        confidence: DateConfidence::High,
        method: DateMethod::Metadata,
    }
}

fn find_date_published(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(s)) = map.get("datePublished") {
                return Some(s.clone());
            }
            map.values().find_map(find_date_published)
        }
        serde_json::Value::Array(items) => items.iter().find_map(find_date_published),
        _ => None,
    }
}

/// Relative phrases ("3 days ago", "yesterday") at medium confidence;
/// absolute textual dates at low confidence.
pub fn pattern_date(html: &str, now: DateTime<Utc>) -> Option<ParsedDate> {
    let text = crate::html::clean_excerpt(html, 4000);

    let relative = Regex::new(r"(?i)\b(\d{1,3})\s+(hour|day|week|month)s?\s+ago\b").expect("static regex");
    if let Some(caps) = relative.captures(&text) {
        let amount: i64 = caps[1].parse().ok()?;
        let date = match caps[2].to_ascii_lowercase().as_str() {
            "hour" => now - Duration::hours(amount),
            "day" => now - Duration::days(amount),
            "week" => now - Duration::days(amount * 7),
            "month" => now - Duration::days(amount * 30),
            _ => return None,
        };
        return Some(ParsedDate {
            date: Some(date),
            confidence: DateConfidence::Medium,
            method: DateMethod::Pattern,
        });
    }

    if Regex::new(r"(?i)\byesterday\b").expect("static regex").is_match(&text) {
        return Some(ParsedDate {
            date: Some(now - Duration::days(1)),
            confidence: DateConfidence::Medium,
            method: DateMethod::Pattern,
        });
    }
    if Regex::new(r"(?i)\btoday\b").expect("static regex").is_match(&text) {
        return Some(ParsedDate {
            date: Some(now),
            confidence: DateConfidence::Medium,
            method: DateMethod::Pattern,
        });
    }

    let iso = Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("static regex");
    if let Some(caps) = iso.captures(&text) {
        if let Some(date) = parse_iso_like(&caps[1]) {
            return Some(low_pattern(date));
        }
    }

    let textual = Regex::new(
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("static regex");
    if let Some(caps) = textual.captures(&text) {
        let composed = format!("{} {}, {}", &caps[1], &caps[2], &caps[3]);
        if let Ok(date) = NaiveDate::parse_from_str(&composed, "%B %d, %Y") {
            return Some(low_pattern(naive_to_utc(date)));
        }
    }

    None
}

fn low_pattern(date: DateTime<Utc>) -> ParsedDate {
    ParsedDate {
        date: Some(date),
        confidence: DateConfidence::Low,
        method: DateMethod::Pattern,
    }
}

/// Accept RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
pub fn parse_iso_like(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(naive_to_utc(date));
    }
    None
}

fn naive_to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

/// Parse a date string a listing displayed next to a link.
pub fn parse_listing_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%B %d, %Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d %B %Y") {
        return Some(date);
    }
    None
}
