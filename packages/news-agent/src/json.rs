//! Defensive parsing of model-produced JSON.
//!
//! Raw model output is never trusted: it arrives wrapped in code fences,
//! prefixed with prose, or with single-quoted strings and trailing commas.
//! The ladder here is: parse as-is, strip fences, cut out the outermost
//! JSON block, then one repair pass. After that the caller falls back to
//! its documented default.

use serde::de::DeserializeOwned;

use crate::error::ModelError;

/// Parse a model response into `T`, tolerating fences, surrounding prose,
/// and (via one repair pass) single-quoted strings and trailing commas.
pub fn parse_llm_json<T: DeserializeOwned>(raw: &str) -> Result<T, ModelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Ok(value);
    }

    let unfenced = strip_fences(trimmed);
    if let Ok(value) = serde_json::from_str::<T>(unfenced) {
        return Ok(value);
    }

    if let Some(block) = outer_block(unfenced) {
        if let Ok(value) = serde_json::from_str::<T>(block) {
            return Ok(value);
        }
        if let Ok(value) = serde_json::from_str::<T>(&repair(block)) {
            return Ok(value);
        }
    }

    Err(ModelError::Unparseable {
        reason: format!("no JSON found in {} chars of output", raw.len()),
    })
}

/// Remove a leading/trailing markdown code fence if present.
fn strip_fences(s: &str) -> &str {
    let s = s.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// Slice out the outermost `{...}` or `[...]` block.
fn outer_block(s: &str) -> Option<&str> {
    let obj = s.find('{').map(|start| (start, s.rfind('}')));
    let arr = s.find('[').map(|start| (start, s.rfind(']')));

    let (start, end) = match (obj, arr) {
        (Some((o, Some(oe))), Some((a, Some(ae)))) => {
            if o < a {
                (o, oe)
            } else {
                (a, ae)
            }
        }
        (Some((o, Some(oe))), _) => (o, oe),
        (_, Some((a, Some(ae)))) => (a, ae),
        _ => return None,
    };

    (end > start).then(|| &s[start..=end])
}

/// One repair pass: swap single quotes for double quotes and drop trailing
/// commas. Crude on purpose; a response this broken gets one chance.
fn repair(s: &str) -> String {
    let quoted = s.replace('\'', "\"");
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            let mut lookahead = chars.clone();
            while let Some(&n) = lookahead.peek() {
                if n.is_whitespace() {
                    lookahead.next();
                } else {
                    break;
                }
            }
            if matches!(lookahead.peek(), Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}
