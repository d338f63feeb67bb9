//! Testing utilities: scripted mocks and HTML fixtures.
//!
//! These make whole runs scriptable without network or model access. The
//! mock model matches on prompt markers, so one mock can drive every stage
//! of a run; the mock fetcher serves an in-memory site and records every
//! fetch for double-fetch assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult, ModelError, ModelResult};
use crate::events::{AgentEvent, EventSink};
use crate::traits::{LanguageModel, PageFetcher};
use crate::urls;

struct Rule {
    markers: Vec<String>,
    responses: VecDeque<String>,
    last: String,
}

/// A language model scripted by prompt markers.
///
/// Rules are checked in insertion order; the first rule whose markers all
/// appear in the combined system+user prompt answers. A rule with several
/// responses consumes them in order and then repeats the last one. Calls
/// with no matching rule fail like an unreachable provider, which the
/// pipeline's graceful defaults absorb.
#[derive(Default)]
pub struct MockModel {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<(String, String)>>,
    fail_all: bool,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script one response for prompts containing all `markers`.
    pub fn on(self, markers: &[&str], response: &str) -> Self {
        self.on_seq(markers, &[response])
    }

    /// Script a sequence of responses for successive matching calls.
    pub fn on_seq(self, markers: &[&str], responses: &[&str]) -> Self {
        assert!(!responses.is_empty(), "a rule needs at least one response");
        self.rules.lock().unwrap().push(Rule {
            markers: markers.iter().map(|m| m.to_string()).collect(),
            responses: responses.iter().map(|r| r.to_string()).collect(),
            last: responses.last().unwrap().to_string(),
        });
        self
    }

    /// Make every call fail, simulating an unreachable provider.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// All `(system, user)` prompts this mock has seen.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// How many calls matched rules containing `marker`.
    pub fn calls_containing(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(system, user)| system.contains(marker) || user.contains(marker))
            .count()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, system: &str, user: &str) -> ModelResult<String> {
        self.calls.lock().unwrap().push((system.to_string(), user.to_string()));

        if self.fail_all {
            return Err(ModelError::Request("mock model configured to fail".into()));
        }

        let combined = format!("{system}\n{user}");
        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if rule.markers.iter().all(|m| combined.contains(m.as_str())) {
                return Ok(rule.responses.pop_front().unwrap_or_else(|| rule.last.clone()));
            }
        }

        Err(ModelError::Request(
            format!("no mock rule matched prompt: {}", crate::html::truncate_chars(user, 120)).into(),
        ))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// How a mock fetch should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Status(u16),
    Network,
    Empty,
    Timeout,
}

/// An in-memory site keyed by normalized URL, with failure injection and
/// fetch counting.
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, FailureMode>>,
    flaky: Mutex<HashMap<String, (u32, String)>>,
    counts: Mutex<HashMap<String, u32>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.pages.lock().unwrap().insert(urls::normalize(url), html.into());
        self
    }

    /// Always fail `url` the given way.
    pub fn with_failure(self, url: &str, mode: FailureMode) -> Self {
        self.failures.lock().unwrap().insert(urls::normalize(url), mode);
        self
    }

    /// Fail `url` `failures` times, then serve `html`.
    pub fn flaky(self, url: &str, failures: u32, html: impl Into<String>) -> Self {
        self.flaky
            .lock()
            .unwrap()
            .insert(urls::normalize(url), (failures, html.into()));
        self
    }

    /// Fetches observed for `url` (normalized).
    pub fn fetch_count(&self, url: &str) -> u32 {
        self.counts
            .lock()
            .unwrap()
            .get(&urls::normalize(url))
            .copied()
            .unwrap_or(0)
    }

    /// Every normalized URL fetched, with multiplicity.
    pub fn fetched_urls(&self) -> Vec<String> {
        let counts = self.counts.lock().unwrap();
        let mut out = Vec::new();
        for (url, n) in counts.iter() {
            for _ in 0..*n {
                out.push(url.clone());
            }
        }
        out
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let key = urls::normalize(url);
        *self.counts.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some((remaining, html)) = flaky.get_mut(&key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(FetchError::Status { url: key, status: 503 });
                }
                return Ok(html.clone());
            }
        }

        if let Some(mode) = self.failures.lock().unwrap().get(&key) {
            return Err(match mode {
                FailureMode::Status(status) => FetchError::Status { url: key, status: *status },
                FailureMode::Network => FetchError::Network {
                    url: key,
                    source: "mock connection refused".into(),
                },
                FailureMode::Empty => FetchError::EmptyBody { url: key },
                FailureMode::Timeout => FetchError::Timeout { url: key },
            });
        }

        self.pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or(FetchError::Status { url: key, status: 404 })
    }
}

/// Sink that records every event for ordering assertions.
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<AgentEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &AgentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// An article page with a JSON-LD publication date and enough body text to
/// clear the validator.
pub fn article_page(title: &str, date_iso: &str, words: usize) -> String {
    let sentence = "The company reported steady progress across its core segments this period according to people familiar with the results. ";
    let mut body = String::new();
    let mut count = 0usize;
    while count < words {
        body.push_str(sentence);
        count += sentence.split_whitespace().count();
    }

    format!(
        r#"<html><head>
<title>{title}</title>
<script type="application/ld+json">{{"@type": "NewsArticle", "headline": "{title}", "datePublished": "{date_iso}"}}</script>
</head><body>
<article>
<h1>{title}</h1>
<p>{body}</p>
</article>
</body></html>"#
    )
}

/// A listing page whose primary content is links.
pub fn listing_page(title: &str, links: &[(&str, &str)]) -> String {
    let items: String = links
        .iter()
        .map(|(text, href)| format!("<li><a href=\"{href}\">{text}</a></li>\n"))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
<h1>{title}</h1>
<ul>
{items}</ul>
</body></html>"#
    )
}
