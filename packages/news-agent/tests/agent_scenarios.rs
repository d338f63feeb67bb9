//! End-to-end runs over scripted mocks.
//!
//! Each scenario wires a mock site and a marker-scripted model, runs the
//! agent, and asserts on the result plus the recorded event stream: seed
//! handling, depth bounds, the visited set, time-window enforcement,
//! citation closure, and event ordering.

use std::sync::Arc;

use chrono::{Duration, Utc};
use news_agent::testing::{article_page, listing_page, CollectingSink, MockFetcher, MockModel};
use news_agent::{Agent, AgentEvent, ModelSet, RunRequest};

fn recent_iso(days_ago: i64) -> String {
    (Utc::now() - Duration::days(days_ago))
        .format("%Y-%m-%dT00:00:00Z")
        .to_string()
}

fn body_text(seed_word: &str, words: usize) -> String {
    std::iter::repeat(seed_word)
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

fn extraction_json(title: &str, seed_word: &str) -> String {
    format!(
        r#"{{"title": "{title}", "text": "{}", "publish_date": null, "language": "en", "quality_score": 0.8}}"#,
        body_text(seed_word, 200)
    )
}

/// Rules shared by most scenarios: dates fall through to page metadata,
/// nothing is paywalled, everything is on topic, no semantic duplicates.
fn common_rules(model: MockModel) -> MockModel {
    model
        .on(&["Identify the publication date"], r#"{"date": "unknown", "confidence": "low"}"#)
        .on(&["paywall"], r#"{"paywalled": false}"#)
        .on(&["Judge topic fit"], r#"{"relevant": true}"#)
        .on(
            &["duplicate coverage"],
            r#"{"groups": [[1], [2], [3], [4], [5]]}"#,
        )
        .on(
            &["Evaluate the collected articles"],
            r#"{"quality_score": 0.8, "coverage_of_intent": 0.8, "notes": "fine"}"#,
        )
}

fn event_names(sink: &CollectingSink) -> Vec<&'static str> {
    sink.names()
}

fn assert_event_ordering(names: &[&str]) {
    assert!(!names.is_empty());
    assert_eq!(names[0], "init", "init must be strictly first");
    assert_eq!(*names.last().unwrap(), "complete", "complete must be strictly last");
    assert_eq!(names.iter().filter(|n| **n == "complete").count(), 1);
}

// ---------------------------------------------------------------------------
// S1 - direct article: depth-0 EXTRACT_CONTENT, no link extraction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn s1_direct_article_short_circuits_listing_logic() {
    let seed = "https://example.com/news/marico-q2-2025";
    let fetcher = Arc::new(
        MockFetcher::new().with_page(seed, article_page("Marico Q2 Results", &recent_iso(2), 200)),
    );

    let model = MockModel::new()
        .on(
            &["Parse this news request"],
            r#"{"topic": "marico", "confidence": 0.9}"#,
        )
        .on(
            &["Plan the extraction"],
            r#"{"listing_type": "article", "estimated_depth": 1, "success_criteria": "the seed article"}"#,
        )
        .on(
            &["Decide what to do"],
            r#"{"action": "EXTRACT_CONTENT", "reasoning": "the seed is the article", "confidence": 0.95, "page_type": "article", "ready_to_extract": true}"#,
        )
        .on(&["Extract the article"], &extraction_json("Marico Q2 Results", "results"))
        .on(
            &["Write the briefing"],
            r#"{"summary_markdown": "Marico posted its quarterly results [1].", "bullets": [{"text": "Quarterly results released", "sources": [1]}]}"#,
        );
    let model = common_rules(model);

    let sink = Arc::new(CollectingSink::new());
    let agent = Agent::new(fetcher.clone(), ModelSet::single(Arc::new(model)));
    let summary = agent
        .run(
            RunRequest::new("Summarize this article", vec![seed.to_string()]).with_sink(sink.clone()),
        )
        .await
        .unwrap();

    assert_eq!(summary.citations.len(), 1);
    assert_eq!(summary.citations[0].url, seed);
    assert_eq!(fetcher.fetch_count(seed), 1);

    let names = event_names(&sink);
    assert_event_ordering(&names);
    assert!(names.contains(&"nav:direct_extraction"));
    assert!(!names.contains(&"nav:extracting_links"));
}

// ---------------------------------------------------------------------------
// S2 - listing with a 5-day window: boost to 20, depth 0 -> 1, window held
// ---------------------------------------------------------------------------

fn listing_scenario_model() -> MockModel {
    let model = MockModel::new()
        .on(
            &["Parse this news request"],
            r#"{"topic": "marico", "time_value": 5, "time_unit": "days", "confidence": 0.9}"#,
        )
        .on(
            &["Plan the extraction"],
            r#"{"listing_type": "news_listing", "estimated_depth": 1, "success_criteria": "recent marico items"}"#,
        )
        // the seed listing: harvest links (matched before the article catch-all)
        .on(
            &["Decide what to do", "URL: https://example.com/tag/marico"],
            r#"{"action": "EXTRACT_LINKS", "reasoning": "listing of stories", "confidence": 0.9, "page_type": "news_listing"}"#,
        )
        // every other page is an article
        .on(
            &["Decide what to do"],
            r#"{"action": "EXTRACT_CONTENT", "reasoning": "single story", "confidence": 0.9, "page_type": "article"}"#,
        )
        .on(
            &["Classify each link"],
            r#"{"classifications": [{"index": 1, "kind": "article"}, {"index": 2, "kind": "article"}, {"index": 3, "kind": "article"}]}"#,
        )
        .on(
            &["Rank these article links"],
            r#"{"ranked": [{"index": 1, "relevance": 0.9}, {"index": 2, "relevance": 0.8}, {"index": 3, "relevance": 0.7}]}"#,
        )
        .on(&["Extract the article", "story-1"], &extraction_json("Story One", "alpha"))
        .on(&["Extract the article", "story-2"], &extraction_json("Story Two", "beta"))
        .on(&["Extract the article", "story-3"], &extraction_json("Story Three", "gamma"))
        .on(
            &["Write the briefing"],
            r#"{"summary_markdown": "Three stories this week [1][2][3].", "bullets": [{"text": "First", "sources": [1]}, {"text": "Second", "sources": [2]}, {"text": "Third", "sources": [3]}]}"#,
        );
    common_rules(model)
}

fn listing_scenario_fetcher() -> MockFetcher {
    MockFetcher::new()
        .with_page(
            "https://example.com/tag/marico",
            listing_page(
                "Marico coverage",
                &[
                    ("Story One", "https://example.com/news/story-1"),
                    ("Story Two", "https://example.com/news/story-2"),
                    ("Story Three", "https://example.com/news/story-3"),
                ],
            ),
        )
        .with_page("https://example.com/news/story-1", article_page("Story One", &recent_iso(1), 200))
        .with_page("https://example.com/news/story-2", article_page("Story Two", &recent_iso(2), 200))
        .with_page("https://example.com/news/story-3", article_page("Story Three", &recent_iso(4), 200))
}

#[tokio::test]
async fn s2_listing_boosts_count_and_enforces_window() {
    let fetcher = Arc::new(listing_scenario_fetcher());
    let sink = Arc::new(CollectingSink::new());
    let agent = Agent::new(fetcher.clone(), ModelSet::single(Arc::new(listing_scenario_model())));

    let summary = agent
        .run(
            RunRequest::new(
                "Marico news from the last 5 days",
                vec!["https://example.com/tag/marico".to_string()],
            )
            .with_sink(sink.clone()),
        )
        .await
        .unwrap();

    // temporal phrasing without an explicit count boosts the budget to 20
    let intent = sink
        .events()
        .into_iter()
        .find_map(|e| match e {
            AgentEvent::IntentExtracted { intent } => Some(intent),
            _ => None,
        })
        .expect("intent event");
    assert_eq!(intent.max_articles, 20);
    assert_eq!(intent.time_range_days, 5);

    assert_eq!(summary.citations.len(), 3);
    for citation in &summary.citations {
        let age = citation.age_days.expect("dates known in this scenario");
        assert!(age <= 5, "article older than the window: {age} days");
    }

    // depth never passed 1
    let max_depth = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            AgentEvent::NavAnalyzing { depth, .. } => Some(depth),
            _ => None,
        })
        .max()
        .unwrap();
    assert_eq!(max_depth, 1);

    // no URL fetched twice
    let fetched = fetcher.fetched_urls();
    let mut unique = fetched.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(fetched.len(), unique.len());
}

#[tokio::test]
async fn bounded_collection_stops_early_at_the_override() {
    let fetcher = Arc::new(listing_scenario_fetcher());
    let agent = Agent::new(fetcher.clone(), ModelSet::single(Arc::new(listing_scenario_model())));

    let summary = agent
        .run(
            RunRequest::new(
                "Marico news from the last 5 days",
                vec!["https://example.com/tag/marico".to_string()],
            )
            .with_max_articles(2),
        )
        .await
        .unwrap();

    assert_eq!(summary.citations.len(), 2);
    // the third candidate was never fetched
    assert_eq!(fetcher.fetch_count("https://example.com/news/story-3"), 0);
}

// ---------------------------------------------------------------------------
// S3 - forum discovery: profile -> NAVIGATE_TO forum -> threads at depth 2
// ---------------------------------------------------------------------------

#[tokio::test]
async fn s3_forum_discovery_navigates_then_extracts_threads() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_page(
                "https://example.com/profile/marico",
                listing_page(
                    "Marico profile",
                    &[
                        ("News", "https://example.com/news/marico"),
                        ("Forum", "https://example.com/forum/marico"),
                    ],
                ),
            )
            .with_page(
                "https://example.com/forum/marico",
                listing_page(
                    "Marico forum",
                    &[
                        ("Thread: results", "https://example.com/forum/thread-1"),
                        ("Thread: outlook", "https://example.com/forum/thread-2"),
                    ],
                ),
            )
            .with_page("https://example.com/forum/thread-1", article_page("Thread: results", &recent_iso(1), 200))
            .with_page("https://example.com/forum/thread-2", article_page("Thread: outlook", &recent_iso(2), 200)),
    );

    let model = MockModel::new()
        .on(
            &["Parse this news request"],
            r#"{"topic": "marico", "target_section": "forum", "confidence": 0.85}"#,
        )
        .on(
            &["Plan the extraction"],
            r#"{"listing_type": "company_profile", "estimated_depth": 2, "success_criteria": "forum threads"}"#,
        )
        .on(
            &["Decide what to do", "URL: https://example.com/profile/marico"],
            r#"{"action": "NAVIGATE_TO", "reasoning": "the forum is where discussion lives", "confidence": 0.85, "page_type": "company_profile", "target_url": "https://example.com/forum/marico"}"#,
        )
        .on(
            &["Decide what to do", "URL: https://example.com/forum/marico"],
            r#"{"action": "EXTRACT_LINKS", "reasoning": "thread listing", "confidence": 0.9, "page_type": "forum_listing"}"#,
        )
        .on(
            &["Decide what to do"],
            r#"{"action": "EXTRACT_CONTENT", "reasoning": "a thread", "confidence": 0.9, "page_type": "forum_thread"}"#,
        )
        .on(
            &["Classify each link"],
            r#"{"classifications": [{"index": 1, "kind": "article"}, {"index": 2, "kind": "article"}]}"#,
        )
        .on(
            &["Rank these article links"],
            r#"{"ranked": [{"index": 1, "relevance": 0.9}, {"index": 2, "relevance": 0.8}]}"#,
        )
        .on(&["Extract the article", "thread-1"], &extraction_json("Thread: results", "delta"))
        .on(&["Extract the article", "thread-2"], &extraction_json("Thread: outlook", "epsilon"))
        .on(
            &["Write the briefing"],
            r#"{"summary_markdown": "Forum discussion [1][2].", "bullets": [{"text": "Results thread", "sources": [1]}, {"text": "Outlook thread", "sources": [2]}]}"#,
        );
    let model = common_rules(model);

    let sink = Arc::new(CollectingSink::new());
    let agent = Agent::new(fetcher.clone(), ModelSet::single(Arc::new(model)));
    let summary = agent
        .run(
            RunRequest::new(
                "What are people saying about Marico in the forum?",
                vec!["https://example.com/profile/marico".to_string()],
            )
            .with_sink(sink.clone()),
        )
        .await
        .unwrap();

    let intent = sink
        .events()
        .into_iter()
        .find_map(|e| match e {
            AgentEvent::IntentExtracted { intent } => Some(intent),
            _ => None,
        })
        .unwrap();
    assert_eq!(intent.target_section.as_deref(), Some("forum"));

    assert_eq!(summary.citations.len(), 2);

    // depth never exceeded 2
    let max_depth = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            AgentEvent::NavAnalyzing { depth, .. } => Some(depth),
            _ => None,
        })
        .max()
        .unwrap();
    assert_eq!(max_depth, 2);

    // the honored NAVIGATE_TO target came from the seed's actual link set
    let navigated: Vec<_> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            AgentEvent::NavAnalyzing { url, depth: 1 } => Some(url),
            _ => None,
        })
        .collect();
    assert_eq!(navigated, vec!["https://example.com/forum/marico".to_string()]);
}

// ---------------------------------------------------------------------------
// S4 - all paywalled: fallback attempted, run completes with empty citations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn s4_all_paywalled_completes_with_explanatory_summary() {
    let seed = "https://paywalled.example/apple";
    let fetcher = Arc::new(
        MockFetcher::new().with_page(seed, article_page("Apple coverage", &recent_iso(1), 200)),
    );

    let model = MockModel::new()
        .on(
            &["Parse this news request"],
            r#"{"topic": "apple", "confidence": 0.9}"#,
        )
        .on(
            &["Plan the extraction"],
            r#"{"listing_type": "other", "estimated_depth": 1, "success_criteria": "recent apple news"}"#,
        )
        .on(
            &["Decide what to do"],
            r#"{"action": "EXTRACT_CONTENT", "reasoning": "looks like an article", "confidence": 0.7, "page_type": "article"}"#,
        )
        .on(&["Extract the article"], &extraction_json("Apple coverage", "teaser"))
        .on(&["Identify the publication date"], r#"{"date": "unknown", "confidence": "low"}"#)
        // every candidate reads as a teaser
        .on(&["paywall"], r#"{"paywalled": true}"#)
        .on(
            &["Evaluate the collected articles"],
            r#"{"quality_score": 0.1, "coverage_of_intent": 0.0, "notes": "nothing usable"}"#,
        );

    let sink = Arc::new(CollectingSink::new());
    let agent = Agent::new(fetcher.clone(), ModelSet::single(Arc::new(model)));
    let summary = agent
        .run(RunRequest::new("Recent Apple news", vec![seed.to_string()]).with_sink(sink.clone()))
        .await
        .unwrap();

    assert!(summary.citations.is_empty());
    assert!(summary.summary_markdown.contains("apple"));

    let names = event_names(&sink);
    // fallback fired, and the error was followed by a terminal complete
    assert!(names.contains(&"fetch:fallback_start"));
    assert!(!names.contains(&"fetch:fallback_success"));
    assert!(names.contains(&"error"));
    assert_eq!(*names.last().unwrap(), "complete");

    // the fallback reused the seed HTML: still exactly one fetch
    assert_eq!(fetcher.fetch_count(seed), 1);
}

// ---------------------------------------------------------------------------
// S5 - cycle trap: a self-linking seed is fetched exactly once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn s5_self_link_cycle_is_cut_by_the_visited_set() {
    let seed = "https://example.com/tag/loop";
    let fetcher = Arc::new(MockFetcher::new().with_page(
        seed,
        listing_page("Looping listing", &[("This very page", "https://example.com/tag/loop")]),
    ));

    let model = MockModel::new()
        .on(
            &["Parse this news request"],
            r#"{"topic": "loop", "confidence": 0.9}"#,
        )
        .on(
            &["Plan the extraction"],
            r#"{"listing_type": "news_listing", "estimated_depth": 1, "success_criteria": "anything"}"#,
        )
        .on(
            &["Decide what to do"],
            r#"{"action": "EXTRACT_LINKS", "reasoning": "listing", "confidence": 0.9, "page_type": "news_listing"}"#,
        )
        .on(
            &["Classify each link"],
            r#"{"classifications": [{"index": 1, "kind": "article"}]}"#,
        )
        .on(
            &["Rank these article links"],
            r#"{"ranked": [{"index": 1, "relevance": 0.9}]}"#,
        )
        // the fallback extraction attempt yields nothing usable
        .on(&["Extract the article"], "no article here")
        .on(
            &["Evaluate the collected articles"],
            r#"{"quality_score": 0.0, "coverage_of_intent": 0.0, "notes": "empty"}"#,
        );

    let agent = Agent::new(fetcher.clone(), ModelSet::single(Arc::new(model)));
    let summary = agent
        .run(RunRequest::new("loop coverage", vec![seed.to_string()]))
        .await
        .unwrap();

    assert_eq!(fetcher.fetch_count(seed), 1);
    assert!(summary.citations.is_empty());
}

// ---------------------------------------------------------------------------
// S6 - temporal phrase without a count: boost to 20, default window
// ---------------------------------------------------------------------------

#[tokio::test]
async fn s6_temporal_phrase_without_count_boosts_budget() {
    let smart = MockModel::new().on(
        &["Parse this news request"],
        r#"{"topic": "nail care", "time_value": null, "time_unit": null, "max_articles": null, "confidence": 0.8}"#,
    );

    let intent = news_agent::pipeline::intent::extract_intent(
        &smart,
        "Latest nail-care posts lately",
        Utc::now(),
        &news_agent::AgentConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(intent.max_articles, 20);
    assert_eq!(intent.time_range_days, 7);
}

// ---------------------------------------------------------------------------
// Cross-cutting invariants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_start_precedes_date_extracted_per_url() {
    let fetcher = Arc::new(listing_scenario_fetcher());
    let sink = Arc::new(CollectingSink::new());
    let agent = Agent::new(fetcher, ModelSet::single(Arc::new(listing_scenario_model())));

    agent
        .run(
            RunRequest::new(
                "Marico news from the last 5 days",
                vec!["https://example.com/tag/marico".to_string()],
            )
            .with_sink(sink.clone()),
        )
        .await
        .unwrap();

    let events = sink.events();
    for (i, event) in events.iter().enumerate() {
        if let AgentEvent::DateExtracted { url, .. } = event {
            let fetched_earlier = events[..i].iter().any(|earlier| {
                matches!(earlier, AgentEvent::FetchStart { url: fetch_url } if fetch_url == url)
            });
            assert!(fetched_earlier, "date:extracted for {url} before its fetch:start");
        }
    }
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_events() {
    let agent = Agent::new(
        Arc::new(MockFetcher::new()),
        ModelSet::single(Arc::new(MockModel::failing())),
    );

    let empty_prompt = agent
        .run(RunRequest::new("", vec!["https://example.com".to_string()]))
        .await;
    assert!(matches!(empty_prompt, Err(news_agent::AgentError::InvalidInput { .. })));

    let no_seeds = agent.run(RunRequest::new("news", vec![])).await;
    assert!(matches!(no_seeds, Err(news_agent::AgentError::InvalidInput { .. })));
}

#[tokio::test]
async fn unreachable_model_surfaces_as_llm_unavailable() {
    let agent = Agent::new(
        Arc::new(MockFetcher::new()),
        ModelSet::single(Arc::new(MockModel::failing())),
    );

    let result = agent
        .run(RunRequest::new("news", vec!["https://example.com".to_string()]))
        .await;
    assert!(matches!(result, Err(news_agent::AgentError::LlmUnavailable(_))));
}

#[tokio::test]
async fn citation_markers_resolve_to_collected_articles() {
    let fetcher = Arc::new(listing_scenario_fetcher());
    let agent = Agent::new(fetcher, ModelSet::single(Arc::new(listing_scenario_model())));

    let summary = agent
        .run(RunRequest::new(
            "Marico news from the last 5 days",
            vec!["https://example.com/tag/marico".to_string()],
        ))
        .await
        .unwrap();

    let count = summary.citations.len();
    assert!(count > 0);
    for marker in summary.citation_markers() {
        assert!((1..=count).contains(&marker), "marker [{marker}] out of range");
        assert_eq!(summary.citations[marker - 1].label, format!("[{marker}]"));
    }
}
