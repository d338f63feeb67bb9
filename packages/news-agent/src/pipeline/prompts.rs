//! LLM prompt templates for the agent pipeline.
//!
//! Templates carry `{placeholder}` slots filled at the call site. Each one
//! spells its JSON output contract inline; responses are still parsed
//! defensively because models do not always honor contracts.

/// System prompt for intent extraction (smart model).
pub const INTENT_SYSTEM: &str = "You parse news-briefing requests into structured intents. Output only JSON.";

/// Intent extraction.
pub const INTENT_PROMPT: &str = r#"Parse this news request into a structured intent.

Request: {prompt}

Output JSON:
{
    "topic": "the subject being asked about",
    "target_section": "a sub-area the user explicitly named (forum, news, blog) or null - NEVER guess",
    "time_value": <number or null if no time range was stated>,
    "time_unit": "days" | "weeks" | "months" | null,
    "output_format": "executive_summary" | "categorized_bullets" | "concise_bullets" | "detailed" | null,
    "focus_areas": ["financial", "product", "leadership", "legal", "market", "technology", "opinion", "community"],
    "max_articles": <number or null if no count was stated>,
    "confidence": <0.0 to 1.0>
}

Rules:
- target_section only when the user literally named a section.
- max_articles only when the user stated an explicit count.
- focus_areas may be empty."#;

/// System prompt for planning (fast model).
pub const PLAN_SYSTEM: &str = "You plan news-extraction runs. Output only JSON.";

/// Strategic plan from intent plus seeds.
pub const PLAN_PROMPT: &str = r#"Plan the extraction for this request.

Topic: {topic}
Target section: {section}
Seed URLs:
{seeds}

Predict what the seeds are and how deep navigation must go.

Output JSON:
{
    "listing_type": "article" | "forum_thread" | "forum_listing" | "news_listing" | "company_profile" | "blog_listing" | "other",
    "estimated_depth": 1 | 2,
    "success_criteria": "what a good collection looks like",
    "fallback_strategies": ["what to try if the primary route yields nothing"]
}

estimated_depth is 1 when the seed is already a listing of articles, 2 when
one navigation hop (e.g. profile -> section) is needed first."#;

/// System prompt for page decisions (smart model).
pub const DECISION_SYSTEM: &str = "You navigate websites to collect news articles. Output only JSON.";

/// Page decision. The link set shown is the page's actual links; a
/// NAVIGATE_TO target outside it will be rejected.
pub const DECISION_PROMPT: &str = r#"Decide what to do with this page.

URL: {url}
Depth: {depth} (seed is 0)
Topic: {topic}
Target section: {section}
Time window: last {days} days

Actions:
- EXTRACT_CONTENT: this page IS a single article/thread worth reading
- EXTRACT_LINKS: this page lists links to articles; harvest the relevant ones
- NAVIGATE_TO: hop to ONE link below that leads closer to the content (target_url MUST be copied verbatim from the link list)
- STOP: nothing useful here

Depth rules:
- depth 0: prefer EXTRACT_LINKS when the page is a listing with article links; prefer EXTRACT_CONTENT when the page is itself the article; NAVIGATE_TO only for hub pages that merely point at sections
- depth 1: EXTRACT_CONTENT or EXTRACT_LINKS; further navigation is discouraged
- depth 2 or more: EXTRACT_CONTENT or STOP only
{listing_hint}
Links on this page:
{links}

Page excerpt:
{excerpt}

Output JSON:
{
    "action": "EXTRACT_CONTENT" | "EXTRACT_LINKS" | "NAVIGATE_TO" | "STOP",
    "reasoning": "one sentence",
    "confidence": <0.0 to 1.0>,
    "page_type": "article" | "forum_thread" | "forum_listing" | "news_listing" | "company_profile" | "blog_listing" | "other",
    "target_url": "verbatim URL from the list above, only for NAVIGATE_TO",
    "ready_to_extract": <true when depth is 0 and this page is itself the complete article>
}"#;

/// Extra steering appended at depth 0 for listing-shaped seeds.
pub const LISTING_HINT: &str = "\nThis seed looks like a listing page with article links; prefer EXTRACT_LINKS over navigation hops.\n";

/// System prompt for link classification (fast model).
pub const CLASSIFY_LINKS_SYSTEM: &str = "You classify hyperlinks from webpages. Output only JSON.";

/// Anchor classification, batched.
pub const CLASSIFY_LINKS_PROMPT: &str = r#"Classify each link from a webpage.

Kinds:
- article: points at a single news story, blog post, or forum thread
- category: points at a tag/category/section listing
- navigation: site chrome (home, about, login, contact, pagination)
- other: anything else

Links:
{links}

Output JSON:
{"classifications": [{"index": <n>, "kind": "article" | "category" | "navigation" | "other"}]}"#;

/// System prompt for link ranking (smart model).
pub const RANK_LINKS_SYSTEM: &str = "You rank article links by relevance to a reader's interest. Output only JSON.";

/// Relevance ranking of classified article links.
pub const RANK_LINKS_PROMPT: &str = r#"Rank these article links by relevance.

Topic: {topic}
Target section: {section}

Candidates:
{links}

Output JSON:
{"ranked": [{"index": <n>, "relevance": <0.0 to 1.0>, "date": "YYYY-MM-DD if a date is visible in the anchor text, else null"}]}

Include only candidates actually about the topic. Order by relevance,
highest first."#;

/// System prompt for content extraction (smart model).
pub const EXTRACT_SYSTEM: &str = "You extract article content from HTML. Output only JSON. Never invent text that is not on the page.";

/// Article extraction from focused HTML.
pub const EXTRACT_PROMPT: &str = r#"Extract the article from this page.

URL: {url}

For a news or blog page, the text is the article body only - no
navigation, comments, or related-story boxes. For a forum thread, return
the posts instead of the text.

Output JSON:
{
    "title": "the headline",
    "text": "the full readable body text (empty for forum threads)",
    "posts": ["each forum post in reading order (empty for articles)"],
    "publish_date": "YYYY-MM-DD if visible, else null",
    "language": "two-letter code of the text's language",
    "quality_score": <0.0 to 1.0 - how complete and substantial the text is>
}

HTML:
{html}"#;

/// System prompt for date extraction (smart model).
pub const DATE_SYSTEM: &str = "You identify publication dates of articles. Output only JSON.";

/// Date extraction. Today's date is supplied; the model never computes
/// calendar offsets itself.
pub const DATE_PROMPT: &str = r#"Identify the publication date of this article.

Today's date is {today}. Use it to resolve phrases like "2 days ago".

URL: {url}

Article excerpt:
{excerpt}

Output JSON:
{"date": "YYYY-MM-DD" or null or "unknown", "confidence": "high" | "medium" | "low"}"#;

/// System prompt for the paywall check (fast model).
pub const PAYWALL_SYSTEM: &str = "You detect paywalled or teaser content. Output only JSON.";

/// Paywall detection over extracted text.
pub const PAYWALL_PROMPT: &str = r#"Does this text read as a paywall or subscription teaser rather than a full article?

Text:
{text}

Output JSON:
{"paywalled": true | false, "reason": "one sentence"}"#;

/// System prompt for the topic-relevance check (fast model).
pub const RELEVANCE_SYSTEM: &str = "You judge whether an article is about a topic. Output only JSON.";

/// Topic relevance quick-check. Date filtering already happened; this
/// judges topic fit only.
pub const RELEVANCE_PROMPT: &str = r#"Judge topic fit only. Today's date is {today}; date validation has
already been performed, so do NOT reject for recency.

Topic: {topic}
Target section: {section}

Article title: {title}
Article lead:
{lead}

Output JSON:
{"relevant": true | false, "reason": "one sentence"}"#;

/// System prompt for semantic dedup (fast model).
pub const DEDUP_SYSTEM: &str = "You detect duplicate coverage of the same story. Output only JSON.";

/// Semantic dedup over titles and leads.
pub const DEDUP_PROMPT: &str = r#"These articles may contain duplicate coverage of the same underlying
story (syndication, reprints). Group the numbers of articles that cover the
SAME story; leave distinct stories in their own group.

Articles:
{articles}

Output JSON:
{"groups": [[1, 3], [2]]}

Every article number must appear in exactly one group."#;

/// System prompt for reflection (fast model).
pub const REFLECT_SYSTEM: &str = "You evaluate collections of news articles against a reader's request. Output only JSON.";

/// Post-collection reflection.
pub const REFLECT_PROMPT: &str = r#"Evaluate the collected articles against the request.

Request topic: {topic}
Time window: last {days} days
Requested count: {max_articles}

Collected:
{articles}

Output JSON:
{"quality_score": <0.0 to 1.0>, "coverage_of_intent": <0.0 to 1.0>, "notes": "2-3 sentences"}"#;

/// System prompt for summarization (smart model).
pub const SUMMARIZE_SYSTEM: &str = "You write news briefings with numbered citations. Output only JSON. Every bullet must cite at least one source.";

/// Final summary. Articles are presented numbered; the model cites by
/// returning source numbers per bullet and the code renders the markers.
pub const SUMMARIZE_PROMPT: &str = r#"Write the briefing for this request.

Topic: {topic}
Format: {format_instructions}

Articles (cite by number):
{articles}

Output JSON:
{
    "summary_markdown": "the full briefing as markdown, with [n] citation markers",
    "bullets": [{"text": "bullet text WITHOUT citation markers", "sources": [<article numbers>]}]
}"#;

/// Per-format instructions substituted into `{format_instructions}`.
pub const FORMAT_EXECUTIVE: &str = "one tight narrative paragraph followed by 3-5 headline bullets";
pub const FORMAT_CATEGORIZED: &str = "group bullets under semantic headers; at least 3 bullets per article; title each article's section 'Article [n]: <title>'";
pub const FORMAT_CONCISE: &str = "exactly one bullet per article";
pub const FORMAT_DETAILED: &str = "a full per-article breakdown with short quotes from the text";
