//! HTML processing: titles, readable text, links, excerpts.
//!
//! Pure functions, no I/O. Parsing happens inside each function and the
//! DOM never escapes, so callers stay `Send` across await points.
//!
//! Main-text extraction is readability-style: prefer a recognized content
//! container, fall back to a conservative walk over paragraph-level
//! elements across the whole document.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Containers that usually hold the main content, in preference order.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "#content",
    ".article-body",
    ".post-content",
    ".entry-content",
];

/// Minimum words for a container to win over the whole-document walk.
const CONTAINER_MIN_WORDS: usize = 50;

/// One anchor from a page: absolute URL plus its anchor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub url: String,
    pub text: String,
}

/// Extract the page title: `<title>`, then `og:title`, then the first `<h1>`.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let title_sel = Selector::parse("title").expect("static selector");
    if let Some(el) = doc.select(&title_sel).next() {
        let text = collapse_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            return Some(text);
        }
    }

    let og_sel = Selector::parse("meta[property=\"og:title\"]").expect("static selector");
    if let Some(content) = doc.select(&og_sel).next().and_then(|el| el.value().attr("content")) {
        let text = collapse_whitespace(content);
        if !text.is_empty() {
            return Some(text);
        }
    }

    let h1_sel = Selector::parse("h1").expect("static selector");
    doc.select(&h1_sel)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Extract the main readable text. Returns an empty string when the page
/// has no recognizable content body.
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    for raw in CONTENT_SELECTORS {
        let sel = Selector::parse(raw).expect("static selector");
        if let Some(container) = doc.select(&sel).next() {
            let text = paragraph_walk(container);
            if text.split_whitespace().count() >= CONTAINER_MIN_WORDS {
                return text;
            }
        }
    }

    // Conservative fallback: paragraph-level elements across the document
    let body_sel = Selector::parse("body").expect("static selector");
    match doc.select(&body_sel).next() {
        Some(body) => paragraph_walk(body),
        None => String::new(),
    }
}

/// All usable anchors on the page with absolute URLs. Anchors, javascript,
/// mailto, and tel links are skipped; duplicates keep their first position.
pub fn extract_links(base: &Url, html: &str) -> Vec<PageLink> {
    let doc = Html::parse_document(html);
    let a_sel = Selector::parse("a[href]").expect("static selector");

    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    for el in doc.select(&a_sel) {
        let Some(href) = el.value().attr("href") else { continue };
        if href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(resolved) = base.join(href) else { continue };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }
        links.push(PageLink {
            url,
            text: collapse_whitespace(&el.text().collect::<String>()),
        });
    }

    links
}

/// Title plus readable text, bounded to `max_chars`, for model prompts.
pub fn clean_excerpt(html: &str, max_chars: usize) -> String {
    let title = extract_title(html).unwrap_or_default();
    let text = extract_text(html);
    let combined = if title.is_empty() {
        text
    } else {
        format!("{title}\n\n{text}")
    };
    truncate_chars(&combined, max_chars)
}

/// Reduce a page to the HTML of its plausible main-content container.
/// Falls back to the original document when no container is recognized.
pub fn focus_content(html: &str) -> String {
    let doc = Html::parse_document(html);
    for raw in CONTENT_SELECTORS {
        let sel = Selector::parse(raw).expect("static selector");
        if let Some(container) = doc.select(&sel).next() {
            let inner = container.html();
            if inner.split_whitespace().count() >= CONTAINER_MIN_WORDS {
                return inner;
            }
        }
    }
    html.to_string()
}

/// Truncate at a char boundary.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

/// Visible text of paragraph-level elements under `scope`.
fn paragraph_walk(scope: ElementRef<'_>) -> String {
    let block_sel = Selector::parse("p, h1, h2, h3, li, blockquote").expect("static selector");

    let mut blocks: Vec<String> = Vec::new();
    for el in scope.select(&block_sel) {
        let text = collapse_whitespace(&el.text().collect::<String>());
        if !text.is_empty() {
            blocks.push(text);
        }
    }
    blocks.join("\n\n")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html><head><title>Quarterly Results | Example</title></head>
        <body>
        <nav><a href="/home">Home</a></nav>
        <article>
        <h1>Quarterly Results</h1>
        <p>Revenue grew twelve percent over the prior quarter driven by strong demand in the personal care segment across urban and rural markets alike.</p>
        <p>Management attributed the growth to distribution expansion and premiumization, and guided for continued momentum into the next fiscal year with stable margins.</p>
        <p>Analysts noted the commentary on input costs, pricing actions, and the company's rural recovery thesis as the key takeaways from the call this week.</p>
        </article>
        <footer><p>Copyright</p></footer>
        </body></html>"#;

    #[test]
    fn title_from_title_tag() {
        assert_eq!(extract_title(ARTICLE), Some("Quarterly Results | Example".to_string()));
    }

    #[test]
    fn title_falls_back_to_og() {
        let html = r#"<html><head><meta property="og:title" content="OG Headline"/></head><body></body></html>"#;
        assert_eq!(extract_title(html), Some("OG Headline".to_string()));
    }

    #[test]
    fn text_prefers_article_container() {
        let text = extract_text(ARTICLE);
        assert!(text.contains("Revenue grew twelve percent"));
        // nav and footer content outside the container is excluded
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn text_empty_when_no_body_content() {
        assert_eq!(extract_text("<html><head><title>x</title></head><body></body></html>"), "");
    }

    #[test]
    fn links_resolved_and_filtered() {
        let base = Url::parse("https://example.com/tag/marico").unwrap();
        let html = r##"
            <a href="/news/a">Story A</a>
            <a href="https://example.com/news/b">Story B</a>
            <a href="#top">Top</a>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:x@example.com">Mail</a>
            <a href="/news/a">Story A again</a>
        "##;
        let links = extract_links(&base, html);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/news/a", "https://example.com/news/b"]);
        assert_eq!(links[0].text, "Story A");
    }

    #[test]
    fn excerpt_bounded() {
        let excerpt = clean_excerpt(ARTICLE, 80);
        assert!(excerpt.chars().count() <= 80);
        assert!(excerpt.starts_with("Quarterly Results"));
    }

    #[test]
    fn focus_reduces_to_container() {
        let focused = focus_content(ARTICLE);
        assert!(focused.starts_with("<article>"));
        assert!(!focused.contains("<nav>"));
    }
}
